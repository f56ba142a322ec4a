//! Shared helpers for the integration tests.
//!
//! Fixtures live in `test_scripts/`. A [`FunctionApp`] copies them into a
//! temporary function directory, the way a host lays functions out on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use fnscript::prelude::*;
use tempfile::TempDir;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Compile a fixture in memory under its own path.
pub fn compile_fixture(name: &str) -> ScriptCompilation {
    ScriptCompilation::builder()
        .source(&*fixture_path(name).to_string_lossy(), fixture(name))
        .build()
}

pub fn diagnostic_codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code()).collect()
}

/// A temporary function app root with one directory per function.
pub struct FunctionApp {
    root: TempDir,
}

impl FunctionApp {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create function app root"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create `<root>/<function>/run.csx` from a fixture.
    pub fn add_fixture(&self, function: &str, fixture_name: &str) -> FunctionMetadata {
        self.add_source(function, &fixture(fixture_name))
    }

    pub fn add_source(&self, function: &str, source: &str) -> FunctionMetadata {
        let dir = self.root.path().join(function);
        fs::create_dir_all(&dir).expect("create function directory");
        let script = dir.join("run.csx");
        fs::write(&script, source).expect("write script");
        FunctionMetadata::new(function, script)
    }

    /// Place a file next to a function's script.
    pub fn add_file(&self, function: &str, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.path().join(function).join(name);
        fs::write(&path, contents).expect("write function file");
        path
    }
}
