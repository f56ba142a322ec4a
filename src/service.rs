//! Compilation services.
//!
//! A service turns a function's script file into a [`CompilationUnit`].
//! [`ScriptCompilationService`] also runs the whole host flow for a
//! function: diagnostics, emission, then entry-point resolution.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fnscript_compiler::{
    Compilation, CompilationUnit, FunctionEntryPointResolver, ImageError, LoadedImage,
    MetadataResolver, ScriptCompilation, SourceText,
};
use fnscript_core::{
    CancellationToken, CompilationError, CompilationOptions, Diagnostic, DiagnosticSliceExt,
    FunctionSignature, Severity,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::script_type::ScriptType;

/// What the host knows about one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetadata {
    name: String,
    script_file: PathBuf,
    entry_point: Option<String>,
}

impl FunctionMetadata {
    pub fn new(name: impl Into<String>, script_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            script_file: script_file.into(),
            entry_point: None,
        }
    }

    /// Invoke the method named `entry_point` instead of the default one.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script_file(&self) -> &Path {
        &self.script_file
    }

    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// Directory holding the script file; file references resolve against it.
    pub fn function_directory(&self) -> Option<&Path> {
        self.script_file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    pub fn script_type(&self) -> Option<ScriptType> {
        ScriptType::from_path(&self.script_file)
    }

    /// The resolver selecting this function's entry point.
    pub fn entry_point_resolver(&self) -> FunctionEntryPointResolver {
        match &self.entry_point {
            Some(name) => FunctionEntryPointResolver::with_entry_point(name.clone()),
            None => FunctionEntryPointResolver::new(),
        }
    }
}

/// Produces compilation units for one script language.
pub trait CompilationService: Send + Sync {
    fn language(&self) -> &'static str;

    /// File extensions the service compiles, without the dot.
    fn supported_file_types(&self) -> &'static [&'static str];

    /// Whether emitted output is written somewhere other than memory.
    fn persists_output(&self) -> bool;

    fn get_function_compilation(
        &self,
        metadata: &FunctionMetadata,
    ) -> Result<CompilationUnit, ServiceError>;
}

/// A function compiled and ready to load.
#[derive(Debug, Clone)]
pub struct FunctionAssembly {
    pub name: String,
    pub signature: FunctionSignature,
    pub image: Vec<u8>,
    /// Debug-symbol document, when enabled.
    pub symbols: Option<Vec<u8>>,
    /// Every diagnostic of the successful emission; none is an error.
    pub diagnostics: Vec<Diagnostic>,
}

impl FunctionAssembly {
    pub fn load_image(&self) -> Result<LoadedImage, ImageError> {
        LoadedImage::read(&mut self.image.as_slice())
    }
}

/// Compilation service for C#-style function scripts.
#[derive(Clone)]
pub struct ScriptCompilationService {
    resolver: Arc<dyn MetadataResolver>,
    options: CompilationOptions,
}

impl ScriptCompilationService {
    pub fn new(resolver: Arc<dyn MetadataResolver>, options: CompilationOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    fn read_source(&self, metadata: &FunctionMetadata) -> Result<SourceText, ServiceError> {
        let path = metadata.script_file();
        let text = fs::read_to_string(path).map_err(|source| ServiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(SourceText::new(&*path.to_string_lossy(), text))
    }

    /// Compile, emit and resolve one function.
    ///
    /// Diagnostics are logged before emission; warnings do not stop the
    /// build. Emission errors and entry-point failures are returned.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build_function(
        &self,
        metadata: &FunctionMetadata,
        cancel: &CancellationToken,
    ) -> Result<FunctionAssembly, ServiceError> {
        let unit = self.get_function_compilation(metadata)?;

        for diagnostic in unit.get_diagnostics()? {
            log_diagnostic(metadata.name(), &diagnostic);
        }
        if cancel.is_cancelled() {
            return Err(CompilationError::Cancelled.into());
        }

        let mut image = Vec::new();
        let mut symbols = self.options.emit_debug_symbols.then(Vec::new);
        let diagnostics = unit.emit(
            &mut image,
            symbols.as_mut().map(|s| s as &mut dyn Write),
            cancel,
        )?;

        let resolver = metadata.entry_point_resolver();
        let signature = unit.get_entry_point_signature(&resolver)?;
        info!(
            function = metadata.name(),
            %signature,
            warnings = diagnostics.count_of(Severity::Warning),
            "function compiled"
        );

        Ok(FunctionAssembly {
            name: metadata.name().to_string(),
            signature,
            image,
            symbols: symbols.filter(|bytes| !bytes.is_empty()),
            diagnostics,
        })
    }

    /// Build many functions in parallel. Results keep the input order.
    pub fn build_functions(
        &self,
        functions: &[FunctionMetadata],
        cancel: &CancellationToken,
    ) -> Vec<Result<FunctionAssembly, ServiceError>> {
        debug!(count = functions.len(), "building functions");
        functions
            .par_iter()
            .map(|metadata| self.build_function(metadata, cancel))
            .collect()
    }
}

fn log_diagnostic(function: &str, diagnostic: &Diagnostic) {
    match diagnostic.severity() {
        Severity::Error | Severity::Warning => warn!(function, %diagnostic, "compilation diagnostic"),
        Severity::Info => debug!(function, %diagnostic, "compilation diagnostic"),
    }
}

impl CompilationService for ScriptCompilationService {
    fn language(&self) -> &'static str {
        "CSharp"
    }

    fn supported_file_types(&self) -> &'static [&'static str] {
        ScriptType::CSharp.extensions()
    }

    fn persists_output(&self) -> bool {
        false
    }

    fn get_function_compilation(
        &self,
        metadata: &FunctionMetadata,
    ) -> Result<CompilationUnit, ServiceError> {
        if let Some(script_type) = metadata.script_type()
            && script_type != ScriptType::CSharp
        {
            return Err(ServiceError::UnsupportedScriptType(script_type));
        }

        let source = self.read_source(metadata)?;
        let compilation =
            ScriptCompilation::create(self.options.clone(), &[source], &*self.resolver);
        debug!(
            function = metadata.name(),
            assembly = %compilation.assembly(),
            "created function compilation"
        );
        Ok(CompilationUnit::new(compilation))
    }
}
