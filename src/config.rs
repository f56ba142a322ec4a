//! Host configuration.
//!
//! A host reads one TOML document:
//!
//! ```toml
//! [compilation]
//! assembly_name = "Submission"
//! optimization = "release"
//!
//! [references]
//! probing_paths = ["/opt/functions/bin"]
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Every table is optional. Logging settings can be overridden with
//! `FNSCRIPT_LOG_LEVEL` and `FNSCRIPT_LOG_FORMAT`. Relative probing paths in
//! a loaded file are taken relative to the file's directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fnscript_compiler::DefaultMetadataResolver;
use fnscript_core::CompilationOptions;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::{LogFormat, LogLevel, LogOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),

    #[error("unknown log format '{0}'")]
    InvalidLogFormat(String),
}

/// Where file references are searched for besides the function directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceSettings {
    pub probing_paths: Vec<PathBuf>,
}

impl ReferenceSettings {
    /// Anchor relative probing paths at `base`.
    fn rebase(&mut self, base: &Path) {
        for path in &mut self.probing_paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Raw `[logging]` table. Values are validated by [`HostConfig::log_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub compilation: CompilationOptions,
    pub references: ReferenceSettings,
    pub logging: LogSettings,
}

impl HostConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(text)?;
        // Surface bad logging values at load time rather than at startup.
        config.configured_log_options()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.references.rebase(base);
        }
        tracing::debug!(path = %path.display(), "loaded host configuration");
        Ok(config)
    }

    /// Logging options from the `[logging]` table, then the environment.
    pub fn log_options(&self) -> Result<LogOptions, ConfigError> {
        Ok(self.configured_log_options()?.with_env_overrides())
    }

    fn configured_log_options(&self) -> Result<LogOptions, ConfigError> {
        let mut options = LogOptions::DEFAULT;
        if let Some(level) = &self.logging.level {
            options.level =
                LogLevel::parse(level).ok_or_else(|| ConfigError::InvalidLogLevel(level.clone()))?;
        }
        if let Some(format) = &self.logging.format {
            options.format = LogFormat::parse(format)
                .ok_or_else(|| ConfigError::InvalidLogFormat(format.clone()))?;
        }
        Ok(options)
    }

    /// The default resolver extended with the configured probing paths.
    pub fn metadata_resolver(&self) -> DefaultMetadataResolver {
        DefaultMetadataResolver::new().with_probing_paths(self.references.probing_paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::OptimizationLevel;

    #[test]
    fn empty_document_uses_defaults() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.compilation.assembly_name, "Submission");
    }

    #[test]
    fn tables_are_read() {
        let config = HostConfig::from_toml_str(
            r#"
            [compilation]
            optimization = "release"
            emit_debug_symbols = false

            [references]
            probing_paths = ["/opt/functions/bin", "lib"]

            [logging]
            level = "warn"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.compilation.optimization, OptimizationLevel::Release);
        assert!(!config.compilation.emit_debug_symbols);
        assert_eq!(
            config.metadata_resolver().probing_paths(),
            [PathBuf::from("/opt/functions/bin"), PathBuf::from("lib")]
        );
        let options = config.configured_log_options().unwrap();
        assert_eq!(options.level, LogLevel::Warn);
        assert_eq!(options.format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = HostConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "loud"));

        let err = HostConfig::from_toml_str("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));

        let err = HostConfig::from_toml_str("[compilation]\noptimise = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.toml");
        assert!(matches!(
            HostConfig::load(&path),
            Err(ConfigError::Io { .. })
        ));

        fs::write(&path, "[references]\nprobing_paths = [\"bin\"]\n").unwrap();
        let config = HostConfig::load(&path).unwrap();
        assert_eq!(config.references.probing_paths, [dir.path().join("bin")]);
    }

    #[test]
    fn load_anchors_relative_probing_paths_at_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("shared");
        let path = dir.path().join("host.toml");
        fs::write(
            &path,
            format!(
                "[references]\nprobing_paths = [\"lib\", \"../common\", {:?}]\n",
                absolute.display().to_string()
            ),
        )
        .unwrap();

        let config = HostConfig::load(&path).unwrap();
        assert_eq!(
            config.metadata_resolver().probing_paths(),
            [
                dir.path().join("lib"),
                dir.path().join("../common"),
                absolute.clone()
            ]
        );

        // In-memory documents have no file to anchor to.
        let text = fs::read_to_string(&path).unwrap();
        let config = HostConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.references.probing_paths[0], PathBuf::from("lib"));
    }
}
