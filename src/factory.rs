//! Selection of the compilation service for a script type.

use std::sync::Arc;

use fnscript_compiler::MetadataResolver;
use fnscript_core::CompilationOptions;
use tracing::debug;

use crate::config::HostConfig;
use crate::error::ServiceError;
use crate::script_type::ScriptType;
use crate::service::{CompilationService, ScriptCompilationService};

/// Creates compilation services for the script types it supports.
pub trait CompilationServiceFactory: Send + Sync {
    fn supported_script_types(&self) -> &[ScriptType];

    fn create_service(
        &self,
        script_type: ScriptType,
        resolver: Arc<dyn MetadataResolver>,
    ) -> Result<Arc<dyn CompilationService>, ServiceError>;
}

/// Factory for the built-in script compiler.
#[derive(Debug, Clone, Default)]
pub struct DefaultCompilationServiceFactory {
    options: CompilationOptions,
}

const SUPPORTED: &[ScriptType] = &[ScriptType::CSharp];

impl DefaultCompilationServiceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services created by this factory compile with `options`.
    pub fn with_options(options: CompilationOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::with_options(config.compilation.clone())
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }
}

impl CompilationServiceFactory for DefaultCompilationServiceFactory {
    fn supported_script_types(&self) -> &[ScriptType] {
        SUPPORTED
    }

    fn create_service(
        &self,
        script_type: ScriptType,
        resolver: Arc<dyn MetadataResolver>,
    ) -> Result<Arc<dyn CompilationService>, ServiceError> {
        match script_type {
            ScriptType::CSharp => {
                debug!(%script_type, "creating compilation service");
                Ok(Arc::new(ScriptCompilationService::new(
                    resolver,
                    self.options.clone(),
                )))
            }
            other => Err(ServiceError::UnsupportedScriptType(other)),
        }
    }
}
