//! Errors of the service layer.

use std::io;
use std::path::PathBuf;

use fnscript_core::{AnalyzerError, CompilationError, Diagnostic};
use thiserror::Error;

use crate::script_type::ScriptType;

/// Failure to provide or run a compilation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No compilation service exists for the script type.
    #[error("unsupported script type '{0}'")]
    UnsupportedScriptType(ScriptType),

    /// The function's script file could not be read.
    #[error("failed to read script file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Compilation(#[from] CompilationError),
}

impl ServiceError {
    /// Whether the failure is caused by the function's source.
    pub fn is_user_error(&self) -> bool {
        match self {
            ServiceError::Compilation(err) => err.is_user_error(),
            _ => false,
        }
    }

    /// Diagnostics carried by the failure, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ServiceError::Compilation(err) => err.diagnostics(),
            _ => &[],
        }
    }
}

impl From<AnalyzerError> for ServiceError {
    fn from(err: AnalyzerError) -> Self {
        ServiceError::Compilation(CompilationError::Analyzer(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::EntryPointError;

    #[test]
    fn user_errors_are_classified() {
        let err = ServiceError::from(CompilationError::from(EntryPointError::Missing));
        assert!(err.is_user_error());
        assert!(!ServiceError::UnsupportedScriptType(ScriptType::Python).is_user_error());
        let err = ServiceError::from(AnalyzerError::new("AF006", "crashed"));
        assert!(!err.is_user_error());
        assert!(err.diagnostics().is_empty());
    }

    #[test]
    fn messages_name_the_cause() {
        let err = ServiceError::Io {
            path: PathBuf::from("run.csx"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read script file 'run.csx': missing");
        assert_eq!(
            ServiceError::UnsupportedScriptType(ScriptType::FSharp).to_string(),
            "unsupported script type 'FSharp'"
        );
    }
}
