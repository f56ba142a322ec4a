//! Static analyzers run over a compilation.
//!
//! An analyzer inspects a compilation and reports findings as diagnostics.
//! The built-in host rules are registered once per process and shared by
//! every compilation unit.

mod async_void;
mod invalid_reference;

use std::sync::Arc;

use fnscript_core::{AnalyzerError, Diagnostic};
use lazy_static::lazy_static;

pub use async_void::AsyncVoidAnalyzer;
pub use invalid_reference::InvalidFileMetadataReferenceAnalyzer;

use crate::compilation::Compilation;

/// A static-analysis rule.
pub trait DiagnosticAnalyzer: Send + Sync {
    /// Stable identifier of the rule, used in logs and faults.
    fn id(&self) -> &'static str;

    /// Findings for `compilation`, in discovery order.
    ///
    /// An `Err` means the analyzer itself failed; it is not a finding.
    fn analyze(&self, compilation: &dyn Compilation) -> Result<Vec<Diagnostic>, AnalyzerError>;
}

lazy_static! {
    static ref BUILTIN_ANALYZERS: Vec<Arc<dyn DiagnosticAnalyzer>> = vec![
        Arc::new(InvalidFileMetadataReferenceAnalyzer),
        Arc::new(AsyncVoidAnalyzer),
    ];
}

/// The host's analyzers, in registration order.
pub fn builtin_analyzers() -> &'static [Arc<dyn DiagnosticAnalyzer>] {
    &BUILTIN_ANALYZERS
}

/// A compilation paired with a fixed set of analyzers.
pub struct CompilationWithAnalyzers<'a> {
    compilation: &'a dyn Compilation,
    analyzers: &'a [Arc<dyn DiagnosticAnalyzer>],
}

impl<'a> CompilationWithAnalyzers<'a> {
    pub fn new(compilation: &'a dyn Compilation, analyzers: &'a [Arc<dyn DiagnosticAnalyzer>]) -> Self {
        Self {
            compilation,
            analyzers,
        }
    }

    /// Run every analyzer in registration order and concatenate findings.
    /// The first analyzer fault aborts the run.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyzer_diagnostics(&self) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let mut diagnostics = Vec::new();
        for analyzer in self.analyzers {
            let found = analyzer.analyze(self.compilation)?;
            tracing::trace!(analyzer = analyzer.id(), found = found.len(), "analyzer finished");
            diagnostics.extend(found);
        }
        Ok(diagnostics)
    }

    /// Analyzer diagnostics followed by the compilation's native ones.
    pub fn all_diagnostics(&self) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let mut diagnostics = self.analyzer_diagnostics()?;
        diagnostics.extend(self.compilation.diagnostics());
        Ok(diagnostics)
    }
}
