use fnscript_core::{AnalyzerError, Diagnostic, codes};

use super::DiagnosticAnalyzer;
use crate::compilation::Compilation;

/// Reports `async void` methods. The host cannot observe their completion
/// or their exceptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncVoidAnalyzer;

impl DiagnosticAnalyzer for AsyncVoidAnalyzer {
    fn id(&self) -> &'static str {
        codes::ASYNC_VOID
    }

    fn analyze(&self, compilation: &dyn Compilation) -> Result<Vec<Diagnostic>, AnalyzerError> {
        Ok(compilation
            .script_class()
            .methods()
            .filter(|method| method.is_async() && method.return_type.is_void())
            .map(|method| {
                Diagnostic::warning(
                    codes::ASYNC_VOID,
                    format!(
                        "Method '{}' is async and returns void. Return a Task so that the host can observe completion and errors.",
                        method.name
                    ),
                    method.location.clone(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::ScriptCompilation;

    #[test]
    fn async_void_is_reported() {
        let compilation = ScriptCompilation::builder()
            .source(
                "run.csx",
                r#"
                public static async void Run(string input) { await Task.Delay(1); }
                public static async Task RunAsync(string input) { await Task.Delay(1); }
                public static void Sync() { }
                "#,
            )
            .build();
        let found = AsyncVoidAnalyzer.analyze(&compilation).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].message().contains("'Run'"));
        assert_eq!(found[0].location().span().map(|s| s.line), Some(2));
    }
}
