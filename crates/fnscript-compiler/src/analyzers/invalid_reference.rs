use std::path::Path;

use fnscript_core::{AnalyzerError, Diagnostic, codes};

use super::DiagnosticAnalyzer;
use crate::compilation::Compilation;
use crate::metadata::is_file_reference;

/// Reports `#r` references to `.dll` files that do not exist next to the
/// script. Such references are usually framework assemblies written with a
/// file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidFileMetadataReferenceAnalyzer;

impl DiagnosticAnalyzer for InvalidFileMetadataReferenceAnalyzer {
    fn id(&self) -> &'static str {
        codes::INVALID_FILE_METADATA_REFERENCE
    }

    fn analyze(&self, compilation: &dyn Compilation) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let mut diagnostics = Vec::new();
        for tree in compilation.syntax_trees() {
            let directory = tree.directory();
            for directive in tree.references() {
                if !is_file_reference(&directive.reference) {
                    continue;
                }
                let reference = Path::new(&directive.reference);
                let exists = match directory {
                    Some(dir) if reference.is_relative() => dir.join(reference).is_file(),
                    _ => reference.is_file(),
                };
                if !exists {
                    diagnostics.push(Diagnostic::warning(
                        codes::INVALID_FILE_METADATA_REFERENCE,
                        format!(
                            "The reference '{}' is invalid. If you are attempting to add a framework reference, please remove the '.dll' file extension.",
                            directive.reference
                        ),
                        directive.location.clone(),
                    ));
                }
            }
        }
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::Severity;
    use std::fs;

    use crate::compilation::ScriptCompilation;

    fn analyze(path: &str, text: &str) -> Vec<Diagnostic> {
        let compilation = ScriptCompilation::builder().source(path, text).build();
        InvalidFileMetadataReferenceAnalyzer
            .analyze(&compilation)
            .unwrap()
    }

    #[test]
    fn missing_dll_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.csx");
        let found = analyze(
            &script.to_string_lossy(),
            "#r \"System.Net.Http.dll\"\npublic static void Run() { }",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity(), Severity::Warning);
        assert!(found[0].message().starts_with("The reference 'System.Net.Http.dll' is invalid."));
        assert_eq!(found[0].location().span().map(|s| s.line), Some(1));
    }

    #[test]
    fn existing_dll_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Shared.dll"), b"MZ").unwrap();
        let script = dir.path().join("run.csx");
        let found = analyze(
            &script.to_string_lossy(),
            "#r \"Shared.dll\"\npublic static void Run() { }",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn shared_assembly_names_are_ignored() {
        let found = analyze(
            "run.csx",
            "#r \"Newtonsoft.Json\"\npublic static void Run() { }",
        );
        assert!(found.is_empty());
    }
}
