//! Source texts and the per-document view a compilation keeps of them.

use std::path::Path;
use std::sync::Arc;

use fnscript_core::Location;
use fnscript_parser::Script;
use xxhash_rust::xxh64::xxh64;

/// A script document handed to a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    path: Arc<str>,
    text: Arc<str>,
}

impl SourceText {
    pub fn new(path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A `#r` directive as it appears in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// The quoted reference, without quotes.
    pub reference: String,
    pub location: Location,
}

/// A parsed document of a compilation.
///
/// The declarations themselves are lowered into symbols when the
/// compilation is bound; the tree keeps what analyzers and debug symbols
/// need from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    path: Arc<str>,
    text: Arc<str>,
    references: Vec<SourceReference>,
    usings: Vec<String>,
}

impl SyntaxTree {
    pub fn new(source: &SourceText, references: Vec<SourceReference>, usings: Vec<String>) -> Self {
        Self {
            path: Arc::clone(&source.path),
            text: Arc::clone(&source.text),
            references,
            usings,
        }
    }

    pub(crate) fn from_script(source: &SourceText, script: &Script<'_>) -> Self {
        let references = script
            .references()
            .map(|directive| SourceReference {
                reference: directive.reference.to_string(),
                location: Location::new(Arc::clone(&source.path), directive.span),
            })
            .collect();
        let usings = script.usings().map(|using| using.target()).collect();
        Self::new(source, references, usings)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn path_arc(&self) -> &Arc<str> {
        &self.path
    }

    /// Directory containing the document, if the path has one.
    pub fn directory(&self) -> Option<&Path> {
        Path::new(&*self.path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `#r` directives in document order.
    pub fn references(&self) -> &[SourceReference] {
        &self.references
    }

    /// Targets of the document's `using` directives.
    pub fn usings(&self) -> &[String] {
        &self.usings
    }

    /// xxh64 checksum of the document text.
    pub fn checksum(&self) -> u64 {
        xxh64(self.text.as_bytes(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use fnscript_parser::Parser;

    #[test]
    fn tree_records_directives() {
        let source = SourceText::new(
            "/home/site/wwwroot/HttpTrigger/run.csx",
            "#r \"Newtonsoft.Json\"\nusing System.Net;\npublic static void Run() { }\n",
        );
        let arena = Bump::new();
        let script = Parser::parse(source.text(), &arena).unwrap();
        let tree = SyntaxTree::from_script(&source, &script);

        assert_eq!(tree.references().len(), 1);
        assert_eq!(tree.references()[0].reference, "Newtonsoft.Json");
        assert_eq!(tree.references()[0].location.span().map(|s| s.line), Some(1));
        assert_eq!(tree.usings(), ["System.Net".to_string()]);
        assert_eq!(
            tree.directory(),
            Some(Path::new("/home/site/wwwroot/HttpTrigger"))
        );
    }

    #[test]
    fn bare_file_name_has_no_directory() {
        let tree = SyntaxTree::new(&SourceText::new("run.csx", ""), Vec::new(), Vec::new());
        assert!(tree.directory().is_none());
        assert_eq!(tree.checksum(), xxh64(b"", 0));
    }
}
