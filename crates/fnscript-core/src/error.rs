//! Error types for every phase of script compilation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! LexError            - tokenization errors, folded into ParseError
//! ParseError          - syntax errors (with ParseErrorKind), collected in ParseErrors
//! AnalyzerError       - an analyzer could not run
//! EntryPointError     - no single entry point could be selected
//! CompilationError    - failure of a compilation-unit operation
//! ```
//!
//! Syntax errors never escape as `Err` values from the compiler: they become
//! error-severity [`Diagnostic`]s through [`ParseError::to_diagnostic`], and
//! only surface as a [`CompilationError::Diagnostics`] at emission time.

use std::sync::Arc;

use thiserror::Error;

use crate::diagnostic::{Diagnostic, DiagnosticSliceExt, codes};
use crate::span::{Location, Span};

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string or character literal was not terminated.
    #[error("unterminated literal at {span}")]
    UnterminatedLiteral { span: Span },

    /// A block comment was not terminated.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedLiteral { span } => *span,
            LexError::UnterminatedComment { span } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of file.
    UnexpectedEof,
    /// A type was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A declaration was expected.
    ExpectedDeclaration,
    /// Function parameters were expected.
    ExpectedParameters,
    /// Mismatched delimiter (parentheses, brackets, braces).
    MismatchedDelimiter,
    /// A preprocessor directive is not recognized.
    InvalidDirective,
    /// A `#r` directive appears after other declarations.
    MisplacedDirective,
    /// Unexpected character in source.
    UnexpectedChar,
    /// String or character literal without closing quote.
    UnterminatedLiteral,
    /// Block comment without closing `*/`.
    UnterminatedComment,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of file",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedDeclaration => "expected declaration",
            ParseErrorKind::ExpectedParameters => "expected parameters",
            ParseErrorKind::MismatchedDelimiter => "mismatched delimiter",
            ParseErrorKind::InvalidDirective => "invalid directive",
            ParseErrorKind::MisplacedDirective => "misplaced directive",
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::UnterminatedLiteral => "unterminated literal",
            ParseErrorKind::UnterminatedComment => "unterminated comment",
        }
    }

    /// Diagnostic code reported for this kind of error.
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "FS1003",
            ParseErrorKind::UnexpectedToken => "FS1519",
            ParseErrorKind::UnexpectedEof => "FS1513",
            ParseErrorKind::ExpectedType => "FS1031",
            ParseErrorKind::ExpectedIdentifier => "FS1001",
            ParseErrorKind::ExpectedDeclaration => "FS1022",
            ParseErrorKind::ExpectedParameters => "FS1026",
            ParseErrorKind::MismatchedDelimiter => "FS1002",
            ParseErrorKind::InvalidDirective => "FS1024",
            ParseErrorKind::MisplacedDirective => "FS7011",
            ParseErrorKind::UnexpectedChar => codes::UNEXPECTED_CHARACTER,
            ParseErrorKind::UnterminatedLiteral => codes::UNTERMINATED_LITERAL,
            ParseErrorKind::UnterminatedComment => codes::UNTERMINATED_COMMENT,
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "expected identifier" error.
    pub fn expected_identifier(span: Span, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedIdentifier,
            span,
            format!("expected identifier, found {found}"),
        )
    }

    /// Create an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            "unexpected end of file",
        )
    }

    /// Convert into an error-severity diagnostic located in `path`.
    pub fn to_diagnostic(&self, path: &Arc<str>) -> Diagnostic {
        Diagnostic::error(
            self.kind.code(),
            self.message.clone(),
            Location::new(Arc::clone(path), self.span),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        let kind = match error {
            LexError::UnexpectedChar { .. } => ParseErrorKind::UnexpectedChar,
            LexError::UnterminatedLiteral { .. } => ParseErrorKind::UnterminatedLiteral,
            LexError::UnterminatedComment { .. } => ParseErrorKind::UnterminatedComment,
        };
        ParseError::new(kind, error.span(), error.to_string())
    }
}

/// A collection of parse errors.
///
/// Parsing continues after an error, so a single source can report several.
#[derive(Debug, Clone, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl std::fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

// ============================================================================
// Analyzer Errors
// ============================================================================

/// An analyzer failed to run to completion.
///
/// This is a fault, not a finding: findings are reported as diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("analyzer '{analyzer}' failed: {message}")]
pub struct AnalyzerError {
    /// Identifier of the analyzer that failed.
    pub analyzer: String,
    /// What went wrong.
    pub message: String,
}

impl AnalyzerError {
    pub fn new(analyzer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            analyzer: analyzer.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Entry Point Errors
// ============================================================================

/// No single entry point could be selected from the candidate methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryPointError {
    /// No candidate qualifies.
    #[error(
        "Missing function entry point. Your function must contain a single public method, a public method named 'Run', or a public method matching the name specified in the 'entryPoint' metadata property."
    )]
    Missing,

    /// Several candidates qualify equally.
    #[error("Ambiguous function entry points. Multiple methods named '{name}'. Consider renaming methods.")]
    Ambiguous {
        /// The name shared by the candidates.
        name: String,
    },
}

impl EntryPointError {
    /// Render this failure as an error diagnostic for function authors.
    pub fn diagnostic(&self) -> Diagnostic {
        let code = match self {
            EntryPointError::Missing => codes::MISSING_ENTRY_POINT,
            EntryPointError::Ambiguous { .. } => codes::AMBIGUOUS_ENTRY_POINT,
        };
        Diagnostic::error(code, self.to_string(), Location::none())
    }
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Failure of a compilation-unit operation.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// Entry-point resolution was requested on a compilation without sources.
    #[error("The current compilation does not have a syntax tree.")]
    NoSyntaxTree,

    /// Emission found error-severity diagnostics.
    ///
    /// Carries every diagnostic of the failed attempt, not only the errors.
    #[error("Script compilation failed.")]
    Diagnostics {
        /// The full merged diagnostic sequence.
        diagnostics: Vec<Diagnostic>,
    },

    /// The entry-point resolver could not select a method.
    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),

    /// Emission was cancelled.
    #[error("Script compilation was cancelled.")]
    Cancelled,

    /// An analyzer failed to run.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    /// A sink failed while the engine was writing output.
    #[error("failed to write compilation output: {0}")]
    Io(#[from] std::io::Error),
}

impl CompilationError {
    /// Whether the failure is caused by the script source itself, as opposed
    /// to a failure of the system compiling it.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CompilationError::Diagnostics { .. } | CompilationError::EntryPoint(_)
        )
    }

    /// Diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompilationError::Diagnostics { diagnostics } => diagnostics,
            _ => &[],
        }
    }

    /// Error-severity diagnostics carried by this error.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics().errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;

    #[test]
    fn lex_error_becomes_parse_error() {
        let error: ParseError = LexError::UnterminatedLiteral {
            span: Span::new(3, 9, 1),
        }
        .into();
        assert_eq!(error.kind, ParseErrorKind::UnterminatedLiteral);
        assert_eq!(error.span, Span::new(3, 9, 1));
    }

    #[test]
    fn parse_error_to_diagnostic() {
        let path: Arc<str> = "run.csx".into();
        let error = ParseError::expected_token(Span::new(1, 4, 1), "';'", "'}'");
        let diagnostic = error.to_diagnostic(&path);
        assert_eq!(diagnostic.code(), "FS1003");
        assert_eq!(diagnostic.severity(), Severity::Error);
        assert_eq!(diagnostic.location().path(), Some("run.csx"));
    }

    #[test]
    fn entry_point_error_diagnostics() {
        assert_eq!(EntryPointError::Missing.diagnostic().code(), "AF001");
        let ambiguous = EntryPointError::Ambiguous { name: "Run".into() };
        assert_eq!(ambiguous.diagnostic().code(), "AF002");
        assert!(ambiguous.to_string().contains("'Run'"));
    }

    #[test]
    fn user_errors_are_distinguished_from_faults() {
        let diagnostics = CompilationError::Diagnostics {
            diagnostics: vec![
                Diagnostic::warning("W", "w", Location::none()),
                Diagnostic::error("E", "e", Location::none()),
            ],
        };
        assert!(diagnostics.is_user_error());
        assert_eq!(diagnostics.diagnostics().len(), 2);
        assert_eq!(diagnostics.errors().count(), 1);

        assert!(!CompilationError::Cancelled.is_user_error());
        assert!(!CompilationError::NoSyntaxTree.is_user_error());
        assert!(CompilationError::Cancelled.diagnostics().is_empty());
    }
}
