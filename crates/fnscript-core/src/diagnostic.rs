//! Compiler and analyzer diagnostics.
//!
//! A [`Diagnostic`] is a single message produced while compiling or
//! analyzing a script: a stable code, a human-readable message, a
//! [`Severity`], and a [`Location`]. Diagnostics are collected into plain
//! `Vec<Diagnostic>` sequences whose order is meaningful, so nothing in this
//! module sorts or deduplicates them.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::span::Location;

/// Stable diagnostic codes reported by the compiler, the host analyzers and
/// the entry-point resolver.
pub mod codes {
    /// A `#r` reference could not be resolved to metadata.
    pub const METADATA_FILE_NOT_FOUND: &str = "FS0006";
    /// Two types with the same name are declared in the compilation.
    pub const DUPLICATE_TYPE: &str = "FS0101";
    /// A type name matches types in more than one imported namespace.
    pub const AMBIGUOUS_TYPE: &str = "FS0104";
    /// Two members with the same signature are declared in the script class.
    pub const DUPLICATE_MEMBER: &str = "FS0111";
    /// A type name could not be resolved.
    pub const TYPE_NOT_FOUND: &str = "FS0246";
    /// A generic type was used with the wrong number of type arguments.
    pub const WRONG_ARITY: &str = "FS0305";
    /// An unexpected character in source.
    pub const UNEXPECTED_CHARACTER: &str = "FS1056";
    /// A string or character literal is missing its closing quote.
    pub const UNTERMINATED_LITERAL: &str = "FS1010";
    /// A block comment is missing its closing `*/`.
    pub const UNTERMINATED_COMMENT: &str = "FS1035";

    /// The function has no resolvable entry point.
    pub const MISSING_ENTRY_POINT: &str = "AF001";
    /// More than one method qualifies as the entry point.
    pub const AMBIGUOUS_ENTRY_POINT: &str = "AF002";
    /// A `#r` reference to a `.dll` that does not exist.
    pub const INVALID_FILE_METADATA_REFERENCE: &str = "AF006";
    /// An `async` method that returns `void`.
    pub const ASYNC_VOID: &str = "AF008";
}

/// Severity of a diagnostic.
///
/// Only [`Severity::Error`] blocks emission; warnings and infos are
/// reported but never fail a build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum Severity {
    /// Informational message.
    Info = 0,
    /// Potential problem that does not prevent compilation.
    Warning = 1,
    /// Problem that makes the compilation unusable.
    Error = 2,
}

impl Severity {
    /// Lower-case name as rendered in diagnostic output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: String,
    message: String,
    severity: Severity,
    location: Location,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            location,
        }
    }

    /// Create an error diagnostic.
    pub fn error(code: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self::new(code, Severity::Error, message, location)
    }

    /// Create a warning diagnostic.
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(code, Severity::Warning, message, location)
    }

    /// Create an informational diagnostic.
    pub fn info(code: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        Self::new(code, Severity::Info, message, location)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Whether this diagnostic has [`Severity::Error`].
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Renders as `path(line,col): severity CODE: message`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_in_source() || self.location.path().is_some() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}

/// Queries over an ordered sequence of diagnostics.
pub trait DiagnosticSliceExt {
    /// Whether any diagnostic has error severity.
    fn has_errors(&self) -> bool;

    /// Iterate over the error-severity diagnostics, in order.
    fn errors(&self) -> impl Iterator<Item = &Diagnostic>;

    /// Number of diagnostics with the given severity.
    fn count_of(&self, severity: Severity) -> usize;
}

impl DiagnosticSliceExt for [Diagnostic] {
    fn has_errors(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }

    fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.is_error())
    }

    fn count_of(&self, severity: Severity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn display_with_location() {
        let diagnostic = Diagnostic::error(
            codes::TYPE_NOT_FOUND,
            "The type or namespace name 'Foo' could not be found",
            Location::new("run.csx".into(), Span::new(2, 17, 3)),
        );
        assert_eq!(
            diagnostic.to_string(),
            "run.csx(2,17): error FS0246: The type or namespace name 'Foo' could not be found"
        );
    }

    #[test]
    fn display_without_location() {
        let diagnostic = Diagnostic::warning("AF006", "bad reference", Location::none());
        assert_eq!(diagnostic.to_string(), "warning AF006: bad reference");
    }

    #[test]
    fn slice_queries() {
        let diagnostics = vec![
            Diagnostic::warning("W1", "first", Location::none()),
            Diagnostic::error("E1", "second", Location::none()),
            Diagnostic::info("I1", "third", Location::none()),
        ];
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.count_of(Severity::Warning), 1);
        assert!(!diagnostics[..1].has_errors());
    }

    #[test]
    fn severity_round_trips_through_u8() {
        let raw: u8 = Severity::Error.into();
        assert_eq!(raw, 2);
        assert_eq!(Severity::try_from(1u8).ok(), Some(Severity::Warning));
        assert!(Severity::try_from(9u8).is_err());
        assert!(Severity::Error > Severity::Warning);
    }
}
