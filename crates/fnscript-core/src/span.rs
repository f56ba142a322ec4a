//! Source location tracking for diagnostics.
//!
//! [`Span`] marks where a token or declaration starts inside one source text,
//! [`Location`] pairs a span with the path of the document it belongs to.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A span of source code, represented by its starting position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, byte-based).
    pub col: u32,
    /// Length in bytes.
    pub len: u32,
}

impl Span {
    /// Create a new span from a line, column, and length.
    #[inline]
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Self { line, col, len }
    }

    /// Create a zero-length span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, len: 0 }
    }

    /// Whether this span is empty (zero length).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend this span so that it also covers `other`.
    ///
    /// Spans on different lines keep the start of `self` and add the lengths.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        if self.line == other.line {
            let start_col = self.col.min(other.col);
            let end_col = (other.col + other.len).max(self.col + self.len);
            Span::new(self.line, start_col, end_col - start_col)
        } else {
            Span::new(self.line, self.col, self.len + other.len)
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Where a diagnostic points: a document path (if any) and a span inside it.
///
/// Diagnostics that are not tied to source text, such as a missing metadata
/// file supplied by the host, use [`Location::none`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    path: Option<Arc<str>>,
    span: Option<Span>,
}

impl Location {
    /// A location inside the document at `path`.
    pub fn new(path: Arc<str>, span: Span) -> Self {
        Self {
            path: Some(path),
            span: Some(span),
        }
    }

    /// A location that is not associated with any source.
    pub fn none() -> Self {
        Self::default()
    }

    /// Document path, if the location is in source.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Span inside the document, if the location is in source.
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Whether this location points into a source document.
    pub fn is_in_source(&self) -> bool {
        self.span.is_some()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.span) {
            (Some(path), Some(span)) => write!(f, "{}({},{})", path, span.line, span.col),
            (None, Some(span)) => write!(f, "({},{})", span.line, span.col),
            (Some(path), None) => f.write_str(path),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        let span = Span::new(3, 15, 5);
        assert_eq!(format!("{}", span), "3:15");
        assert!(Span::point(1, 1).is_empty());
    }

    #[test]
    fn span_merge_same_line() {
        let merged = Span::new(1, 5, 3).merge(Span::new(1, 10, 3));
        assert_eq!(merged, Span::new(1, 5, 8));
    }

    #[test]
    fn span_merge_different_lines() {
        let merged = Span::new(1, 5, 10).merge(Span::new(3, 10, 5));
        assert_eq!(merged, Span::new(1, 5, 15));
    }

    #[test]
    fn location_display() {
        let loc = Location::new("run.csx".into(), Span::new(4, 2, 3));
        assert_eq!(loc.to_string(), "run.csx(4,2)");
        assert_eq!(Location::none().to_string(), "");
        assert!(!Location::none().is_in_source());
    }
}
