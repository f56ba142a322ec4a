//! Type expression AST nodes.

use std::fmt;

use fnscript_core::Span;

use crate::ast::Ident;

/// A type as written in source: `System.Collections.Generic.List<int>[]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeExpr<'ast> {
    /// Dotted name segments. Never empty.
    pub path: &'ast [Ident<'ast>],
    /// Generic arguments applied to the last segment.
    pub type_args: &'ast [TypeExpr<'ast>],
    /// Suffixes in source order (`int?[]` is `[Nullable, Array]`).
    pub suffixes: &'ast [TypeSuffix],
    pub span: Span,
}

impl<'ast> TypeExpr<'ast> {
    pub fn new(
        path: &'ast [Ident<'ast>],
        type_args: &'ast [TypeExpr<'ast>],
        suffixes: &'ast [TypeSuffix],
        span: Span,
    ) -> Self {
        Self {
            path,
            type_args,
            suffixes,
            span,
        }
    }

    /// The last path segment.
    pub fn name(&self) -> &'ast str {
        self.path.last().map(|ident| ident.name).unwrap_or("")
    }

    /// Leading segments, joined with `.`; `None` for a simple name.
    pub fn qualifier(&self) -> Option<String> {
        match self.path.len() {
            0 | 1 => None,
            n => Some(
                self.path[..n - 1]
                    .iter()
                    .map(|ident| ident.name)
                    .collect::<Vec<_>>()
                    .join("."),
            ),
        }
    }

    pub fn is_simple(&self) -> bool {
        self.path.len() == 1 && self.type_args.is_empty() && self.suffixes.is_empty()
    }

    /// `void` as a return type.
    pub fn is_void(&self) -> bool {
        self.is_simple() && self.name() == "void"
    }

    /// The same type without its outermost suffix.
    pub fn without_last_suffix(&self) -> Option<(TypeExpr<'ast>, TypeSuffix)> {
        let (last, rest) = self.suffixes.split_last()?;
        Some((TypeExpr { suffixes: rest, ..*self }, *last))
    }
}

impl fmt::Display for TypeExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment.name)?;
        }
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        for suffix in self.suffixes {
            f.write_str(suffix.as_str())?;
        }
        Ok(())
    }
}

/// Type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSuffix {
    /// `?`
    Nullable,
    /// `[]`
    Array,
}

impl TypeSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeSuffix::Nullable => "?",
            TypeSuffix::Array => "[]",
        }
    }
}
