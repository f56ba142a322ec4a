//! Abstract Syntax Tree (AST) for fnscript sources.
//!
//! Nodes are allocated in a `bumpalo` arena and borrow from it; the source
//! text itself can be dropped once parsing completes.
//!
//! # Example
//!
//! ```
//! use fnscript_parser::{Item, Parser};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let source = r#"
//!     using System;
//!
//!     public static string Run(string name) => $"Hello {name}";
//! "#;
//!
//! let script = Parser::parse(source, &arena).expect("valid script");
//! assert!(matches!(script.items()[1], Item::Method(_)));
//! ```

pub mod decl;
mod decl_parser;
mod parser;
mod type_parser;
pub mod types;

// Re-export error types from core
pub use fnscript_core::{ParseError, ParseErrorKind, ParseErrors};

pub use decl::*;
pub use parser::Parser;
pub use types::*;

use fnscript_core::Span;

/// A parsed script.
#[derive(Debug)]
pub struct Script<'ast> {
    items: &'ast [Item<'ast>],
    span: Span,
}

impl<'ast> Script<'ast> {
    pub(crate) fn new(items: &'ast [Item<'ast>], span: Span) -> Self {
        Self { items, span }
    }

    /// Top-level items in source order.
    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// `#r` references in source order.
    pub fn references(&self) -> impl Iterator<Item = &ReferenceDirective<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Reference(r) => Some(r),
            _ => None,
        })
    }

    /// `using` directives in source order.
    pub fn usings(&self) -> impl Iterator<Item = &UsingDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Using(u) => Some(u),
            _ => None,
        })
    }
}
