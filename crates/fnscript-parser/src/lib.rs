//! fnscript parser crate.
//!
//! Lexer and declaration parser for function scripts (`.csx`). Only the
//! declaration structure is parsed; method bodies and top-level statements
//! are recorded as opaque source ranges.
//!
//! # Example
//!
//! ```
//! use fnscript_parser::Parser;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! match Parser::parse("public static void Run(string input) { }", &arena) {
//!     Ok(script) => println!("Parsed successfully: {} items", script.items().len()),
//!     Err(errors) => eprintln!("Parse errors: {}", errors),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{
    Body, BodyKind, FieldDecl, Ident, Item, MethodDecl, Param, Parser, PropertyDecl,
    ReferenceDirective, Script, TypeDecl, TypeDeclKind, TypeExpr, TypeSuffix, UsingDecl,
};
pub use lexer::{Lexer, Token, TokenKind};
