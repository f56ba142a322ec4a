//! Declaration AST nodes.
//!
//! Only declaration shapes are represented. Method bodies, initializers and
//! top-level statements are opaque: the parser records where they are in the
//! source and skips them by delimiter matching.

use fnscript_core::{Modifiers, RefKind, Span};

use crate::ast::types::TypeExpr;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A top-level item in a script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// `#r "Assembly"`
    Reference(ReferenceDirective<'ast>),
    /// `using System.Net;`
    Using(UsingDecl<'ast>),
    /// `class Payload { ... }`
    Type(TypeDecl<'ast>),
    /// `public static void Run(...) { ... }`
    Method(MethodDecl<'ast>),
    /// `static int counter = 0;`
    Field(FieldDecl<'ast>),
    /// `string Name { get; set; }`
    Property(PropertyDecl<'ast>),
    /// A top-level statement, kept as an opaque source range.
    Statement(Body),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Self::Reference(d) => d.span,
            Self::Using(d) => d.span,
            Self::Type(d) => d.span,
            Self::Method(d) => d.span,
            Self::Field(d) => d.span,
            Self::Property(d) => d.span,
            Self::Statement(b) => b.span,
        }
    }
}

/// A `#r` metadata reference directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDirective<'ast> {
    /// The reference text without quotes.
    pub reference: &'ast str,
    pub span: Span,
}

/// A `using` directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsingDecl<'ast> {
    pub path: &'ast [Ident<'ast>],
    /// `using static System.Math;`
    pub is_static: bool,
    /// `using Json = Newtonsoft.Json;`
    pub alias: Option<Ident<'ast>>,
    pub span: Span,
}

impl UsingDecl<'_> {
    /// The imported namespace or type, joined with `.`.
    pub fn target(&self) -> String {
        self.path
            .iter()
            .map(|ident| ident.name)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
}

/// A type declared in the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    pub modifiers: Modifiers,
    pub kind: TypeDeclKind,
    pub name: Ident<'ast>,
    pub type_params: &'ast [Ident<'ast>],
    pub bases: &'ast [TypeExpr<'ast>],
    pub span: Span,
}

/// How a method body is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// `{ ... }`
    Block,
    /// `=> ...;`
    Expression,
    /// A top-level statement.
    Statement,
}

/// An opaque range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body {
    pub kind: BodyKind,
    /// Byte offset of the first token.
    pub start: u32,
    /// Byte offset just past the last token.
    pub end: u32,
    pub span: Span,
}

impl Body {
    /// The source text of this body.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or("")
    }
}

/// A method declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub modifiers: Modifiers,
    pub return_type: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub type_params: &'ast [Ident<'ast>],
    pub params: &'ast [Param<'ast>],
    pub body: Body,
    pub span: Span,
}

/// A method parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub ref_kind: RefKind,
    /// Extension-method receiver.
    pub is_this: bool,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub has_default: bool,
    pub span: Span,
}

/// A field declaration. `int a = 1, b;` declares two names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub modifiers: Modifiers,
    pub ty: TypeExpr<'ast>,
    pub names: &'ast [Ident<'ast>],
    pub span: Span,
}

/// A property declaration with accessors or an expression body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDecl<'ast> {
    pub modifiers: Modifiers,
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}
