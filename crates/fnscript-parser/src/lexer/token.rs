//! Token types for the fnscript lexer.

use std::fmt;

use fnscript_core::Span;

/// A token from the source code.
///
/// The lexeme is allocated in the parser's arena, so the source string can be
/// dropped once lexing completes. `offset` is the byte offset of the lexeme in
/// the original source, which lets later phases slice method bodies back out.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'ast> {
    pub kind: TokenKind,
    pub lexeme: &'ast str,
    pub span: Span,
    pub offset: u32,
}

impl<'ast> Token<'ast> {
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'ast str, span: Span, offset: u32) -> Self {
        Self {
            kind,
            lexeme,
            span,
            offset,
        }
    }

    /// Byte offset just past the end of this token.
    #[inline]
    pub fn end_offset(&self) -> u32 {
        self.offset + self.span.len
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types.
///
/// Method bodies are not parsed, so every operator that only appears inside
/// bodies collapses into [`TokenKind::Operator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    StringLiteral,
    CharLiteral,
    NumberLiteral,

    Identifier,

    // Declaration keywords
    Using,
    Class,
    Struct,
    Interface,
    Enum,
    Record,

    // Modifiers
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Async,
    /// Modifiers that do not affect the script class shape
    /// (`readonly`, `sealed`, `abstract`, `virtual`, `override`, ...).
    OtherModifier,

    // Parameter modifiers
    Ref,
    Out,
    In,
    Params,
    This,

    // Punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Less,
    Greater,
    Comma,
    Semicolon,
    Dot,
    Colon,
    Equal,
    /// `=>`
    Arrow,
    Question,
    /// `#`, introducing a directive.
    Hash,
    /// Any other operator.
    Operator,

    Eof,
    Error,
}

impl TokenKind {
    /// Whether this token is a member modifier.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Private
                | TokenKind::Protected
                | TokenKind::Internal
                | TokenKind::Static
                | TokenKind::Async
                | TokenKind::OtherModifier
        )
    }

    /// Whether this token introduces a type declaration.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Record
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::NumberLiteral => "number",
            TokenKind::Identifier => "identifier",
            TokenKind::Using => "'using'",
            TokenKind::Class => "'class'",
            TokenKind::Struct => "'struct'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Record => "'record'",
            TokenKind::Public => "'public'",
            TokenKind::Private => "'private'",
            TokenKind::Protected => "'protected'",
            TokenKind::Internal => "'internal'",
            TokenKind::Static => "'static'",
            TokenKind::Async => "'async'",
            TokenKind::OtherModifier => "modifier",
            TokenKind::Ref => "'ref'",
            TokenKind::Out => "'out'",
            TokenKind::In => "'in'",
            TokenKind::Params => "'params'",
            TokenKind::This => "'this'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::Equal => "'='",
            TokenKind::Arrow => "'=>'",
            TokenKind::Question => "'?'",
            TokenKind::Hash => "'#'",
            TokenKind::Operator => "operator",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up a keyword, returning `None` for plain identifiers.
///
/// Predefined type names (`int`, `string`, `void`, ...) are identifiers; the
/// binder maps them onto framework types.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "using" => TokenKind::Using,
        "class" => TokenKind::Class,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "record" => TokenKind::Record,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "internal" => TokenKind::Internal,
        "static" => TokenKind::Static,
        "async" => TokenKind::Async,
        "readonly" | "sealed" | "abstract" | "virtual" | "override" | "partial" | "unsafe"
        | "extern" | "new" | "const" | "volatile" => TokenKind::OtherModifier,
        "ref" => TokenKind::Ref,
        "out" => TokenKind::Out,
        "in" => TokenKind::In,
        "params" => TokenKind::Params,
        "this" => TokenKind::This,
        _ => return None,
    };
    Some(kind)
}
