//! Main lexer implementation.
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, dispatching
//! on the first character of each token. Lexemes are copied into the arena.

use bumpalo::Bump;
use fnscript_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// Lexer for fnscript source code.
///
/// The `'src` lifetime is the source string being lexed (temporary).
/// The `'ast` lifetime is the arena where token lexemes are allocated.
pub struct Lexer<'src, 'ast> {
    cursor: Cursor<'src>,
    arena: &'ast Bump,
    errors: Vec<LexError>,
}

impl<'src, 'ast> Lexer<'src, 'ast> {
    pub fn new(source: &'src str, arena: &'ast Bump) -> Self {
        Self {
            cursor: Cursor::new(source),
            arena,
            errors: Vec::new(),
        }
    }

    /// Take accumulated errors, leaving an empty vec.
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'ast> {
        loop {
            self.skip_whitespace();

            if self.cursor.is_eof() {
                return self.make_eof();
            }

            let start = self.start();
            let token = match self.cursor.peek() {
                Some('/') => match self.scan_slash(start) {
                    Some(token) => token,
                    // comment skipped
                    None => continue,
                },
                Some('"') => self.scan_string(start),
                Some('\'') => self.scan_char(start),
                Some('@') | Some('$') => self.scan_prefixed(start),
                Some(c) if c.is_ascii_digit() => self.scan_number(start),
                Some(c) if is_ident_start(c) => self.scan_identifier(start),
                _ => self.scan_operator(start),
            };
            return token;
        }
    }

    fn skip_whitespace(&mut self) {
        if self.cursor.check_str("\u{FEFF}") {
            self.cursor.advance();
        }
        self.cursor.eat_while(char::is_whitespace);
    }

    fn start(&self) -> Start {
        Start {
            line: self.cursor.line(),
            col: self.cursor.column(),
            offset: self.cursor.offset(),
        }
    }

    fn make_eof(&self) -> Token<'ast> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span, self.cursor.offset())
    }

    fn make_token(&self, kind: TokenKind, start: Start) -> Token<'ast> {
        let lexeme = self.cursor.slice_from(start.offset);
        self.make_token_with(kind, start, lexeme)
    }

    fn make_token_with(&self, kind: TokenKind, start: Start, lexeme: &str) -> Token<'ast> {
        let len = self.cursor.offset() - start.offset;
        let span = Span::new(start.line, start.col, len);
        Token::new(kind, self.arena.alloc_str(lexeme), span, start.offset)
    }

    fn make_error(&mut self, error: LexError, start: Start) -> Token<'ast> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span, start.offset)
    }

    // =========================================
    // Comments and slash
    // =========================================

    /// Scan `/`, `//…` or `/*…*/`. Returns `None` when a comment was skipped.
    fn scan_slash(&mut self, start: Start) -> Option<Token<'ast>> {
        self.cursor.advance();
        match self.cursor.peek() {
            Some('/') => {
                self.cursor.eat_while(|c| c != '\n');
                None
            }
            Some('*') => {
                self.cursor.advance();
                loop {
                    if self.cursor.is_eof() {
                        let error = LexError::UnterminatedComment {
                            span: Span::new(start.line, start.col, 2),
                        };
                        return Some(self.make_error(error, start));
                    }
                    if self.cursor.check_str("*/") {
                        self.cursor.advance();
                        self.cursor.advance();
                        return None;
                    }
                    self.cursor.advance();
                }
            }
            _ => Some(self.make_token(TokenKind::Operator, start)),
        }
    }

    // =========================================
    // Literals
    // =========================================

    /// Scan a regular `"…"` string with backslash escapes.
    fn scan_string(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        self.scan_quoted('"', start, TokenKind::StringLiteral)
    }

    /// Scan a `'…'` character literal.
    fn scan_char(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        self.scan_quoted('\'', start, TokenKind::CharLiteral)
    }

    fn scan_quoted(&mut self, quote: char, start: Start, kind: TokenKind) -> Token<'ast> {
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let error = LexError::UnterminatedLiteral {
                        span: Span::new(start.line, start.col, 1),
                    };
                    return self.make_error(error, start);
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return self.make_token(kind, start);
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Scan `@"…"`, `$"…"`, `$@"…"`, `@$"…"` strings and `@identifier`.
    fn scan_prefixed(&mut self, start: Start) -> Token<'ast> {
        let mut verbatim = false;
        while let Some(c @ ('@' | '$')) = self.cursor.peek() {
            if c == '@' {
                verbatim = true;
            }
            self.cursor.advance();
        }

        match self.cursor.peek() {
            Some('"') if verbatim => {
                self.cursor.advance();
                self.scan_verbatim(start)
            }
            Some('"') => self.scan_string_continued(start),
            Some(c) if verbatim && is_ident_start(c) => {
                let name = self.cursor.eat_while(is_ident_continue);
                self.make_token_with(TokenKind::Identifier, start, name)
            }
            _ => {
                let ch = self.cursor.peek().unwrap_or('@');
                let error = LexError::UnexpectedChar {
                    ch,
                    span: Span::new(start.line, start.col, 1),
                };
                self.make_error(error, start)
            }
        }
    }

    fn scan_string_continued(&mut self, start: Start) -> Token<'ast> {
        self.cursor.advance();
        self.scan_quoted('"', start, TokenKind::StringLiteral)
    }

    /// Verbatim strings may span lines; `""` is an escaped quote.
    fn scan_verbatim(&mut self, start: Start) -> Token<'ast> {
        loop {
            match self.cursor.advance() {
                None => {
                    let error = LexError::UnterminatedLiteral {
                        span: Span::new(start.line, start.col, 2),
                    };
                    return self.make_error(error, start);
                }
                Some('"') => {
                    if !self.cursor.eat('"') {
                        return self.make_token(TokenKind::StringLiteral, start);
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Numbers are opaque: digits, letters (hex digits, suffixes), `_` and
    /// a decimal point followed by a digit.
    fn scan_number(&mut self, start: Start) -> Token<'ast> {
        loop {
            self.cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let fraction = self.cursor.peek() == Some('.')
                && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit());
            if !fraction {
                break;
            }
            self.cursor.advance();
        }
        self.make_token(TokenKind::NumberLiteral, start)
    }

    fn scan_identifier(&mut self, start: Start) -> Token<'ast> {
        let ident = self.cursor.eat_while(is_ident_continue);
        let kind = lookup_keyword(ident).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, start)
    }

    // =========================================
    // Operators and punctuation
    // =========================================

    fn scan_operator(&mut self, start: Start) -> Token<'ast> {
        let Some(ch) = self.cursor.advance() else {
            return self.make_eof();
        };
        let kind = match ch {
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '#' => TokenKind::Hash,
            ':' => {
                if self.cursor.eat(':') {
                    TokenKind::Operator
                } else {
                    TokenKind::Colon
                }
            }
            '=' => {
                if self.cursor.eat('>') {
                    TokenKind::Arrow
                } else if self.cursor.eat('=') {
                    TokenKind::Operator
                } else {
                    TokenKind::Equal
                }
            }
            '?' => {
                if self.cursor.eat('?') || self.cursor.eat('.') {
                    TokenKind::Operator
                } else {
                    TokenKind::Question
                }
            }
            '+' | '-' | '*' | '%' | '!' | '&' | '|' | '^' | '~' => TokenKind::Operator,
            _ => {
                let error = LexError::UnexpectedChar {
                    ch,
                    span: Span::new(start.line, start.col, ch.len_utf8() as u32),
                };
                return self.make_error(error, start);
            }
        };
        self.make_token(kind, start)
    }
}

#[derive(Clone, Copy)]
struct Start {
    line: u32,
    col: u32,
    offset: u32,
}
