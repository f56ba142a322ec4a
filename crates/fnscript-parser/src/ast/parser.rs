//! Parser infrastructure: token buffer, lookahead and error recovery.
//!
//! The source is tokenized up front into a buffer so declaration parsing can
//! look ahead arbitrarily and rewind when a speculative parse fails.

use bumpalo::Bump;
use fnscript_core::{ParseError, ParseErrorKind, ParseErrors, Span};

use crate::ast::{Ident, Script};
use crate::lexer::{Lexer, Token, TokenKind};

/// Parser for fnscript sources.
pub struct Parser<'ast> {
    pub(crate) buffer: Vec<Token<'ast>>,
    pub(crate) position: usize,
    pub(crate) arena: &'ast Bump,
    pub(crate) errors: ParseErrors,
    /// Set once an item other than a `#r` directive has been parsed.
    pub(crate) seen_declaration: bool,
    eof: Token<'ast>,
}

impl<'ast> Parser<'ast> {
    /// Tokenize `source` into a new parser. Lex errors are recorded as parse
    /// errors and the offending characters are dropped from the buffer.
    pub fn new(source: &str, arena: &'ast Bump) -> Self {
        let mut lexer = Lexer::new(source, arena);
        let mut buffer = Vec::new();
        let eof = loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Error => continue,
                TokenKind::Eof => {
                    buffer.push(token);
                    break token;
                }
                _ => buffer.push(token),
            }
        };

        let mut errors = ParseErrors::new();
        for error in lexer.take_errors() {
            errors.push(error.into());
        }

        Self {
            buffer,
            position: 0,
            arena,
            errors,
            seen_declaration: false,
            eof,
        }
    }

    /// Parse a complete script, failing if any error occurred.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &str, arena: &'ast Bump) -> Result<Script<'ast>, ParseErrors> {
        let (script, errors) = Self::parse_lenient(source, arena);
        if errors.is_empty() {
            Ok(script)
        } else {
            Err(errors)
        }
    }

    /// Parse a script, recovering from errors.
    ///
    /// Returns whatever could be parsed along with every error encountered.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_lenient(source: &str, arena: &'ast Bump) -> (Script<'ast>, ParseErrors) {
        let mut parser = Parser::new(source, arena);
        let script = parser.parse_script();
        (script, parser.errors)
    }

    // =========================================
    // Token access
    // =========================================

    #[inline]
    pub(crate) fn peek(&self) -> Token<'ast> {
        self.peek_nth(0)
    }

    #[inline]
    pub(crate) fn peek_nth(&self, n: usize) -> Token<'ast> {
        self.buffer
            .get(self.position + n)
            .copied()
            .unwrap_or(self.eof)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Consume the current token. Never moves past end of file.
    pub(crate) fn advance(&mut self) -> Token<'ast> {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Whether the current token is the contextual keyword `name`.
    #[inline]
    pub(crate) fn check_contextual(&self, name: &str) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier && token.lexeme == name
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token<'ast>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'ast>, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let found = self.peek();
        if found.kind == TokenKind::Eof {
            Err(ParseError::unexpected_eof(found.span))
        } else {
            Err(ParseError::expected_token(
                found.span,
                kind.as_str(),
                found.kind.as_str(),
            ))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(Ident::new(token.lexeme, token.span))
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => Err(ParseError::expected_identifier(token.span, token.kind.as_str())),
        }
    }

    /// Span from `start` up to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Token<'ast>) -> Span {
        let end = self
            .position
            .checked_sub(1)
            .and_then(|i| self.buffer.get(i))
            .map(|t| t.end_offset())
            .unwrap_or(start.end_offset());
        Span::new(
            start.span.line,
            start.span.col,
            end.saturating_sub(start.offset),
        )
    }

    /// Byte offset just past the last consumed token.
    pub(crate) fn previous_end(&self) -> u32 {
        self.position
            .checked_sub(1)
            .and_then(|i| self.buffer.get(i))
            .map(|t| t.end_offset())
            .unwrap_or(0)
    }

    pub(crate) fn error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    // =========================================
    // Skipping and recovery
    // =========================================

    /// Skip a delimited group starting at the current `open` token, returning
    /// the matching close token. Nested groups of any kind are balanced.
    pub(crate) fn skip_group(&mut self) -> Result<Token<'ast>, ParseError> {
        let open = self.advance();
        let mut stack = vec![closing_for(open.kind)];
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedDelimiter,
                        open.span,
                        format!("unclosed {}", open.kind),
                    ));
                }
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    stack.push(closing_for(token.kind));
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    if stack.last() != Some(&token.kind) {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedDelimiter,
                            token.span,
                            format!("unexpected {}", token.kind),
                        ));
                    }
                    stack.pop();
                    if stack.is_empty() {
                        return Ok(token);
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip tokens until one of `stops` is found outside any delimited group.
    /// The stop token is not consumed.
    pub(crate) fn skip_until(&mut self, stops: &[TokenKind]) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            if stops.contains(&token.kind) {
                return Ok(());
            }
            match token.kind {
                TokenKind::Eof => return Err(ParseError::unexpected_eof(token.span)),
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    self.skip_group()?;
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedDelimiter,
                        token.span,
                        format!("unexpected {}", token.kind),
                    ));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip attribute lists such as `[FunctionName("Run")]`.
    pub(crate) fn skip_attributes(&mut self) -> Result<(), ParseError> {
        while self.check(TokenKind::LeftBracket) {
            self.skip_group()?;
        }
        Ok(())
    }

    /// Skip to a point where parsing can resume after an error.
    ///
    /// Stops after a `;` or `}` at nesting depth zero, or before a token that
    /// starts a declaration.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return,
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    depth += 1;
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                    depth -= 1;
                    if depth == 0 && token.kind == TokenKind::RightBrace {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                kind if depth == 0 && starts_declaration(kind) => return,
                _ => {}
            }
            self.advance();
        }
    }
}

fn closing_for(open: TokenKind) -> TokenKind {
    match open {
        TokenKind::LeftParen => TokenKind::RightParen,
        TokenKind::LeftBracket => TokenKind::RightBracket,
        _ => TokenKind::RightBrace,
    }
}

fn starts_declaration(kind: TokenKind) -> bool {
    kind.is_modifier() || kind.is_type_keyword() || matches!(kind, TokenKind::Hash | TokenKind::Using)
}
