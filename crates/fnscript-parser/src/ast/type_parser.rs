//! Type expression parsing.
//!
//! Implements parsing of:
//! - Simple and dotted names (`int`, `System.Net.Http.HttpClient`)
//! - Generic argument lists (`Dictionary<string, List<int>>`)
//! - Nullable and array suffixes (`int?`, `string[]`, `byte[,]`)
//! - Type parameter lists on declarations (`<T, in U>`)

use fnscript_core::{ParseError, ParseErrorKind};

use super::parser::Parser;
use crate::ast::Ident;
use crate::ast::types::{TypeExpr, TypeSuffix};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a complete type expression.
    ///
    /// Grammar: `('global' '::')? IDENT ('.' IDENT)* TYPEARGS? ('?' | '[' ','* ']')*`
    pub fn parse_type(&mut self) -> Result<TypeExpr<'ast>, ParseError> {
        let start = self.peek();
        if start.kind != TokenKind::Identifier {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                start.span,
                format!("expected type, found {}", start.kind),
            ));
        }

        // global:: alias qualifier
        if start.lexeme == "global" {
            let next = self.peek_nth(1);
            if next.kind == TokenKind::Operator && next.lexeme == "::" {
                self.advance();
                self.advance();
            }
        }

        let mut path = bumpalo::collections::Vec::new_in(self.arena);
        path.push(self.expect_ident()?);
        while self.check(TokenKind::Dot) && self.peek_nth(1).kind == TokenKind::Identifier {
            self.advance();
            path.push(self.expect_ident()?);
        }

        let type_args = if self.check(TokenKind::Less) {
            self.parse_type_args()?
        } else {
            &[]
        };

        let suffixes = self.parse_type_suffixes();

        Ok(TypeExpr::new(
            path.into_bump_slice(),
            type_args,
            suffixes,
            self.span_from(start),
        ))
    }

    /// Parse a generic argument list.
    ///
    /// Grammar: `'<' TYPE (',' TYPE)* '>'`
    fn parse_type_args(&mut self) -> Result<&'ast [TypeExpr<'ast>], ParseError> {
        let open = self.expect(TokenKind::Less)?;
        let mut args = bumpalo::collections::Vec::new_in(self.arena);

        args.push(self.parse_type()?);
        while self.eat(TokenKind::Comma).is_some() {
            args.push(self.parse_type()?);
        }

        if self.eat(TokenKind::Greater).is_none() {
            let found = self.peek();
            return Err(ParseError::new(
                ParseErrorKind::ExpectedToken,
                found.span,
                format!(
                    "expected '>' to close type arguments opened at {}",
                    open.span
                ),
            ));
        }

        Ok(args.into_bump_slice())
    }

    /// Parse type suffixes. Multi-dimensional arrays are treated like
    /// single-dimensional ones.
    fn parse_type_suffixes(&mut self) -> &'ast [TypeSuffix] {
        let mut suffixes = bumpalo::collections::Vec::new_in(self.arena);

        loop {
            if self.check(TokenKind::Question) {
                self.advance();
                suffixes.push(TypeSuffix::Nullable);
            } else if self.check(TokenKind::LeftBracket) && self.is_rank_specifier() {
                while self.advance().kind != TokenKind::RightBracket {}
                suffixes.push(TypeSuffix::Array);
            } else {
                break;
            }
        }

        suffixes.into_bump_slice()
    }

    /// Whether the `[` at the current position opens `[]` or `[,,]`.
    fn is_rank_specifier(&self) -> bool {
        let mut n = 1;
        while self.peek_nth(n).kind == TokenKind::Comma {
            n += 1;
        }
        self.peek_nth(n).kind == TokenKind::RightBracket
    }

    /// Parse a declaration's type parameter list, if present.
    ///
    /// Grammar: `('<' ATTRS? ('in' | 'out')? IDENT (',' ...)* '>')?`
    pub(crate) fn parse_type_params(&mut self) -> Result<&'ast [Ident<'ast>], ParseError> {
        if self.eat(TokenKind::Less).is_none() {
            return Ok(&[]);
        }

        let mut params = bumpalo::collections::Vec::new_in(self.arena);
        loop {
            self.skip_attributes()?;
            // variance
            if self.eat(TokenKind::In).is_none() {
                self.eat(TokenKind::Out);
            }
            params.push(self.expect_ident()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::Greater)?;

        Ok(params.into_bump_slice())
    }
}
