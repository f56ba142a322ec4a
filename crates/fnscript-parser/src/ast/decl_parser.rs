//! Declaration parsing.
//!
//! A script is a sequence of directives, `using`s, type declarations and
//! members of the implicit script class, interleaved with top-level
//! statements. Whether an item is a member or a statement is decided by
//! lookahead: a member is a type followed by a name followed by something
//! only a declaration can have. Anything else is kept as an opaque statement.

use fnscript_core::{Modifiers, ParseError, ParseErrorKind, RefKind};

use super::parser::Parser;
use crate::ast::decl::*;
use crate::ast::types::TypeExpr;
use crate::ast::Script;
use crate::lexer::{Token, TokenKind};

/// Contextual keywords that can only start a statement.
const STATEMENT_KEYWORDS: &[&str] = &[
    "await", "break", "checked", "continue", "do", "else", "fixed", "for", "foreach", "goto", "if",
    "lock", "return", "switch", "throw", "try", "unchecked", "while", "yield",
];

/// Directives accepted and ignored.
const IGNORED_DIRECTIVES: &[&str] = &[
    "pragma", "nullable", "region", "endregion", "define", "undef", "line",
];

impl<'ast> Parser<'ast> {
    /// Parse every item up to end of file, recovering from errors.
    pub(crate) fn parse_script(&mut self) -> Script<'ast> {
        let start = self.peek();
        let mut items = bumpalo::collections::Vec::new_in(self.arena);

        while !self.is_eof() {
            let before = self.position;
            match self.parse_item() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(error) => {
                    self.error(error);
                    if self.position == before {
                        self.advance();
                    }
                    self.synchronize();
                }
            }
        }

        Script::new(items.into_bump_slice(), self.span_from(start))
    }

    fn parse_item(&mut self) -> Result<Option<Item<'ast>>, ParseError> {
        let start_position = self.position;
        let start = self.peek();
        match start.kind {
            TokenKind::Semicolon => {
                self.advance();
                return Ok(None);
            }
            TokenKind::Hash => return self.parse_directive(),
            _ => {}
        }
        self.seen_declaration = true;

        if start.kind == TokenKind::Using {
            if self.is_using_directive() {
                return self.parse_using().map(|using| Some(Item::Using(using)));
            }
            return Ok(Some(self.parse_statement()));
        }

        let may_declare = start.kind == TokenKind::LeftBracket
            || start.kind.is_modifier()
            || start.kind.is_type_keyword()
            || (start.kind == TokenKind::Identifier
                && !STATEMENT_KEYWORDS.contains(&start.lexeme));
        if !may_declare {
            return Ok(Some(self.parse_statement()));
        }

        self.skip_attributes()?;
        let decl_start = self.peek();
        let modifiers = self.parse_modifiers();

        if self.peek().kind.is_type_keyword() {
            return self
                .parse_type_decl(decl_start, modifiers)
                .map(|decl| Some(Item::Type(decl)));
        }

        if let Some(item) = self.try_parse_member(decl_start, modifiers)? {
            return Ok(Some(item));
        }

        // `new Foo().Run();` starts with a modifier keyword but is a statement.
        let only_statement = decl_start.offset == start.offset
            && (self.peek().offset == start.offset || start.lexeme == "new");
        if only_statement {
            self.position = start_position;
            return Ok(Some(self.parse_statement()));
        }

        let found = self.peek();
        Err(ParseError::new(
            ParseErrorKind::ExpectedDeclaration,
            found.span,
            format!("expected member declaration, found {}", found.kind),
        ))
    }

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            let flag = match self.peek().kind {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Protected => Modifiers::PROTECTED,
                TokenKind::Internal => Modifiers::INTERNAL,
                TokenKind::Static => Modifiers::STATIC,
                TokenKind::Async => Modifiers::ASYNC,
                TokenKind::OtherModifier => Modifiers::empty(),
                _ => return modifiers,
            };
            self.advance();
            modifiers |= flag;
        }
    }

    // =========================================
    // Directives
    // =========================================

    /// Parse `#r "reference"` and skip other directives to end of line.
    fn parse_directive(&mut self) -> Result<Option<Item<'ast>>, ParseError> {
        let hash = self.advance();
        let name = self.peek();

        let result = if name.kind != TokenKind::Identifier || name.span.line != hash.span.line {
            Err(ParseError::new(
                ParseErrorKind::InvalidDirective,
                hash.span,
                "expected directive name after '#'",
            ))
        } else if name.lexeme == "r" {
            self.advance();
            self.parse_reference(hash)
        } else if IGNORED_DIRECTIVES.contains(&name.lexeme) {
            Ok(None)
        } else {
            Err(ParseError::new(
                ParseErrorKind::InvalidDirective,
                name.span,
                format!("'#{}' is not a supported directive", name.lexeme),
            ))
        };

        while !self.is_eof() && self.peek().span.line == hash.span.line {
            self.advance();
        }

        // The rest of the line is consumed, so parsing resumes at the next one.
        result.or_else(|error| {
            self.error(error);
            Ok(None)
        })
    }

    fn parse_reference(&mut self, hash: Token<'ast>) -> Result<Option<Item<'ast>>, ParseError> {
        let literal = self.expect(TokenKind::StringLiteral)?;
        let span = self.span_from(hash);

        if self.seen_declaration {
            return Err(ParseError::new(
                ParseErrorKind::MisplacedDirective,
                span,
                "#r is only allowed before the first declaration or statement",
            ));
        }

        Ok(Some(Item::Reference(ReferenceDirective {
            reference: unquote(literal.lexeme),
            span,
        })))
    }

    // =========================================
    // Using
    // =========================================

    /// `using X;` is a directive; `using (..)` and `using var ..` are statements.
    fn is_using_directive(&self) -> bool {
        let next = self.peek_nth(1);
        match next.kind {
            TokenKind::Static => true,
            TokenKind::Identifier => {
                next.lexeme != "var" && self.peek_nth(2).kind != TokenKind::Identifier
            }
            _ => false,
        }
    }

    fn parse_using(&mut self) -> Result<UsingDecl<'ast>, ParseError> {
        let start = self.expect(TokenKind::Using)?;
        let is_static = self.eat(TokenKind::Static).is_some();

        let alias = if self.check(TokenKind::Identifier) && self.peek_nth(1).kind == TokenKind::Equal
        {
            let alias = self.expect_ident()?;
            self.advance();
            Some(alias)
        } else {
            None
        };

        let target = self.parse_type()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(UsingDecl {
            path: target.path,
            is_static,
            alias,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Type declarations
    // =========================================

    fn parse_type_decl(
        &mut self,
        start: Token<'ast>,
        modifiers: Modifiers,
    ) -> Result<TypeDecl<'ast>, ParseError> {
        let keyword = self.advance();
        let kind = match keyword.kind {
            TokenKind::Class => TypeDeclKind::Class,
            TokenKind::Struct => TypeDeclKind::Struct,
            TokenKind::Interface => TypeDeclKind::Interface,
            TokenKind::Enum => TypeDeclKind::Enum,
            _ => {
                // record class / record struct
                if self.eat(TokenKind::Struct).is_none() {
                    self.eat(TokenKind::Class);
                }
                TypeDeclKind::Record
            }
        };

        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        // positional record parameters
        if self.check(TokenKind::LeftParen) {
            self.skip_group()?;
        }

        let mut bases = bumpalo::collections::Vec::new_in(self.arena);
        if self.eat(TokenKind::Colon).is_some() {
            loop {
                bases.push(self.parse_type()?);
                // record base constructor arguments
                if self.check(TokenKind::LeftParen) {
                    self.skip_group()?;
                }
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        if self.check_contextual("where") {
            self.skip_until(&[TokenKind::LeftBrace, TokenKind::Semicolon])?;
        }

        if self.check(TokenKind::LeftBrace) {
            self.skip_group()?;
            self.eat(TokenKind::Semicolon);
        } else {
            self.expect(TokenKind::Semicolon)?;
        }

        Ok(TypeDecl {
            modifiers,
            kind,
            name,
            type_params,
            bases: bases.into_bump_slice(),
            span: self.span_from(start),
        })
    }

    // =========================================
    // Members
    // =========================================

    /// Try to parse a method, field or property. Rewinds and returns `None`
    /// when the tokens do not form a member declaration.
    fn try_parse_member(
        &mut self,
        start: Token<'ast>,
        modifiers: Modifiers,
    ) -> Result<Option<Item<'ast>>, ParseError> {
        let checkpoint = self.position;
        if !self.check(TokenKind::Identifier) {
            return Ok(None);
        }

        let Ok(ty) = self.parse_type() else {
            self.position = checkpoint;
            return Ok(None);
        };

        if !self.check(TokenKind::Identifier) {
            self.position = checkpoint;
            return Ok(None);
        }

        let item = match self.peek_nth(1).kind {
            TokenKind::LeftParen | TokenKind::Less if self.looks_like_method() => {
                Item::Method(self.parse_method(start, modifiers, ty)?)
            }
            TokenKind::LeftBrace | TokenKind::Arrow => {
                Item::Property(self.parse_property(start, modifiers, ty)?)
            }
            TokenKind::Semicolon | TokenKind::Equal | TokenKind::Comma => {
                Item::Field(self.parse_field(start, modifiers, ty)?)
            }
            _ => {
                self.position = checkpoint;
                return Ok(None);
            }
        };
        Ok(Some(item))
    }

    /// Whether the name at the current position is followed by a parameter
    /// list and a method body.
    fn looks_like_method(&mut self) -> bool {
        let checkpoint = self.position;

        self.advance();
        let shaped = self.parse_type_params().is_ok()
            && self.check(TokenKind::LeftParen)
            && self.skip_group().is_ok()
            && (!self.check_contextual("where")
                || self
                    .skip_until(&[TokenKind::LeftBrace, TokenKind::Arrow, TokenKind::Semicolon])
                    .is_ok())
            && (self.check(TokenKind::LeftBrace) || self.check(TokenKind::Arrow));

        self.position = checkpoint;
        shaped
    }

    fn parse_method(
        &mut self,
        start: Token<'ast>,
        modifiers: Modifiers,
        return_type: TypeExpr<'ast>,
    ) -> Result<MethodDecl<'ast>, ParseError> {
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;

        if self.check_contextual("where") {
            self.skip_until(&[TokenKind::LeftBrace, TokenKind::Arrow])?;
        }

        let body = self.parse_body()?;

        Ok(MethodDecl {
            modifiers,
            return_type,
            name,
            type_params,
            params,
            body,
            span: self.span_from(start),
        })
    }

    /// Parse a parameter list.
    ///
    /// Grammar: `'(' (ATTRS? ('ref'|'out'|'in'|'params'|'this')* TYPE IDENT ('=' ...)?),* ')'`
    fn parse_params(&mut self) -> Result<&'ast [Param<'ast>], ParseError> {
        let open = self.peek();
        if self.eat(TokenKind::LeftParen).is_none() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedParameters,
                open.span,
                format!("expected parameter list, found {}", open.kind),
            ));
        }

        let mut params = bumpalo::collections::Vec::new_in(self.arena);
        if self.eat(TokenKind::RightParen).is_some() {
            return Ok(params.into_bump_slice());
        }

        loop {
            params.push(self.parse_param()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        Ok(params.into_bump_slice())
    }

    fn parse_param(&mut self) -> Result<Param<'ast>, ParseError> {
        self.skip_attributes()?;
        let start = self.peek();

        let mut ref_kind = RefKind::None;
        let mut is_this = false;
        loop {
            match self.peek().kind {
                TokenKind::Ref => ref_kind = RefKind::Ref,
                TokenKind::Out => ref_kind = RefKind::Out,
                TokenKind::In => ref_kind = RefKind::In,
                TokenKind::Params => ref_kind = RefKind::Params,
                TokenKind::This => is_this = true,
                // ref readonly
                TokenKind::OtherModifier => {}
                _ => break,
            }
            self.advance();
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;

        let has_default = self.eat(TokenKind::Equal).is_some();
        if has_default {
            self.skip_until(&[TokenKind::Comma, TokenKind::RightParen])?;
        }

        Ok(Param {
            ref_kind,
            is_this,
            ty,
            name,
            has_default,
            span: self.span_from(start),
        })
    }

    /// Parse a `{ ... }` or `=> ...;` body.
    fn parse_body(&mut self) -> Result<Body, ParseError> {
        let open = self.peek();
        match open.kind {
            TokenKind::LeftBrace => {
                let close = self.skip_group()?;
                Ok(Body {
                    kind: BodyKind::Block,
                    start: open.offset,
                    end: close.end_offset(),
                    span: self.span_from(open),
                })
            }
            TokenKind::Arrow => {
                self.advance();
                self.skip_until(&[TokenKind::Semicolon])?;
                let semi = self.advance();
                Ok(Body {
                    kind: BodyKind::Expression,
                    start: open.offset,
                    end: semi.end_offset(),
                    span: self.span_from(open),
                })
            }
            _ => Err(ParseError::expected_token(
                open.span,
                "method body",
                open.kind.as_str(),
            )),
        }
    }

    fn parse_property(
        &mut self,
        start: Token<'ast>,
        modifiers: Modifiers,
        ty: TypeExpr<'ast>,
    ) -> Result<PropertyDecl<'ast>, ParseError> {
        let name = self.expect_ident()?;

        if self.check(TokenKind::LeftBrace) {
            self.skip_group()?;
            // auto-property initializer
            if self.eat(TokenKind::Equal).is_some() {
                self.skip_until(&[TokenKind::Semicolon])?;
                self.advance();
            }
        } else {
            self.parse_body()?;
        }

        Ok(PropertyDecl {
            modifiers,
            ty,
            name,
            span: self.span_from(start),
        })
    }

    fn parse_field(
        &mut self,
        start: Token<'ast>,
        modifiers: Modifiers,
        ty: TypeExpr<'ast>,
    ) -> Result<FieldDecl<'ast>, ParseError> {
        let mut names = bumpalo::collections::Vec::new_in(self.arena);
        loop {
            names.push(self.expect_ident()?);
            if self.eat(TokenKind::Equal).is_some() {
                self.skip_until(&[TokenKind::Comma, TokenKind::Semicolon])?;
            }
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::Semicolon)?;

        Ok(FieldDecl {
            modifiers,
            ty,
            names: names.into_bump_slice(),
            span: self.span_from(start),
        })
    }

    // =========================================
    // Statements
    // =========================================

    /// Skip one top-level statement, keeping its source range.
    ///
    /// A statement ends after a `;` or after a block that is not followed by
    /// a continuation keyword (`else`, `catch`, `finally`, `while`).
    fn parse_statement(&mut self) -> Item<'ast> {
        let start = self.peek();

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    if let Err(error) = self.skip_group() {
                        self.error(error);
                        break;
                    }
                    let continues = ["else", "catch", "finally", "while"]
                        .iter()
                        .any(|kw| self.check_contextual(kw));
                    if token.kind == TokenKind::LeftBrace && !continues {
                        break;
                    }
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    self.error(ParseError::new(
                        ParseErrorKind::MismatchedDelimiter,
                        token.span,
                        format!("unexpected {}", token.kind),
                    ));
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }

        Item::Statement(Body {
            kind: BodyKind::Statement,
            start: start.offset,
            end: self.previous_end().max(start.offset),
            span: self.span_from(start),
        })
    }
}

/// Strip the quotes (and any `@`/`$` prefix) from a string literal.
fn unquote(literal: &str) -> &str {
    let body = literal.trim_start_matches(['@', '$']);
    body.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(body)
}
