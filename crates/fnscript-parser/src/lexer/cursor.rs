/// A cursor over script text that tracks position.
///
/// Gives the lexer character access with peek/advance semantics and keeps
/// the byte offset, line and column of the next unread character.
pub struct Cursor<'src> {
    /// The full script text.
    source: &'src str,
    /// Remaining source text (slice starting at current position).
    rest: &'src str,
    /// Byte offset of the next unread character.
    offset: u32,
    /// Current line number (1-indexed).
    line: u32,
    /// Current column number (1-indexed, counted in bytes).
    column: u32,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the source.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Byte offset of the next unread character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Current line number (1-indexed).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column number (1-indexed, counted in bytes).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Whether every character has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Peek at the current character without consuming it.
    ///
    /// ASCII is read straight from the byte; anything else decodes a char.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        match *self.rest.as_bytes().first()? {
            b if b.is_ascii() => Some(b as char),
            _ => self.rest.chars().next(),
        }
    }

    /// Peek at the nth character ahead (0 = current).
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Check if the current character satisfies a predicate.
    ///
    /// False at end of input.
    #[inline]
    pub fn check(&self, f: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(f)
    }

    /// Check if the upcoming text starts with `s`.
    #[inline]
    pub fn check_str(&self, s: &str) -> bool {
        self.rest.starts_with(s)
    }

    /// Consume the current character.
    ///
    /// Returns the consumed character, or `None` at end of input. A newline
    /// moves to column 1 of the next line; any other character moves the
    /// column by its UTF-8 length.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.rest.chars().next()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len as u32;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += len as u32;
        }
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while the predicate matches.
    ///
    /// Returns the consumed slice, which may be empty.
    pub fn eat_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.offset as usize;
        while self.check(&f) {
            self.advance();
        }
        &self.source[start..self.offset as usize]
    }

    /// Slice of source from a starting offset to the current position.
    ///
    /// `start` must be an offset previously returned by [`Cursor::offset`].
    #[inline]
    pub fn slice_from(&self, start: u32) -> &'src str {
        &self.source[start as usize..self.offset as usize]
    }
}

/// Check if a character can start an identifier.
///
/// Script identifiers may use any Unicode letter.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
#[inline]
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 3));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn cursor_eat_while_returns_slice() {
        let mut cursor = Cursor::new("Payload123 rest");
        assert_eq!(cursor.eat_while(is_ident_continue), "Payload123");
        assert!(cursor.eat(' '));
        assert_eq!(cursor.slice_from(11), "");
        assert_eq!(cursor.peek_nth(1), Some('e'));
    }

    #[test]
    fn check_sees_current_character_only() {
        let cursor = Cursor::new("x1");
        assert!(cursor.check(is_ident_start));
        assert!(!cursor.check(char::is_numeric));
        assert!(!Cursor::new("").check(|_| true));
    }

    #[test]
    fn peek_decodes_non_ascii() {
        assert_eq!(Cursor::new("λx").peek(), Some('λ'));
        assert_eq!(Cursor::new("x").peek(), Some('x'));
        assert_eq!(Cursor::new("").peek(), None);
    }

    #[test]
    fn multibyte_characters_advance_by_byte_length() {
        let mut cursor = Cursor::new("é!");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.offset(), 2);
        assert_eq!(cursor.peek(), Some('!'));
    }
}
