//! Recursive descent parser state.
//!
//! The parser works on the non-trivia tokens of one text range. Grammar
//! rules live in [`super::grammar`] as further `impl Parser` blocks.

use text_size::{TextRange, TextSize};

use super::error::ParseError;
use super::lexer::{Lexer, Token, TokenKind};
use crate::base::{FileId, Identifier, Location};

pub(super) type PResult<T> = Result<T, ParseError>;

/// The parser state
pub(super) struct Parser<'t> {
    tokens: Vec<Token<'t>>,
    pos: usize,
    file: FileId,
    range: TextRange,
    /// Item errors abort the parse instead of being recovered from.
    pub(super) strict: bool,
    pub(super) errors: Vec<ParseError>,
}

impl<'t> Parser<'t> {
    /// `slice` is the text of `range` inside the file.
    pub(super) fn new(file: FileId, slice: &'t str, range: TextRange, strict: bool) -> Self {
        let tokens = Lexer::with_base(slice, range.start())
            .filter(|token| !token.kind.is_trivia())
            .collect();
        Self {
            tokens,
            pos: 0,
            file,
            range,
            strict,
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    pub(super) fn current(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    pub(super) fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|token| token.kind)
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    pub(super) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Text of the current token, empty at the end.
    pub(super) fn current_text(&self) -> &'t str {
        self.tokens.get(self.pos).map_or("", |token| token.text)
    }

    pub(super) fn at_contextual(&self, word: &str) -> bool {
        self.at(TokenKind::Ident) && self.current_text() == word
    }

    pub(super) fn previous(&self) -> Option<TokenKind> {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|token| token.kind)
    }

    /// Whether the cursor has moved past `mark`.
    pub(super) fn advanced_since(&self, mark: usize) -> bool {
        self.pos > mark
    }

    pub(super) fn mark(&self) -> usize {
        self.pos
    }

    pub(super) fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Start offset of the current token (range end when exhausted).
    pub(super) fn offset(&self) -> TextSize {
        self.tokens
            .get(self.pos)
            .map_or(self.range.end(), |token| token.offset)
    }

    /// End offset of the last consumed token.
    pub(super) fn prev_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(self.range.start(), |token| token.range().end())
    }

    pub(super) fn file(&self) -> FileId {
        self.file
    }

    pub(super) fn location_from(&self, start: TextSize) -> Location {
        let end = self.prev_end().max(start);
        Location::new(self.file, TextRange::new(start, end))
    }

    // =========================================================================
    // Consuming tokens
    // =========================================================================

    pub(super) fn bump(&mut self) -> Option<Token<'t>> {
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token<'t>> {
        if self.at(kind) {
            if let Some(token) = self.bump() {
                return Ok(token);
            }
        }
        Err(self.expected(what))
    }

    pub(super) fn expect_ident(&mut self, what: &str) -> PResult<(Identifier, Location)> {
        let token = self.expect(TokenKind::Ident, what)?;
        Ok((
            Identifier::new(token.text),
            Location::new(self.file, token.range()),
        ))
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(super) fn error(&self, message: impl Into<String>) -> ParseError {
        let location = match self.tokens.get(self.pos) {
            Some(token) => Location::new(self.file, token.range()),
            None => Location::new(self.file, TextRange::empty(self.range.end())),
        };
        if self.at_end() {
            ParseError::unbalanced(location, message)
        } else {
            ParseError::new(location, message)
        }
    }

    pub(super) fn expected(&self, what: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => self.error(format!("expected {what}, found {}", token.kind)),
            None => self.error(format!("expected {what}, found end of input")),
        }
    }

    /// Consume a delimited group starting at the current opener and return
    /// the range strictly between the delimiters.
    pub(super) fn skip_balanced(&mut self) -> PResult<TextRange> {
        let Some(open) = self.current() else {
            return Err(self.expected("an opening delimiter"));
        };
        let Some(close) = closer_of(open) else {
            return Err(self.expected("an opening delimiter"));
        };
        let open_token = self.bump().ok_or_else(|| self.expected("an opening delimiter"))?;
        let mut stack = vec![close];
        while let Some(token) = self.bump() {
            if let Some(closer) = closer_of(token.kind) {
                stack.push(closer);
            } else if is_closer(token.kind) {
                match stack.pop() {
                    Some(expected) if expected == token.kind => {
                        if stack.is_empty() {
                            return Ok(TextRange::new(open_token.range().end(), token.offset));
                        }
                    }
                    _ => {
                        return Err(ParseError::unbalanced(
                            Location::new(self.file, token.range()),
                            format!("unexpected {}", token.kind),
                        ));
                    }
                }
            }
        }
        Err(ParseError::unbalanced(
            Location::new(self.file, open_token.range()),
            format!("unclosed {}", open_token.kind),
        ))
    }

    /// Skip the broken item starting at the cursor: up to a `;` or a `}`
    /// outside of its delimiters, or the next item keyword.
    pub(super) fn recover(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            if closer_of(kind).is_some() {
                depth += 1;
            } else if is_closer(kind) {
                if depth == 0 {
                    if kind == TokenKind::RBrace {
                        break;
                    }
                } else {
                    depth -= 1;
                }
            } else if depth == 0 {
                if kind == TokenKind::Semicolon {
                    self.pos += 1;
                    break;
                }
                let after_visibility = self.previous().is_some_and(TokenKind::is_visibility);
                if kind.starts_item() && self.pos > start && !after_visibility {
                    break;
                }
            }
            self.pos += 1;
        }
        if self.pos == start && !self.at_end() && !self.at(TokenKind::RBrace) {
            self.pos += 1;
        }
    }
}

pub(super) fn closer_of(kind: TokenKind) -> Option<TokenKind> {
    match kind {
        TokenKind::LBrace => Some(TokenKind::RBrace),
        TokenKind::LParen => Some(TokenKind::RParen),
        TokenKind::LBracket => Some(TokenKind::RBracket),
        _ => None,
    }
}

pub(super) fn is_closer(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket
    )
}
