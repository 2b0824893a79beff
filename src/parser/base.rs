//! Token stream navigation and error construction shared by the parser modules.

use crate::ast::Span;
use crate::diag::Diag;
use crate::lexer::SYNTAX_ERROR_CODE;
use crate::lexer::token::{Token, TokenKind};

/// Error type for parsing operations.
pub type ParseError = Box<Diag>;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Builds a syntax error diagnostic labelled at `span`.
pub fn syntax_error(span: Span, message: impl Into<String>) -> ParseError {
    Box::new(
        Diag::error(format!("SyntaxError: {}", message.into()))
            .with_primary_label(span, "here")
            .with_code(SYNTAX_ERROR_CODE),
    )
}

/// Token stream navigator.
///
/// The token slice always ends with an EOF token; navigation never moves past it.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, end..end),
        }
    }

    /// Returns the current token, or EOF past the end.
    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the token after the current one.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    /// Advances to the next token. Does nothing at EOF.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Consumes the current token if it matches the given kind.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token kind and returns its span.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_here(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    /// Consumes an identifier whose text equals `word` case-insensitively.
    ///
    /// Used for contextual words such as `ASC` or `NULLS` that are not reserved.
    pub fn consume_word(&mut self, word: &str) -> Option<Span> {
        match &self.current().kind {
            TokenKind::Identifier(name) if name.eq_ignore_ascii_case(word) => {
                let span = self.current().span.clone();
                self.advance();
                Some(span)
            }
            _ => None,
        }
    }

    /// Creates a syntax error at the current token.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        syntax_error(self.current().span.clone(), message)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Sets the position in the token stream (used for backtracking).
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len().saturating_sub(1));
    }

    /// Returns the span of the previously consumed token.
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.clone()
        } else {
            self.current().span.clone()
        }
    }

    /// Skips to the next `|` or EOF without consuming it.
    pub fn synchronize_at_pipe(&mut self) {
        while !self.is_eof() && !self.check(&TokenKind::Pipe) {
            self.advance();
        }
    }
}
