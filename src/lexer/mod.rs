//! Lexical analysis for ES|QL.
//!
//! Raw scanning is done by a `logos` automaton; the [`Lexer`] wraps it to map
//! identifiers onto keywords, decode string escapes and turn unrecognised input
//! into diagnostics instead of aborting.

pub mod keywords;
pub mod token;

use crate::ast::Span;
use crate::diag::Diag;
use logos::Logos;
use smol_str::SmolStr;
use token::{Token, TokenKind};

pub(crate) const SYNTAX_ERROR_CODE: &str = "esql::syntax_error";

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, always terminated by an EOF token.
    pub tokens: Vec<Token>,
    /// Diagnostics encountered during lexing.
    pub diagnostics: Vec<Diag>,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
    #[regex(r"[A-Za-z_@][A-Za-z0-9_@]*(\.[A-Za-z_@][A-Za-z0-9_@]*)*")]
    Word,
    #[regex(r"`[^`]*`")]
    QuotedWord,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Decimal,
    #[regex(r"\?[A-Za-z0-9_]*")]
    Parameter,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("::")]
    DoubleColon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
}

/// An error-tolerant lexer over ES|QL query text.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenizes the source text, continuing past invalid input.
    pub fn tokenize(mut self) -> LexerResult {
        let mut raw = RawToken::lexer(self.source);
        while let Some(result) = raw.next() {
            let span = raw.span();
            match result {
                Ok(kind) => self.push_raw(kind, span),
                Err(()) => {
                    let text = &self.source[span.clone()];
                    self.error(span.clone(), format!("invalid character '{text}'"));
                }
            }
        }

        let eof = self.source.len();
        self.tokens.push(Token::new(TokenKind::Eof, eof..eof));

        LexerResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn push_raw(&mut self, raw: RawToken, span: Span) {
        let text = &self.source[span.clone()];
        let kind = match raw {
            RawToken::Word => keywords::lookup_keyword(text)
                .unwrap_or_else(|| TokenKind::Identifier(SmolStr::new(text))),
            RawToken::QuotedWord => {
                TokenKind::QuotedIdentifier(SmolStr::new(&text[1..text.len() - 1]))
            }
            RawToken::String => {
                let body = &text[1..text.len() - 1];
                TokenKind::StringLiteral(self.unescape(body, span.start + 1))
            }
            RawToken::UnterminatedString => {
                self.error(span.clone(), "unclosed string literal");
                TokenKind::StringLiteral(self.unescape(&text[1..], span.start + 1))
            }
            RawToken::Integer => TokenKind::IntegerLiteral(SmolStr::new(text)),
            RawToken::Decimal => TokenKind::DecimalLiteral(SmolStr::new(text)),
            RawToken::Parameter => TokenKind::Parameter(SmolStr::new(&text[1..])),
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Assign => TokenKind::Assign,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::DoubleColon => TokenKind::DoubleColon,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Pipe => TokenKind::Pipe,
        };
        self.tokens.push(Token::new(kind, span));
    }

    /// Decodes backslash escapes; `offset` is the byte position of `body` in the source.
    fn unescape(&mut self, body: &str, offset: usize) -> SmolStr {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.char_indices();
        while let Some((index, ch)) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((next_index, other)) => {
                    let start = offset + index;
                    let end = offset + next_index + other.len_utf8();
                    self.error(start..end, format!("invalid escape sequence '\\{other}'"));
                    out.push(other);
                }
                None => out.push('\\'),
            }
        }
        SmolStr::new(out)
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(
            Diag::error(format!("SyntaxError: {}", message.into()))
                .with_primary_label(span, "here")
                .with_code(SYNTAX_ERROR_CODE),
        );
    }
}

/// Convenience function to tokenize a source string.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
