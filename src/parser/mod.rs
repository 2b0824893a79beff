//! Parser for ES|QL pipelines.
//!
//! The parser consumes the lexer's tokens and builds a [`Query`], collecting
//! syntax diagnostics and recovering at `|` boundaries so later commands are
//! still available to the validator.

mod base;
mod command;
mod expression;

use crate::ast::Query;
use crate::diag::{Diag, DiagSeverity, SourceFile, convert_diagnostics_to_reports};
use crate::lexer::Lexer;
use crate::lexer::token::{Token, TokenKind};
use miette::Report;
use tracing::trace;

/// Result of parsing a query.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed query. Commands that failed to parse are omitted.
    pub query: Query,
    /// Lexer and parser diagnostics in source order.
    pub diagnostics: Vec<Diag>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == DiagSeverity::Error)
    }

    /// Renders the diagnostics as miette reports against `source`.
    pub fn reports(&self, source: &str) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, &SourceFile::new(source))
    }
}

/// ES|QL parser with error recovery.
pub struct Parser<'source> {
    tokens: Vec<Token>,
    diagnostics: Vec<Diag>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Creates a parser from a token stream, appending EOF when missing.
    pub fn new(mut tokens: Vec<Token>, source: &'source str) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let eof_pos = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, eof_pos..eof_pos));
        }

        Self {
            tokens,
            diagnostics: Vec::new(),
            source,
        }
    }

    /// Prepends lexer diagnostics so they are reported before parser ones.
    pub fn with_lexer_diagnostics(mut self, lex_diags: Vec<Diag>) -> Self {
        let mut all_diags = lex_diags;
        all_diags.append(&mut self.diagnostics);
        self.diagnostics = all_diags;
        self
    }

    pub fn parse(mut self) -> ParseResult {
        let (query, parser_diags) =
            command::QueryParser::new(&self.tokens, self.source).parse_query();
        self.diagnostics.extend(parser_diags);
        trace!(
            commands = query.commands.len(),
            diagnostics = self.diagnostics.len(),
            "parsed query"
        );

        ParseResult {
            query,
            diagnostics: self.diagnostics,
        }
    }
}

/// Tokenizes and parses `source`.
pub fn parse(source: &str) -> ParseResult {
    let lexed = Lexer::new(source).tokenize();
    Parser::new(lexed.tokens, source)
        .with_lexer_diagnostics(lexed.diagnostics)
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Command;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn parser_creation_normalizes_missing_eof() {
        let tokens = vec![Token::new(TokenKind::Row, 0..3)];
        let parser = Parser::new(tokens, "ROW");
        assert_eq!(parser.tokens.len(), 2);
        assert_eq!(parser.tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn lexer_diagnostics_come_first() {
        let result = parse("ROW a = 1 # | EVAL b = ");
        assert!(result.has_errors());
        assert_eq!(
            result.diagnostics[0].message,
            "SyntaxError: invalid character '#'"
        );
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(result.query.commands[0], Command::Row { .. }));
    }

    #[test]
    fn reports_render_messages() {
        let source = "FROM a | LIMIT x";
        let result = parse(source);
        let reports = result.reports(source);
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].to_string(),
            "SyntaxError: expected an integer after LIMIT, found identifier 'x'"
        );
    }

    #[test]
    fn parser_never_panics_on_random_inputs() {
        const FRAGMENTS: &[&str] = &[
            "FROM", "ROW", "EVAL", "STATS", "BY", "|", "(", ")", ",", "=", "*", "::", "1", "x",
            "\"s\"", "NOT", "IN", "IS", "NULL", "-", "SORT", "KEEP",
        ];

        let mut seed = 0xC0FFEE_u64;
        for _ in 0..5_000 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let count = (seed % 24) as usize;
            let mut source = String::new();
            for _ in 0..count {
                seed = seed
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                source.push_str(FRAGMENTS[(seed >> 33) as usize % FRAGMENTS.len()]);
                source.push(' ');
            }

            let result = catch_unwind(AssertUnwindSafe(|| parse(&source)));
            assert!(result.is_ok(), "parser panicked on {source:?}");
        }
    }
}
