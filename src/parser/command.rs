//! Pipeline command parsing with recovery at `|` boundaries.

use crate::ast::{
    Command, Field, NullsOrder, Query, SortItem, SortOrder, Span, Spanned, merge_spans,
};
use crate::diag::Diag;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::base::{ParseResult, TokenStream, syntax_error};
use crate::parser::expression::ExpressionParser;
use smol_str::SmolStr;

/// Parser for a whole query.
pub struct QueryParser<'a> {
    stream: TokenStream<'a>,
    source: &'a str,
    diagnostics: Vec<Diag>,
}

impl<'a> QueryParser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Parses every command, returning the query and the syntax diagnostics.
    ///
    /// A command that fails to parse is dropped and parsing resumes after the
    /// next `|`.
    pub fn parse_query(mut self) -> (Query, Vec<Diag>) {
        let mut commands = Vec::new();

        if !self.stream.is_eof() {
            loop {
                let is_first = commands.is_empty();
                match self.parse_command(is_first) {
                    Ok(command) => {
                        commands.push(command);
                        if !self.stream.check(&TokenKind::Pipe) && !self.stream.is_eof() {
                            let found = self.stream.current().kind.clone();
                            self.report(self.stream.error_here(format!(
                                "expected '|' or end of input, found {found}"
                            )));
                            self.stream.synchronize_at_pipe();
                        }
                    }
                    Err(error) => {
                        self.report(error);
                        self.stream.synchronize_at_pipe();
                    }
                }

                if !self.stream.consume(&TokenKind::Pipe) {
                    break;
                }
            }
        }

        let query = Query {
            commands,
            span: 0..self.source.len(),
        };
        (query, self.diagnostics)
    }

    fn report(&mut self, error: Box<Diag>) {
        self.diagnostics.push(*error);
    }

    fn expression(&mut self) -> ExpressionParser<'_, 'a> {
        ExpressionParser::new(&mut self.stream)
    }

    fn parse_command(&mut self, is_first: bool) -> ParseResult<Command> {
        let keyword = self.stream.current().clone();
        let is_source = matches!(keyword.kind, TokenKind::From | TokenKind::Row);

        if !keyword.kind.is_command() {
            return Err(self
                .stream
                .error_here(format!("expected a command, found {}", keyword.kind)));
        }
        if is_first && !is_source {
            self.report(syntax_error(
                keyword.span.clone(),
                format!("{} cannot start a query, expected FROM or ROW", keyword.kind),
            ));
        } else if !is_first && is_source {
            self.report(syntax_error(
                keyword.span.clone(),
                format!("{} can only be used as the first command", keyword.kind),
            ));
        }
        self.stream.advance();

        let start = keyword.span;
        let command = match keyword.kind {
            TokenKind::From => {
                let sources = self.parse_name_list("an index pattern", true)?;
                Command::From {
                    sources,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Row => {
                let fields = self.parse_fields()?;
                Command::Row {
                    fields,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Eval => {
                let fields = self.parse_fields()?;
                Command::Eval {
                    fields,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Where => {
                let condition = self.expression().parse_expression()?;
                Command::Where {
                    condition,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Stats => self.parse_stats(start)?,
            TokenKind::Sort => {
                let mut items = vec![self.parse_sort_item()?];
                while self.stream.consume(&TokenKind::Comma) {
                    items.push(self.parse_sort_item()?);
                }
                Command::Sort {
                    items,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Limit => {
                let count = self.parse_limit_count()?;
                Command::Limit {
                    count,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Keep => {
                let columns = self.parse_name_list("a column name", false)?;
                Command::Keep {
                    columns,
                    span: self.span_from(&start),
                }
            }
            TokenKind::Drop => {
                let columns = self.parse_name_list("a column name", false)?;
                Command::Drop {
                    columns,
                    span: self.span_from(&start),
                }
            }
            other => {
                return Err(syntax_error(start, format!("expected a command, found {other}")));
            }
        };
        Ok(command)
    }

    fn span_from(&self, start: &Span) -> Span {
        merge_spans(start, &self.stream.previous_span())
    }

    fn parse_stats(&mut self, start: Span) -> ParseResult<Command> {
        let at_clause_end = |stream: &TokenStream<'_>| {
            stream.check(&TokenKind::By) || stream.check(&TokenKind::Pipe) || stream.is_eof()
        };

        let aggregates = if at_clause_end(&self.stream) {
            Vec::new()
        } else {
            self.parse_fields()?
        };
        let by = if self.stream.consume(&TokenKind::By) {
            self.parse_fields()?
        } else {
            Vec::new()
        };

        Ok(Command::Stats {
            aggregates,
            by,
            span: self.span_from(&start),
        })
    }

    fn parse_fields(&mut self) -> ParseResult<Vec<Field>> {
        let mut fields = vec![self.parse_field()?];
        while self.stream.consume(&TokenKind::Comma) {
            fields.push(self.parse_field()?);
        }
        Ok(fields)
    }

    /// Parses `[name =] expression`.
    fn parse_field(&mut self) -> ParseResult<Field> {
        let current = self.stream.current().clone();
        let assigns = self
            .stream
            .peek()
            .is_some_and(|next| next.kind == TokenKind::Assign);

        let target = match (&current.kind, assigns) {
            (TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name), true) => {
                self.stream.advance();
                self.stream.advance();
                Some(Spanned::new(name.clone(), current.span.clone()))
            }
            _ => None,
        };

        let expression = self.expression().parse_expression()?;
        let span = match &target {
            Some(target) => merge_spans(&target.span, expression.span()),
            None => expression.span().clone(),
        };
        Ok(Field {
            target,
            expression,
            span,
        })
    }

    fn parse_sort_item(&mut self) -> ParseResult<SortItem> {
        let expression = self.expression().parse_expression()?;

        let order = if self.stream.consume_word("asc").is_some() {
            Some(SortOrder::Asc)
        } else if self.stream.consume_word("desc").is_some() {
            Some(SortOrder::Desc)
        } else {
            None
        };

        let nulls = if self.stream.consume_word("nulls").is_some() {
            if self.stream.consume_word("first").is_some() {
                Some(NullsOrder::First)
            } else if self.stream.consume_word("last").is_some() {
                Some(NullsOrder::Last)
            } else {
                let found = self.stream.current().kind.clone();
                return Err(self
                    .stream
                    .error_here(format!("expected FIRST or LAST after NULLS, found {found}")));
            }
        } else {
            None
        };

        let span = merge_spans(expression.span(), &self.stream.previous_span());
        Ok(SortItem {
            expression,
            order,
            nulls,
            span,
        })
    }

    fn parse_limit_count(&mut self) -> ParseResult<u64> {
        let token = self.stream.current().clone();
        match &token.kind {
            TokenKind::IntegerLiteral(text) => {
                self.stream.advance();
                text.parse::<u64>()
                    .map_err(|_| syntax_error(token.span, format!("invalid LIMIT value '{text}'")))
            }
            other => Err(self
                .stream
                .error_here(format!("expected an integer after LIMIT, found {other}"))),
        }
    }

    fn parse_name_list(
        &mut self,
        what: &str,
        allow_dashes: bool,
    ) -> ParseResult<Vec<Spanned<SmolStr>>> {
        let mut names = vec![self.parse_name_pattern(what, allow_dashes)?];
        while self.stream.consume(&TokenKind::Comma) {
            names.push(self.parse_name_pattern(what, allow_dashes)?);
        }
        Ok(names)
    }

    /// Parses a name that may contain `*` wildcards (and `-` for index
    /// patterns), written without whitespace: `logs-*`, `*Field`, `` `a b` ``.
    fn parse_name_pattern(
        &mut self,
        what: &str,
        allow_dashes: bool,
    ) -> ParseResult<Spanned<SmolStr>> {
        let first = self.stream.current().clone();
        if let TokenKind::QuotedIdentifier(name) = &first.kind {
            self.stream.advance();
            return Ok(Spanned::new(name.clone(), first.span));
        }

        let is_part = |kind: &TokenKind| match kind {
            TokenKind::Identifier(_) | TokenKind::Star | TokenKind::IntegerLiteral(_) => true,
            TokenKind::Minus => allow_dashes,
            _ => false,
        };
        if !is_part(&first.kind) || matches!(first.kind, TokenKind::IntegerLiteral(_)) {
            return Err(self
                .stream
                .error_here(format!("expected {what}, found {}", first.kind)));
        }

        let mut span = first.span.clone();
        self.stream.advance();
        loop {
            let next = self.stream.current();
            if next.span.start != span.end || !is_part(&next.kind) {
                break;
            }
            span = merge_spans(&span, &next.span);
            self.stream.advance();
        }

        let text = self.source.get(span.clone()).unwrap_or_default();
        Ok(Spanned::new(SmolStr::new(text), span))
    }
}
