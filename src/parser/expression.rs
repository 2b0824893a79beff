//! Expression parsing with precedence climbing.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, predicates (comparison,
//! `IN`, `LIKE`, `RLIKE`, `IS NULL`), additive, multiplicative, unary minus,
//! `::` casts, primaries. Every operator is lowered to a [`FunctionCall`] with
//! [`CallSyntax::Operator`] and the operator's catalog name.

use crate::ast::{
    CallSyntax, Expression, FunctionCall, InlineCast, Literal, Span, TimeUnit, merge_spans,
};
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseResult, TokenStream, syntax_error};
use smol_str::SmolStr;

/// Parser for expressions over a borrowed token stream.
pub struct ExpressionParser<'s, 'a> {
    stream: &'s mut TokenStream<'a>,
}

fn operator_call(name: &str, args: Vec<Expression>, span: Span) -> Expression {
    Expression::Call(FunctionCall {
        name: SmolStr::new(name),
        syntax: CallSyntax::Operator,
        args,
        span,
    })
}

fn binary(name: &str, left: Expression, right: Expression) -> Expression {
    let span = merge_spans(left.span(), right.span());
    operator_call(name, vec![left, right], span)
}

impl<'s, 'a> ExpressionParser<'s, 'a> {
    pub fn new(stream: &'s mut TokenStream<'a>) -> Self {
        Self { stream }
    }

    /// Parses a full boolean or value expression.
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;
        while self.stream.consume(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary("or", left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not()?;
        while self.stream.consume(&TokenKind::And) {
            let right = self.parse_not()?;
            left = binary("and", left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expression> {
        if self.stream.check(&TokenKind::Not) {
            let start = self.stream.current().span.clone();
            self.stream.advance();
            let operand = self.parse_not()?;
            let span = merge_spans(&start, operand.span());
            return Ok(operator_call("not", vec![operand], span));
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> ParseResult<Expression> {
        let left = self.parse_additive()?;

        let comparison = match self.stream.current().kind {
            TokenKind::EqEq => Some("=="),
            TokenKind::NotEq => Some("!="),
            TokenKind::Lt => Some("<"),
            TokenKind::LtEq => Some("<="),
            TokenKind::Gt => Some(">"),
            TokenKind::GtEq => Some(">="),
            _ => None,
        };
        if let Some(name) = comparison {
            self.stream.advance();
            let right = self.parse_additive()?;
            return Ok(binary(name, left, right));
        }

        if self.stream.check(&TokenKind::Is) {
            self.stream.advance();
            let negated = self.stream.consume(&TokenKind::Not);
            let end = self.stream.expect(TokenKind::Null)?;
            let span = merge_spans(left.span(), &end);
            let name = if negated { "is not null" } else { "is null" };
            return Ok(operator_call(name, vec![left], span));
        }

        // `NOT` directly after the left operand negates IN, LIKE and RLIKE.
        let position = self.stream.position();
        let negated = self.stream.consume(&TokenKind::Not);
        let name = match (&self.stream.current().kind, negated) {
            (TokenKind::In, false) => Some("in"),
            (TokenKind::In, true) => Some("not_in"),
            (TokenKind::Like, false) => Some("like"),
            (TokenKind::Like, true) => Some("not_like"),
            (TokenKind::Rlike, false) => Some("rlike"),
            (TokenKind::Rlike, true) => Some("not_rlike"),
            _ => None,
        };
        let Some(name) = name else {
            self.stream.set_position(position);
            return Ok(left);
        };
        let is_in = self.stream.check(&TokenKind::In);
        self.stream.advance();

        let right = if is_in {
            self.parse_value_list()?
        } else {
            self.parse_additive()?
        };
        Ok(binary(name, left, right))
    }

    /// Parses the parenthesised right-hand side of `IN`.
    fn parse_value_list(&mut self) -> ParseResult<Expression> {
        let start = self.stream.expect(TokenKind::LParen)?;
        let mut items = vec![self.parse_expression()?];
        while self.stream.consume(&TokenKind::Comma) {
            items.push(self.parse_expression()?);
        }
        let end = self.stream.expect(TokenKind::RParen)?;
        Ok(Expression::List(items, merge_spans(&start, &end)))
    }

    /// Parses a multi-value literal such as `[1, 2, 3]`.
    fn parse_bracket_list(&mut self) -> ParseResult<Expression> {
        let start = self.stream.expect(TokenKind::LBracket)?;
        if self.stream.check(&TokenKind::RBracket) {
            return Err(self.stream.error_here("empty list literal"));
        }
        let mut items = vec![self.parse_expression()?];
        while self.stream.consume(&TokenKind::Comma) {
            items.push(self.parse_expression()?);
        }
        let end = self.stream.expect(TokenKind::RBracket)?;
        Ok(Expression::List(items, merge_spans(&start, &end)))
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let name = match self.stream.current().kind {
                TokenKind::Plus => "+",
                TokenKind::Minus => "-",
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_multiplicative()?;
            left = binary(name, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let name = match self.stream.current().kind {
                TokenKind::Star => "*",
                TokenKind::Slash => "/",
                TokenKind::Percent => "%",
                _ => break,
            };
            self.stream.advance();
            let right = self.parse_unary()?;
            left = binary(name, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.stream.check(&TokenKind::Plus) {
            self.stream.advance();
            return self.parse_unary();
        }
        if !self.stream.check(&TokenKind::Minus) {
            return self.parse_cast();
        }

        let minus = self.stream.current().span.clone();
        self.stream.advance();
        let operand = self.parse_unary()?;
        let span = merge_spans(&minus, operand.span());

        // Fold `-<number>` into a negative literal.
        Ok(match operand {
            Expression::Literal(Literal::Integer(value), _) => {
                Expression::Literal(Literal::Integer(-value), span)
            }
            Expression::Literal(Literal::Double(value), _) => {
                Expression::Literal(Literal::Double(-value), span)
            }
            Expression::Literal(Literal::TimeSpan { quantity, unit }, _) => Expression::Literal(
                Literal::TimeSpan {
                    quantity: -quantity,
                    unit,
                },
                span,
            ),
            other => operator_call("neg", vec![other], span),
        })
    }

    fn parse_cast(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        while self.stream.consume(&TokenKind::DoubleColon) {
            let token = self.stream.current().clone();
            let target = match &token.kind {
                TokenKind::Identifier(target) => target.clone(),
                other => {
                    return Err(self
                        .stream
                        .error_here(format!("expected a type name after '::', found {other}")));
                }
            };
            self.stream.advance();
            let span = merge_spans(expr.span(), &token.span);
            expr = Expression::InlineCast(InlineCast {
                expression: Box::new(expr),
                target,
                target_span: token.span,
                span,
            });
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.stream.current().clone();
        match token.kind {
            TokenKind::IntegerLiteral(text) => {
                self.stream.advance();
                self.parse_integer(&text, token.span)
            }
            TokenKind::DecimalLiteral(text) => {
                self.stream.advance();
                let value = text.parse::<f64>().map_err(|_| {
                    syntax_error(token.span.clone(), format!("invalid number '{text}'"))
                })?;
                Ok(Expression::Literal(Literal::Double(value), token.span))
            }
            TokenKind::StringLiteral(value) => {
                self.stream.advance();
                Ok(Expression::Literal(
                    Literal::String(value.to_string()),
                    token.span,
                ))
            }
            TokenKind::True | TokenKind::False => {
                self.stream.advance();
                let value = token.kind == TokenKind::True;
                Ok(Expression::Literal(Literal::Boolean(value), token.span))
            }
            TokenKind::Null => {
                self.stream.advance();
                Ok(Expression::Literal(Literal::Null, token.span))
            }
            TokenKind::Parameter(name) => {
                self.stream.advance();
                let name = (!name.is_empty()).then_some(name);
                Ok(Expression::Literal(Literal::Param(name), token.span))
            }
            TokenKind::Identifier(name) => {
                self.stream.advance();
                if self.stream.check(&TokenKind::LParen) {
                    self.parse_call(name, token.span)
                } else {
                    Ok(Expression::Column(name, token.span))
                }
            }
            TokenKind::QuotedIdentifier(name) => {
                self.stream.advance();
                Ok(Expression::Column(name, token.span))
            }
            TokenKind::LParen => {
                self.stream.advance();
                let inner = self.parse_expression()?;
                self.stream.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_bracket_list(),
            other => Err(self.stream.error_here(format!("unexpected {other}"))),
        }
    }

    /// Parses an integer literal, or a time span when a unit follows.
    fn parse_integer(&mut self, text: &str, span: Span) -> ParseResult<Expression> {
        let value = text
            .parse::<i64>()
            .map_err(|_| syntax_error(span.clone(), format!("number '{text}' is out of range")))?;

        let unit = match &self.stream.current().kind {
            TokenKind::Identifier(word) => TimeUnit::parse(word),
            _ => None,
        };
        if let Some(unit) = unit {
            let end = self.stream.current().span.clone();
            self.stream.advance();
            return Ok(Expression::Literal(
                Literal::TimeSpan {
                    quantity: value,
                    unit,
                },
                merge_spans(&span, &end),
            ));
        }

        Ok(Expression::Literal(Literal::Integer(value), span))
    }

    fn parse_call(&mut self, name: SmolStr, name_span: Span) -> ParseResult<Expression> {
        self.stream.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.stream.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_argument()?);
                if !self.stream.consume(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.stream.expect(TokenKind::RParen)?;

        if args.len() > 1 {
            let wildcard = args.iter().find(|arg| matches!(arg, Expression::Wildcard(_)));
            if let Some(wildcard) = wildcard {
                return Err(syntax_error(
                    wildcard.span().clone(),
                    "wildcard (*) must be the only argument",
                ));
            }
        }

        Ok(Expression::Call(FunctionCall {
            name,
            syntax: CallSyntax::Function,
            args,
            span: merge_spans(&name_span, &end),
        }))
    }

    fn parse_argument(&mut self) -> ParseResult<Expression> {
        if self.stream.check(&TokenKind::Star) {
            let span = self.stream.current().span.clone();
            self.stream.advance();
            return Ok(Expression::Wildcard(span));
        }
        self.parse_expression()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Expression> {
        let tokens = tokenize(source).tokens;
        let mut stream = TokenStream::new(&tokens);
        ExpressionParser::new(&mut stream).parse_expression()
    }

    fn call(expr: &Expression) -> &FunctionCall {
        expr.as_call().expect("expected a call")
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse("1 + 2 * 3").unwrap();
        let add = call(&expr);
        assert_eq!(add.name, "+");
        assert_eq!(add.syntax, CallSyntax::Operator);
        assert_eq!(call(&add.args[1]).name, "*");
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse("a OR b AND NOT c").unwrap();
        let or = call(&expr);
        assert_eq!(or.name, "or");
        let and = call(&or.args[1]);
        assert_eq!(and.name, "and");
        assert_eq!(call(&and.args[1]).name, "not");
    }

    #[test]
    fn in_list_and_negated_predicates() {
        let expr = parse("keywordField NOT IN (\"a\", \"b\")").unwrap();
        let not_in = call(&expr);
        assert_eq!(not_in.name, "not_in");
        assert!(matches!(&not_in.args[1], Expression::List(items, _) if items.len() == 2));

        let expr = parse("textField NOT RLIKE \"a.*\"").unwrap();
        assert_eq!(call(&expr).name, "not_rlike");
    }

    #[test]
    fn is_not_null_postfix() {
        let expr = parse("x IS NOT NULL").unwrap();
        let call = call(&expr);
        assert_eq!(call.name, "is not null");
        assert_eq!(call.span, 0..13);
    }

    #[test]
    fn function_call_with_nested_args() {
        let expr = parse("ROUND(ABS(doubleField), 2)").unwrap();
        let round = call(&expr);
        assert_eq!(round.name, "ROUND");
        assert_eq!(round.syntax, CallSyntax::Function);
        assert_eq!(round.args.len(), 2);
        assert_eq!(call(&round.args[0]).name, "ABS");
        assert_eq!(round.span, 0..26);
    }

    #[test]
    fn wildcard_only_as_sole_argument() {
        let expr = parse("COUNT(*)").unwrap();
        assert!(matches!(call(&expr).args[0], Expression::Wildcard(_)));

        let err = parse("COUNT(*, x)").unwrap_err();
        assert_eq!(
            err.message,
            "SyntaxError: wildcard (*) must be the only argument"
        );
    }

    #[test]
    fn literals_type_by_shape() {
        assert!(matches!(
            parse("1.").unwrap(),
            Expression::Literal(Literal::Double(_), _)
        ));
        assert!(matches!(
            parse("-5").unwrap(),
            Expression::Literal(Literal::Integer(-5), span) if span == (0..2)
        ));
        assert!(matches!(
            parse("?start").unwrap(),
            Expression::Literal(Literal::Param(Some(ref name)), _) if name == "start"
        ));
        assert!(matches!(
            parse("3 hours").unwrap(),
            Expression::Literal(Literal::TimeSpan { quantity: 3, unit: TimeUnit::Hour }, _)
        ));
    }

    #[test]
    fn bracket_lists_are_list_literals() {
        let expr = parse("TO_CARTESIANSHAPE([0, -1])").unwrap();
        let call = call(&expr);
        let Expression::List(items, span) = &call.args[0] else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Expression::Literal(Literal::Integer(-1), _)));
        assert_eq!(span, &(18..25));

        let err = parse("[]").unwrap_err();
        assert_eq!(err.message, "SyntaxError: empty list literal");
    }

    #[test]
    fn negating_a_column_uses_neg() {
        let expr = parse("-integerField").unwrap();
        assert_eq!(call(&expr).name, "neg");
    }

    #[test]
    fn inline_cast_records_target() {
        let expr = parse("keywordField::INT").unwrap();
        let Expression::InlineCast(cast) = expr else {
            panic!("expected cast");
        };
        assert_eq!(cast.target, "INT");
        assert_eq!(cast.target_span, 14..17);
    }

    #[test]
    fn missing_operand_is_reported() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.message, "SyntaxError: unexpected end of input");
    }
}
