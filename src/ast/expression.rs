//! Expression nodes.
//!
//! Operators are represented as [`FunctionCall`]s whose name is the operator's
//! catalog name (`+`, `==`, `in`, `is null`, ...), so the validator resolves
//! them through the same signature machinery as named functions.

use crate::ast::Span;
use smol_str::SmolStr;

/// Unit attached to a time-span literal such as `1 hour` or `3 days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    /// Parses a unit keyword, accepting singular, plural and common abbreviations.
    pub fn parse(text: &str) -> Option<Self> {
        let unit = match text.to_ascii_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Self::Millisecond,
            "s" | "sec" | "second" | "seconds" => Self::Second,
            "min" | "minute" | "minutes" => Self::Minute,
            "h" | "hour" | "hours" => Self::Hour,
            "d" | "day" | "days" => Self::Day,
            "w" | "week" | "weeks" => Self::Week,
            "mo" | "month" | "months" => Self::Month,
            "q" | "quarter" | "quarters" => Self::Quarter,
            "yr" | "y" | "year" | "years" => Self::Year,
            _ => return None,
        };
        Some(unit)
    }

    /// Returns true for units of a day or longer, which form calendar periods.
    pub fn is_calendar(self) -> bool {
        matches!(
            self,
            Self::Day | Self::Week | Self::Month | Self::Quarter | Self::Year
        )
    }
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Whole number. Values outside the `i32` range type as `long`.
    Integer(i64),
    /// Decimal number such as `1.`, `1.5` or `2e3`.
    Double(f64),
    /// Quoted string.
    String(String),
    Boolean(bool),
    Null,
    /// Quantity with a time unit, e.g. `1 hour`.
    TimeSpan { quantity: i64, unit: TimeUnit },
    /// Query parameter: `?` or `?name`.
    Param(Option<SmolStr>),
}

/// How a call was written in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSyntax {
    /// `NAME(args)`.
    Function,
    /// Infix, prefix or postfix operator.
    Operator,
}

/// A function or operator application.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Name as written for functions; the catalog name for operators.
    pub name: SmolStr,
    pub syntax: CallSyntax,
    pub args: Vec<Expression>,
    pub span: Span,
}

impl FunctionCall {
    /// Lower-cased name used for catalog lookup and diagnostics.
    pub fn lookup_name(&self) -> SmolStr {
        SmolStr::new(self.name.to_lowercase())
    }
}

/// An `expr::TYPE` cast.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineCast {
    pub expression: Box<Expression>,
    /// Target type name as written, e.g. `INT` or `keyword`.
    pub target: SmolStr,
    pub target_span: Span,
    pub span: Span,
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal, Span),
    /// Reference to an index field or a user-defined column.
    Column(SmolStr, Span),
    Call(FunctionCall),
    InlineCast(InlineCast),
    /// Parenthesised value list, the right-hand side of `IN`.
    List(Vec<Expression>, Span),
    /// A bare `*` argument, as in `COUNT(*)`.
    Wildcard(Span),
}

impl Expression {
    /// Returns the source span of this expression.
    pub fn span(&self) -> &Span {
        match self {
            Expression::Literal(_, span)
            | Expression::Column(_, span)
            | Expression::List(_, span)
            | Expression::Wildcard(span) => span,
            Expression::Call(call) => &call.span,
            Expression::InlineCast(cast) => &cast.span,
        }
    }

    /// Returns the call node when this expression is a function or operator call.
    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            Expression::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Returns true for a string literal.
    pub fn is_string_literal(&self) -> bool {
        matches!(self, Expression::Literal(Literal::String(_), _))
    }
}
