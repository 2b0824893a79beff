//! Pipeline commands and the query root.

use crate::ast::{Expression, Span, Spanned};
use smol_str::SmolStr;

/// A parsed query: commands separated by `|`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub commands: Vec<Command>,
    pub span: Span,
}

/// One entry of a field list, optionally assigned to a column: `col = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub target: Option<Spanned<SmolStr>>,
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// A `SORT` key.
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub expression: Expression,
    pub order: Option<SortOrder>,
    pub nulls: Option<NullsOrder>,
    pub span: Span,
}

/// Pipeline command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    From {
        sources: Vec<Spanned<SmolStr>>,
        span: Span,
    },
    Row {
        fields: Vec<Field>,
        span: Span,
    },
    Eval {
        fields: Vec<Field>,
        span: Span,
    },
    Where {
        condition: Expression,
        span: Span,
    },
    Stats {
        aggregates: Vec<Field>,
        by: Vec<Field>,
        span: Span,
    },
    Sort {
        items: Vec<SortItem>,
        span: Span,
    },
    Limit {
        count: u64,
        span: Span,
    },
    Keep {
        columns: Vec<Spanned<SmolStr>>,
        span: Span,
    },
    Drop {
        columns: Vec<Spanned<SmolStr>>,
        span: Span,
    },
}

impl Command {
    /// Upper-case command keyword, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::From { .. } => "FROM",
            Command::Row { .. } => "ROW",
            Command::Eval { .. } => "EVAL",
            Command::Where { .. } => "WHERE",
            Command::Stats { .. } => "STATS",
            Command::Sort { .. } => "SORT",
            Command::Limit { .. } => "LIMIT",
            Command::Keep { .. } => "KEEP",
            Command::Drop { .. } => "DROP",
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Command::From { span, .. }
            | Command::Row { span, .. }
            | Command::Eval { span, .. }
            | Command::Where { span, .. }
            | Command::Stats { span, .. }
            | Command::Sort { span, .. }
            | Command::Limit { span, .. }
            | Command::Keep { span, .. }
            | Command::Drop { span, .. } => span,
        }
    }
}
