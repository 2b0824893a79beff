//! AST foundation types and node structures.

mod command;
mod expression;
mod span;

pub use span::{Span, Spanned, merge_spans, span_text};

pub use command::{Command, Field, NullsOrder, Query, SortItem, SortOrder};
pub use expression::{
    CallSyntax, Expression, FunctionCall, InlineCast, Literal, TimeUnit,
};
