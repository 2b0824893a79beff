//! Types of leaf expressions and constant folding eligibility.

use crate::ast::{Expression, Literal};
use crate::semantic::types::{ExprType, FieldType};

/// Type of a literal. Integers outside the 32-bit range are longs.
pub(super) fn literal_type(literal: &Literal) -> ExprType {
    match literal {
        Literal::Integer(value) => {
            if i32::try_from(*value).is_ok() {
                FieldType::Integer.into()
            } else {
                FieldType::Long.into()
            }
        }
        Literal::Double(_) => FieldType::Double.into(),
        Literal::String(_) => FieldType::Keyword.into(),
        Literal::Boolean(_) => FieldType::Boolean.into(),
        Literal::Null => ExprType::Null,
        Literal::TimeSpan { unit, .. } => {
            if unit.is_calendar() {
                FieldType::DatePeriod.into()
            } else {
                FieldType::TimeDuration.into()
            }
        }
        Literal::Param(_) => ExprType::Param,
    }
}

/// Whether `expr` can be evaluated without reading any column.
pub(super) fn is_constant(expr: &Expression) -> bool {
    match expr {
        Expression::Literal(..) => true,
        Expression::Column(..) | Expression::Wildcard(_) => false,
        Expression::Call(call) => call.args.iter().all(is_constant),
        Expression::InlineCast(cast) => is_constant(&cast.expression),
        Expression::List(items, _) => items.iter().all(is_constant),
    }
}
