//! Overload resolution for function calls.
//!
//! Signatures are first filtered by arity. The first signature whose every
//! argument is compatible wins; when none is, mismatches are reported against
//! the signature with the fewest incompatible positions, earliest declared
//! first.

use std::collections::BTreeSet;

use crate::ast::Expression;
use crate::semantic::catalog::{FunctionDefinition, Signature};
use crate::semantic::types::{ExprType, FieldType, ParamType};

#[derive(Debug, Clone, PartialEq)]
pub(super) enum MatchOutcome {
    Matched {
        signature: usize,
        return_type: ExprType,
    },
    /// No signature accepts the argument count; `expected` completes
    /// "function expects ...".
    Arity { expected: String },
    /// Positions of incompatible arguments in the best-effort signature.
    Mismatch {
        signature: usize,
        positions: Vec<usize>,
    },
}

pub(super) fn match_signatures(
    definition: &FunctionDefinition,
    args: &[Expression],
    types: &[ExprType],
) -> MatchOutcome {
    let candidates: Vec<(usize, &Signature)> = definition
        .signatures
        .iter()
        .enumerate()
        .filter(|(_, signature)| signature.matches_arity(args.len()))
        .collect();

    if candidates.is_empty() {
        return MatchOutcome::Arity {
            expected: expected_arity(&definition.signatures, args.len()),
        };
    }

    let scored: Vec<(usize, &Signature, Vec<usize>)> = candidates
        .into_iter()
        .map(|(index, signature)| (index, signature, mismatches(signature, args, types)))
        .collect();

    let compatible: Vec<(usize, &Signature)> = scored
        .iter()
        .filter(|(_, _, positions)| positions.is_empty())
        .map(|(index, signature, _)| (*index, *signature))
        .collect();

    if let Some((first, signature)) = compatible.first() {
        let return_type = ExprType::from(signature.return_type);
        let ambiguous = types.iter().any(is_unresolved)
            && compatible
                .iter()
                .any(|(_, other)| ExprType::from(other.return_type) != return_type);
        return MatchOutcome::Matched {
            signature: *first,
            return_type: if ambiguous {
                ExprType::Unknown
            } else {
                return_type
            },
        };
    }

    // min_by_key keeps the first of equal minima, i.e. declaration order.
    match scored
        .into_iter()
        .min_by_key(|(_, _, positions)| positions.len())
    {
        Some((signature, _, positions)) => MatchOutcome::Mismatch {
            signature,
            positions,
        },
        None => MatchOutcome::Arity {
            expected: expected_arity(&definition.signatures, args.len()),
        },
    }
}

fn mismatches(signature: &Signature, args: &[Expression], types: &[ExprType]) -> Vec<usize> {
    args.iter()
        .zip(types)
        .enumerate()
        .filter(|(position, (arg, ty))| {
            signature
                .param_at(*position)
                .is_some_and(|param| !accepts(param.param_type, ty, arg))
        })
        .map(|(position, _)| position)
        .collect()
}

/// Whether an argument of type `ty` fits a parameter of type `expected`.
pub(super) fn accepts(expected: ParamType, ty: &ExprType, arg: &Expression) -> bool {
    if ty.is_permissive() {
        return true;
    }
    match expected {
        ParamType::Any => true,
        ParamType::Scalar(field) => accepts_scalar(field, ty, arg),
        ParamType::List(element) => match (ty, arg) {
            (ExprType::Tuple(items), Expression::List(values, _)) => items
                .iter()
                .zip(values)
                .all(|(item, value)| item.is_permissive() || accepts_scalar(element, item, value)),
            (ExprType::Tuple(items), _) => items.iter().all(|item| {
                item.is_permissive()
                    || item
                        .as_field()
                        .is_some_and(|field| field.is_compatible_with(element))
            }),
            _ => accepts_scalar(element, ty, arg),
        },
    }
}

/// Argument types that may leave several overloads compatible: unknown values
/// and multi-value literals.
fn is_unresolved(ty: &ExprType) -> bool {
    matches!(ty, ExprType::Unknown | ExprType::Tuple(_))
}

fn accepts_scalar(expected: FieldType, ty: &ExprType, arg: &Expression) -> bool {
    match ty {
        ExprType::Field(actual) => {
            actual.is_compatible_with(expected)
                || (arg.is_string_literal()
                    && matches!(expected, FieldType::Date | FieldType::DateNanos))
        }
        // Multi-value literals are not checked against scalar parameters.
        _ => true,
    }
}

fn arguments(count: usize) -> String {
    match count {
        1 => "one argument".to_string(),
        n => format!("{n} arguments"),
    }
}

/// Describes the accepted argument counts when none fits `given`.
fn expected_arity(signatures: &[Signature], given: usize) -> String {
    let min = signatures
        .iter()
        .map(Signature::min_arity)
        .min()
        .unwrap_or(0);
    let max = signatures
        .iter()
        .map(Signature::max_arity)
        .try_fold(0, |acc, max| max.map(|max| acc.max(max)));

    if max == Some(min) {
        return if min == 0 {
            "no arguments".to_string()
        } else {
            format!("exactly {}", arguments(min))
        };
    }
    if given < min {
        return format!("at least {}", arguments(min));
    }
    if let Some(max) = max {
        if given > max {
            return format!("no more than {}", arguments(max));
        }
    }

    let mut counts = BTreeSet::new();
    let mut variadic_min: Option<usize> = None;
    for signature in signatures {
        match signature.max_arity() {
            Some(max) => counts.extend(signature.min_arity()..=max),
            None => {
                let min = signature.min_arity();
                variadic_min = Some(variadic_min.map_or(min, |current| current.min(min)));
            }
        }
    }
    let mut parts: Vec<String> = counts
        .into_iter()
        .filter(|count| variadic_min.is_none_or(|min| *count < min))
        .map(|count| count.to_string())
        .collect();
    if let Some(min) = variadic_min {
        parts.push(format!("at least {min}"));
    }
    let listed = match parts.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    };
    format!("{listed} arguments")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::semantic::catalog::{FunctionKind, Parameter};

    fn definition(signatures: Vec<Signature>) -> FunctionDefinition {
        FunctionDefinition::new("test", FunctionKind::Scalar).with_signatures(signatures)
    }

    fn literal(literal: Literal) -> Expression {
        Expression::Literal(literal, 0..1)
    }

    fn int_sig(count: usize) -> Signature {
        Signature::new(
            (0..count)
                .map(|i| Parameter::new(format!("arg{i}"), FieldType::Integer))
                .collect(),
            FieldType::Integer,
        )
    }

    #[test]
    fn first_compatible_signature_wins() {
        let def = definition(vec![
            Signature::new(vec![Parameter::new("a", FieldType::Integer)], FieldType::Integer),
            Signature::new(vec![Parameter::new("a", FieldType::Date)], FieldType::Date),
        ]);
        let args = [literal(Literal::String("2024-01-01".into()))];
        let outcome = match_signatures(&def, &args, &[FieldType::Keyword.into()]);
        assert_eq!(
            outcome,
            MatchOutcome::Matched {
                signature: 1,
                return_type: FieldType::Date.into()
            }
        );
    }

    #[test]
    fn fewest_mismatches_then_declaration_order() {
        let def = definition(vec![
            Signature::new(
                vec![
                    Parameter::new("a", FieldType::Integer),
                    Parameter::new("b", FieldType::Integer),
                ],
                FieldType::Integer,
            ),
            Signature::new(
                vec![
                    Parameter::new("a", FieldType::Date),
                    Parameter::new("b", FieldType::Keyword),
                ],
                FieldType::Date,
            ),
        ]);
        let args = [
            literal(Literal::Integer(1)),
            literal(Literal::String(String::new())),
        ];
        let types = [FieldType::Integer.into(), FieldType::Keyword.into()];
        assert_eq!(
            match_signatures(&def, &args, &types),
            MatchOutcome::Mismatch {
                signature: 0,
                positions: vec![1]
            }
        );
    }

    #[test]
    fn unknown_arguments_with_divergent_returns_resolve_to_unknown() {
        let def = definition(vec![
            Signature::new(vec![Parameter::new("a", FieldType::Integer)], FieldType::Integer),
            Signature::new(vec![Parameter::new("a", FieldType::Date)], FieldType::Date),
        ]);
        let args = [Expression::Column("x".into(), 0..1)];
        assert_eq!(
            match_signatures(&def, &args, &[ExprType::Unknown]),
            MatchOutcome::Matched {
                signature: 0,
                return_type: ExprType::Unknown
            }
        );
    }

    #[test]
    fn arity_phrases() {
        assert_eq!(expected_arity(&[int_sig(1)], 0), "exactly one argument");
        assert_eq!(expected_arity(&[int_sig(0)], 1), "no arguments");
        assert_eq!(expected_arity(&[int_sig(1), int_sig(2)], 3), "no more than 2 arguments");
        assert_eq!(expected_arity(&[int_sig(1), int_sig(2)], 0), "at least one argument");
        assert_eq!(expected_arity(&[int_sig(1), int_sig(3)], 2), "1 or 3 arguments");
        assert_eq!(
            expected_arity(&[int_sig(1).with_min_params(2)], 1),
            "at least 2 arguments"
        );
        assert_eq!(
            expected_arity(&[int_sig(1), int_sig(1).with_min_params(3)], 2),
            "1 or at least 3 arguments"
        );
    }

    #[test]
    fn tuples_fit_list_parameters_elementwise() {
        let list = ParamType::List(FieldType::Keyword);
        let values = Expression::List(
            vec![
                literal(Literal::String("a".into())),
                literal(Literal::Null),
            ],
            0..9,
        );
        let fits = ExprType::Tuple(vec![FieldType::Keyword.into(), ExprType::Null]);
        let misfits = ExprType::Tuple(vec![FieldType::Integer.into(), ExprType::Null]);
        assert!(accepts(list, &fits, &values));
        assert!(!accepts(list, &misfits, &values));
        assert!(accepts(list, &FieldType::Text.into(), &Expression::Column("t".into(), 0..1)));
    }

    #[test]
    fn multi_value_literals_fit_scalar_parameters() {
        let values = Expression::List(
            vec![literal(Literal::Integer(0)), literal(Literal::Integer(0))],
            0..5,
        );
        let ty = ExprType::Tuple(vec![FieldType::Integer.into(), FieldType::Integer.into()]);
        assert!(accepts(ParamType::Scalar(FieldType::CartesianPoint), &ty, &values));

        let shape = definition(vec![
            Signature::new(
                vec![Parameter::new("v", FieldType::CartesianPoint)],
                FieldType::CartesianShape,
            ),
            Signature::new(
                vec![Parameter::new("v", FieldType::Keyword)],
                FieldType::CartesianShape,
            ),
        ]);
        assert_eq!(
            match_signatures(&shape, std::slice::from_ref(&values), std::slice::from_ref(&ty)),
            MatchOutcome::Matched {
                signature: 0,
                return_type: FieldType::CartesianShape.into(),
            }
        );

        let abs = definition(vec![
            Signature::new(vec![Parameter::new("n", FieldType::Integer)], FieldType::Integer),
            Signature::new(vec![Parameter::new("n", FieldType::Double)], FieldType::Double),
        ]);
        assert_eq!(
            match_signatures(&abs, &[values], &[ty]),
            MatchOutcome::Matched {
                signature: 0,
                return_type: ExprType::Unknown,
            }
        );
    }

    #[test]
    fn no_numeric_widening() {
        let arg = literal(Literal::Double(1.1));
        assert!(!accepts(
            ParamType::Scalar(FieldType::Integer),
            &FieldType::Double.into(),
            &arg
        ));
        assert!(accepts(ParamType::Any, &FieldType::Double.into(), &arg));
    }
}
