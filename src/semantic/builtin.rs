//! Built-in operator and function definitions.
//!
//! Numeric operators list every integer/long/double pairing explicitly; there
//! is no implicit widening during matching, so each pairing declares its
//! result type.

use crate::semantic::catalog::{
    FunctionDefinition, FunctionKind, Location, Parameter, Signature,
};
use crate::semantic::types::{FieldType, ParamType};

use FieldType::*;

const NUMERIC: [FieldType; 3] = [Integer, Long, Double];

/// Types every comparison operator accepts on both sides.
const COMPARABLE: [FieldType; 6] = [Keyword, Date, DateNanos, Ip, Version, Boolean];

fn param(name: &str, ty: impl Into<ParamType>) -> Parameter {
    Parameter::new(name, ty)
}

fn unary(name: &str, ty: FieldType, ret: impl Into<ParamType>) -> Signature {
    Signature::new(vec![param(name, ty)], ret)
}

fn binary(left: FieldType, right: FieldType, ret: FieldType) -> Signature {
    Signature::new(vec![param("left", left), param("right", right)], ret)
}

fn wider(left: FieldType, right: FieldType) -> FieldType {
    if left == Double || right == Double {
        Double
    } else if left == Long || right == Long {
        Long
    } else {
        Integer
    }
}

fn numeric_pairs(ret: impl Fn(FieldType, FieldType) -> FieldType) -> Vec<Signature> {
    let mut signatures = Vec::new();
    for left in NUMERIC {
        for right in NUMERIC {
            signatures.push(binary(left, right, ret(left, right)));
        }
    }
    signatures
}

fn operator(name: &str) -> FunctionDefinition {
    FunctionDefinition::new(name, FunctionKind::Operator)
}

fn scalar(name: &str) -> FunctionDefinition {
    FunctionDefinition::new(name, FunctionKind::Scalar)
}

fn aggregation(name: &str) -> FunctionDefinition {
    FunctionDefinition::new(name, FunctionKind::Agg).with_locations([Location::Stats])
}

/// Returns every built-in definition.
pub(crate) fn builtin_definitions() -> Vec<FunctionDefinition> {
    let mut definitions = operators();
    definitions.extend(scalars());
    definitions.extend(aggregations());
    definitions.push(bucket());
    definitions
}

fn operators() -> Vec<FunctionDefinition> {
    let mut definitions = Vec::new();

    let mut add = numeric_pairs(wider);
    let mut subtract = numeric_pairs(wider);
    for span in [TimeDuration, DatePeriod] {
        add.push(binary(Date, span, Date));
        add.push(binary(span, Date, Date));
        add.push(binary(span, span, span));
        subtract.push(binary(Date, span, Date));
        subtract.push(binary(span, span, span));
    }
    definitions.push(operator("+").with_signatures(add));
    definitions.push(operator("-").with_signatures(subtract));
    for name in ["*", "/", "%"] {
        definitions.push(operator(name).with_signatures(numeric_pairs(wider)));
    }

    for name in ["==", "!=", "<", "<=", ">", ">="] {
        let mut signatures = numeric_pairs(|_, _| Boolean);
        signatures.extend(COMPARABLE.into_iter().map(|ty| binary(ty, ty, Boolean)));
        definitions.push(operator(name).with_signatures(signatures));
    }

    for name in ["and", "or"] {
        definitions.push(operator(name).with_signature(binary(Boolean, Boolean, Boolean)));
    }
    definitions.push(operator("not").with_signature(unary("expression", Boolean, Boolean)));

    for name in ["in", "not_in"] {
        let signatures = NUMERIC
            .into_iter()
            .chain(COMPARABLE)
            .map(|ty| {
                Signature::new(
                    vec![param("left", ty), param("right", ParamType::List(ty))],
                    Boolean,
                )
            });
        definitions.push(operator(name).with_signatures(signatures));
    }

    for name in ["like", "not_like", "rlike", "not_rlike"] {
        definitions.push(operator(name).with_signature(Signature::new(
            vec![param("left", Keyword), param("pattern", Keyword)],
            Boolean,
        )));
    }

    for name in ["is null", "is not null"] {
        definitions.push(operator(name).with_signature(Signature::new(
            vec![param("expression", ParamType::Any)],
            Boolean,
        )));
    }

    definitions.push(
        operator("neg").with_signatures(
            [Integer, Long, Double, TimeDuration, DatePeriod]
                .into_iter()
                .map(|ty| unary("value", ty, ty)),
        ),
    );

    definitions
}

fn scalars() -> Vec<FunctionDefinition> {
    let numeric_identity = |name: &str| {
        scalar(name).with_signatures(
            NUMERIC
                .into_iter()
                .chain([UnsignedLong])
                .map(|ty| unary("number", ty, ty)),
        )
    };

    vec![
        numeric_identity("abs"),
        scalar("round").with_signatures(NUMERIC.into_iter().map(|ty| {
            Signature::new(
                vec![
                    param("number", ty),
                    param("decimals", Integer).optional(),
                ],
                ty,
            )
        })),
        scalar("concat").with_signature(
            Signature::new(vec![param("string", Keyword)], Keyword).with_min_params(2),
        ),
        scalar("length").with_signature(unary("string", Keyword, Integer)),
        scalar("to_lower").with_signature(unary("str", Keyword, Keyword)),
        scalar("to_upper").with_signature(unary("str", Keyword, Keyword)),
        scalar("date_trunc").with_signatures([TimeDuration, DatePeriod].into_iter().map(
            |interval| {
                Signature::new(vec![param("interval", interval), param("date", Date)], Date)
            },
        )),
        scalar("now").with_signature(Signature::new(vec![], Date)),
        scalar("to_cartesianpoint").with_signatures(
            [CartesianPoint, Keyword]
                .into_iter()
                .map(|ty| unary("field", ty, CartesianPoint)),
        ),
        scalar("to_cartesianshape").with_signatures(
            [CartesianPoint, CartesianShape, Keyword]
                .into_iter()
                .map(|ty| unary("field", ty, CartesianShape)),
        ),
        scalar("to_string").with_signature(Signature::new(
            vec![param("field", ParamType::Any)],
            Keyword,
        )),
        scalar("coalesce").with_signatures(
            NUMERIC
                .into_iter()
                .chain(COMPARABLE)
                .map(|ty| Signature::new(vec![param("first", ty)], ty).with_min_params(1)),
        ),
    ]
}

fn aggregations() -> Vec<FunctionDefinition> {
    let orderable = [Integer, Long, Double, Date, Boolean, Keyword, Ip, Version];

    vec![
        aggregation("avg")
            .with_signatures(NUMERIC.into_iter().map(|ty| unary("number", ty, Double))),
        aggregation("count").with_signature(Signature::new(
            vec![param("field", ParamType::Any).optional().supports_wildcard()],
            Long,
        )),
        aggregation("count_distinct").with_signature(Signature::new(
            vec![
                param("field", ParamType::Any),
                param("precision", Integer).optional().constant_only(),
            ],
            Long,
        )),
        aggregation("max").with_signatures(orderable.into_iter().map(|ty| unary("field", ty, ty))),
        aggregation("min").with_signatures(orderable.into_iter().map(|ty| unary("field", ty, ty))),
        aggregation("sum").with_signatures([
            unary("number", Integer, Long),
            unary("number", Long, Long),
            unary("number", Double, Double),
        ]),
        aggregation("median")
            .with_signatures(NUMERIC.into_iter().map(|ty| unary("number", ty, Double))),
        aggregation("values")
            .with_signatures(orderable.into_iter().map(|ty| unary("field", ty, ty))),
    ]
}

fn bucket() -> FunctionDefinition {
    let mut signatures: Vec<Signature> = [DatePeriod, TimeDuration]
        .into_iter()
        .map(|span| {
            Signature::new(
                vec![param("field", Date), param("buckets", span).constant_only()],
                Date,
            )
        })
        .collect();
    signatures.push(Signature::new(
        vec![
            param("field", Date),
            param("buckets", Integer).constant_only(),
            param("from", Date).constant_only(),
            param("to", Date).constant_only(),
        ],
        Date,
    ));
    signatures.extend(NUMERIC.into_iter().map(|ty| {
        Signature::new(
            vec![param("field", ty), param("span", Double).constant_only()],
            Double,
        )
    }));

    FunctionDefinition::new("bucket", FunctionKind::Grouping)
        .with_signatures(signatures)
        .with_locations([Location::StatsBy])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(name: &str) -> FunctionDefinition {
        builtin_definitions()
            .into_iter()
            .find(|def| def.name == name)
            .unwrap_or_else(|| panic!("missing builtin {name}"))
    }

    #[test]
    fn arithmetic_widens_result() {
        let plus = find("+");
        let int_double = plus
            .signatures
            .iter()
            .find(|s| {
                s.params[0].param_type == ParamType::Scalar(Integer)
                    && s.params[1].param_type == ParamType::Scalar(Double)
            })
            .unwrap();
        assert_eq!(int_double.return_type, ParamType::Scalar(Double));
    }

    #[test]
    fn in_takes_a_list_on_the_right() {
        let in_op = find("in");
        let keyword_index = in_op
            .signatures
            .iter()
            .position(|s| s.params[1].param_type == ParamType::List(Keyword));
        assert!(keyword_index.is_some());
    }

    #[test]
    fn aggregations_are_stats_only() {
        for name in ["avg", "count", "max", "values"] {
            let def = find(name);
            assert_eq!(def.kind, FunctionKind::Agg);
            assert!(def.is_available_in(Location::Stats));
            assert!(!def.is_available_in(Location::Eval));
        }
        assert!(find("bucket").is_available_in(Location::StatsBy));
        assert!(!find("bucket").is_available_in(Location::Stats));
    }

    #[test]
    fn count_accepts_wildcard() {
        let count = find("count");
        assert!(count.signatures[0].params[0].supports_wildcard);
        assert_eq!(count.signatures[0].min_arity(), 0);
    }
}
