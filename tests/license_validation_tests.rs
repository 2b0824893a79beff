// Integration tests for license-gated functions and signatures.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use common::*;
use esql_validator::semantic::{
    FunctionCatalog, LicenseTier, SemanticDiagKind, StaticLicense, ValidationConfig, Validator,
};
use esql_validator::validate;

const PLATINUM_REQUIRED: &str = "PLATINUM_FUNCTION_MOCK requires a PLATINUM license.";
const PARTIAL_REQUIRED: &str =
    "PLATINUM_PARTIAL_FUNCTION_MOCK with 'field' of type 'cartesian_shape' requires a PLATINUM license.";

fn catalog() -> FunctionCatalog {
    catalog_with(license_mocks())
}

#[track_caller]
fn expect_licensed(source: &str, has_platinum: bool, expected: &[&str]) {
    let catalog = catalog();
    let outcome = validate_licensed(&catalog, source, has_platinum);
    assert_eq!(
        outcome.error_messages(),
        expected,
        "source: {source}\n{}",
        format_diagnostics(&outcome.diagnostics)
    );
}

#[test]
fn platinum_functions_validate_with_platinum_license() {
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(keywordField)",
        true,
        &[],
    );
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(textField)",
        true,
        &[],
    );
}

#[test]
fn platinum_functions_are_rejected_without_license() {
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(keywordField)",
        false,
        &[PLATINUM_REQUIRED],
    );
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(wrongField)",
        false,
        &[PLATINUM_REQUIRED, "Unknown column [wrongField]"],
    );
}

#[test]
fn license_failures_do_not_suppress_other_diagnostics() {
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK()",
        false,
        &[
            PLATINUM_REQUIRED,
            "Error: [platinum_function_mock] function expects exactly one argument, got 0.",
        ],
    );
    expect_licensed(
        "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(integerField)",
        false,
        &[
            PLATINUM_REQUIRED,
            "Argument of [platinum_function_mock] must be [keyword], found value [integerField] type [integer]",
        ],
    );
}

#[test]
fn partial_license_applies_to_the_gated_signature_only() {
    expect_licensed(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianPointField)",
        false,
        &[],
    );
    expect_licensed(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(TO_CARTESIANSHAPE([0,0]))",
        true,
        &[],
    );
    expect_licensed(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(TO_CARTESIANSHAPE([0,0]))",
        false,
        &[PARTIAL_REQUIRED],
    );
    expect_licensed(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField)",
        false,
        &[PARTIAL_REQUIRED],
    );
}

#[test]
fn denied_inner_calls_do_not_cascade_into_outer_calls() {
    expect_licensed(
        "FROM a_index | STATS result = PLATINUM_FUNCTION_MOCK(PLATINUM_PARTIAL_FUNCTION_MOCK(TO_CARTESIANSHAPE([0,0])))",
        false,
        &[PLATINUM_REQUIRED, PARTIAL_REQUIRED],
    );
    expect_licensed(
        "FROM a_index | STATS result = PLATINUM_PARTIAL_FUNCTION_MOCK(TO_CARTESIANSHAPE(PLATINUM_FUNCTION_MOCK()))",
        false,
        &[
            PLATINUM_REQUIRED,
            "Error: [platinum_function_mock] function expects exactly one argument, got 0.",
            PARTIAL_REQUIRED,
        ],
    );
}

#[test]
fn denied_calls_are_unknown_to_enclosing_calls() {
    let catalog = catalog();
    let outcome = validate_licensed(
        &catalog,
        "FROM a_index | STATS s = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField) | EVAL LENGTH(s)",
        false,
    );
    assert_eq!(outcome.error_messages(), vec![PARTIAL_REQUIRED]);

    let outcome = validate_licensed(
        &catalog,
        "FROM a_index | STATS s = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField) | EVAL LENGTH(s)",
        true,
    );
    assert_eq!(
        outcome.error_messages(),
        vec!["Argument of [length] must be [keyword], found value [s] type [cartesian_shape]"]
    );
}

#[test]
fn nested_aggregation_is_reported_once_whatever_the_license() {
    const NESTED_SHAPE: &str = "Aggregate function's parameters must be an attribute, literal or a non-aggregation function; found [PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField)] of type [cartesian_shape]";
    const NESTED_POINT: &str = "Aggregate function's parameters must be an attribute, literal or a non-aggregation function; found [PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianPointField)] of type [cartesian_shape]";

    let inner_gated = "FROM a_index | STATS c = COUNT(PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField))";
    expect_licensed(inner_gated, true, &[NESTED_SHAPE]);
    expect_licensed(inner_gated, false, &[PARTIAL_REQUIRED, NESTED_SHAPE]);

    let outer_gated = "FROM a_index \
        | STATS e = PLATINUM_PARTIAL_FUNCTION_MOCK(PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianPointField))";
    expect_licensed(outer_gated, true, &[NESTED_POINT]);
    expect_licensed(outer_gated, false, &[NESTED_POINT, PARTIAL_REQUIRED]);

    for has_platinum in [true, false] {
        let catalog = catalog();
        for source in [inner_gated, outer_gated] {
            let outcome = validate_licensed(&catalog, source, has_platinum);
            assert_eq!(outcome.of_kind(SemanticDiagKind::NestedAggregation).count(), 1);
        }
    }
}

#[test]
fn non_license_errors_for_partial_function() {
    expect_licensed(
        "FROM a_index | STATS result = PLATINUM_PARTIAL_FUNCTION_MOCK()",
        false,
        &["Error: [platinum_partial_function_mock] function expects exactly one argument, got 0."],
    );
    expect_licensed(
        "FROM a_index | STATS result = PLATINUM_PARTIAL_FUNCTION_MOCK(0)",
        false,
        &["Argument of [platinum_partial_function_mock] must be [cartesian_point], found value [0] type [integer]"],
    );
    // An unknown argument resolves to the first, unlicensed signature.
    expect_licensed(
        "FROM a_index | STATS result = PLATINUM_PARTIAL_FUNCTION_MOCK(WrongField)",
        false,
        &["Unknown column [WrongField]"],
    );
    expect_licensed(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(TO_CARTESIANSHAPE(0))",
        false,
        &["Argument of [to_cartesianshape] must be [cartesian_point], found value [0] type [integer]"],
    );
}

#[test]
fn license_checks_are_skipped_without_context_or_when_disabled() {
    let catalog = catalog();
    let source = "FROM a_index | STATS col0 = AVG(doubleField) BY PLATINUM_FUNCTION_MOCK(keywordField)";

    let outcome = validate_source(&catalog, source);
    assert!(outcome.is_clean(), "{:?}", outcome.messages());

    let schema = test_schema();
    let basic = StaticLicense(LicenseTier::Basic);
    let validator = Validator::new(&catalog)
        .with_schema(&schema)
        .with_license(&basic)
        .with_config(ValidationConfig::default().with_license_checks(false));
    assert!(validate(source, &validator).is_clean());

    let validator = Validator::new(&catalog)
        .with_schema(&schema)
        .with_license(&basic);
    let outcome = validate(source, &validator);
    assert_eq!(outcome.of_kind(SemanticDiagKind::LicenseRequired).count(), 1);
}

#[test]
fn enterprise_license_covers_platinum() {
    let catalog = catalog();
    let schema = test_schema();
    let license = StaticLicense(LicenseTier::Enterprise);
    let validator = Validator::new(&catalog)
        .with_schema(&schema)
        .with_license(&license);
    let outcome = validate(
        "FROM a_index | STATS extent = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField)",
        &validator,
    );
    assert!(outcome.is_clean(), "{:?}", outcome.messages());
}

#[test]
fn license_answers_are_memoized_per_run() {
    let catalog = catalog();
    let schema = test_schema();
    let calls = AtomicUsize::new(0);
    let license = |_tier: LicenseTier| {
        calls.fetch_add(1, Ordering::SeqCst);
        false
    };
    let validator = Validator::new(&catalog)
        .with_schema(&schema)
        .with_license(&license);

    let source = "FROM a_index \
        | STATS a = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField), \
                b = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianShapeField), \
                c = PLATINUM_PARTIAL_FUNCTION_MOCK(cartesianPointField)";
    let outcome = validate(source, &validator);
    assert_eq!(outcome.error_messages(), vec![PARTIAL_REQUIRED, PARTIAL_REQUIRED]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A new run asks again.
    validate(source, &validator);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
