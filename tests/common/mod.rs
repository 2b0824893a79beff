//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration tests.
//!
//! # Fixtures
//! - [`test_schema`] - Index schema with one field per common type
//! - [`catalog_with`] - Built-in catalog overlaid with test definitions
//! - [`function`], [`sig`], [`param`] - Terse definition builders
//!
//! # Validation Helpers
//! - [`validate_source`] - Parse and validate against the test schema
//! - [`validate_licensed`] - Same, with a license context
//! - [`expect_errors`] / [`expect_diagnostics`] - Exact message assertions

#![allow(dead_code)]

use esql_validator::diag::Diag;
use esql_validator::semantic::{
    FieldType, FunctionCatalog, FunctionDefinition, FunctionKind, InMemorySchema, LicenseTier,
    Location, Parameter, ParamType, Signature, ValidationConfig, ValidationOutcome, Validator,
};
use esql_validator::{parse, validate};

// ============================================================================
// Fixtures
// ============================================================================

/// Fields of the `a_index` test index.
pub fn test_schema() -> InMemorySchema {
    InMemorySchema::new()
        .with_field("integerField", FieldType::Integer)
        .with_field("longField", FieldType::Long)
        .with_field("doubleField", FieldType::Double)
        .with_field("keywordField", FieldType::Keyword)
        .with_field("textField", FieldType::Text)
        .with_field("dateField", FieldType::Date)
        .with_field("booleanField", FieldType::Boolean)
        .with_field("ipField", FieldType::Ip)
        .with_field("cartesianPointField", FieldType::CartesianPoint)
        .with_field("cartesianShapeField", FieldType::CartesianShape)
}

/// Built-in catalog with `definitions` shadowing same-named built-ins.
pub fn catalog_with(definitions: Vec<FunctionDefinition>) -> FunctionCatalog {
    FunctionCatalog::builtin()
        .with_functions(definitions)
        .expect("test definitions are well formed")
}

/// Parameter from a type name such as `integer`, `any` or `keyword[]`.
pub fn param(name: &str, ty: &str) -> Parameter {
    let ty: ParamType = ty.parse().expect("valid parameter type");
    Parameter::new(name, ty)
}

/// Signature with the given parameters and return type name.
pub fn sig(params: Vec<Parameter>, returns: &str) -> Signature {
    let returns: ParamType = returns.parse().expect("valid return type");
    Signature::new(params, returns)
}

pub fn function(
    name: &str,
    kind: FunctionKind,
    locations: &[Location],
    signatures: Vec<Signature>,
) -> FunctionDefinition {
    FunctionDefinition::new(name, kind)
        .with_locations(locations.iter().copied())
        .with_signatures(signatures)
}

/// Scalar available in EVAL only.
pub fn eval_fn(name: &str, signatures: Vec<Signature>) -> FunctionDefinition {
    function(name, FunctionKind::Scalar, &[Location::Eval], signatures)
}

/// Zero-argument function returning `keyword`.
pub fn nullary(name: &str, kind: FunctionKind, locations: &[Location]) -> FunctionDefinition {
    function(name, kind, locations, vec![sig(vec![], "keyword")])
}

/// The license-gated functions used by the licensing tests.
pub fn license_mocks() -> Vec<FunctionDefinition> {
    vec![
        function(
            "platinum_function_mock",
            FunctionKind::Grouping,
            &[Location::Stats, Location::StatsBy],
            vec![
                sig(vec![param("field", "keyword")], "keyword").with_license(LicenseTier::Platinum),
                sig(vec![param("field", "text")], "keyword").with_license(LicenseTier::Platinum),
            ],
        )
        .with_license(LicenseTier::Platinum),
        function(
            "platinum_partial_function_mock",
            FunctionKind::Agg,
            &[Location::Stats, Location::StatsBy],
            vec![
                sig(vec![param("field", "cartesian_point")], "cartesian_shape"),
                sig(vec![param("field", "cartesian_shape")], "cartesian_shape")
                    .with_license(LicenseTier::Platinum),
            ],
        ),
    ]
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Format diagnostics for display in assertion messages.
pub fn format_diagnostics(diags: &[Diag]) -> String {
    diags
        .iter()
        .map(|diag| format!("{:?}: {}", diag.severity, diag.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses and validates `source` against the test schema without a license
/// context.
pub fn validate_source(catalog: &FunctionCatalog, source: &str) -> ValidationOutcome {
    let schema = test_schema();
    let validator = Validator::new(catalog).with_schema(&schema);
    validate(source, &validator)
}

/// Parses and validates with a license context that holds (or lacks) PLATINUM.
pub fn validate_licensed(
    catalog: &FunctionCatalog,
    source: &str,
    has_platinum: bool,
) -> ValidationOutcome {
    let schema = test_schema();
    let license = move |tier: LicenseTier| {
        if has_platinum {
            true
        } else {
            tier < LicenseTier::Platinum
        }
    };
    let validator = Validator::new(catalog)
        .with_schema(&schema)
        .with_license(&license);
    validate(source, &validator)
}

pub fn validate_with_config(
    catalog: &FunctionCatalog,
    source: &str,
    config: ValidationConfig,
) -> ValidationOutcome {
    let schema = test_schema();
    let validator = Validator::new(catalog)
        .with_schema(&schema)
        .with_config(config);
    validate(source, &validator)
}

/// Asserts the exact error messages, in order.
#[track_caller]
pub fn expect_errors(catalog: &FunctionCatalog, source: &str, expected: &[&str]) {
    let outcome = validate_source(catalog, source);
    assert_eq!(
        outcome.error_messages(),
        expected,
        "source: {source}\ndiagnostics:\n{}",
        format_diagnostics(&outcome.diagnostics)
    );
}

/// Asserts the exact error and warning messages, in order.
#[track_caller]
pub fn expect_diagnostics(
    catalog: &FunctionCatalog,
    source: &str,
    errors: &[&str],
    warnings: &[&str],
) {
    let outcome = validate_source(catalog, source);
    let detail = format_diagnostics(&outcome.diagnostics);
    assert_eq!(outcome.error_messages(), errors, "source: {source}\n{detail}");
    assert_eq!(outcome.warning_messages(), warnings, "source: {source}\n{detail}");
}

/// Asserts that `source` parses without diagnostics.
#[track_caller]
pub fn assert_parses_cleanly(source: &str) {
    let result = parse(source);
    assert!(
        result.diagnostics.is_empty(),
        "source: {source}\n{}",
        format_diagnostics(&result.diagnostics)
    );
}
