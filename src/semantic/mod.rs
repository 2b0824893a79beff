//! Semantic validation for ES|QL queries.
//!
//! Validation goes beyond syntax checking:
//! - Function resolution against a [`FunctionCatalog`] with overloads
//! - Arity and argument type checking, including implicit coercions
//! - Constant-only and accepted-value parameter constraints
//! - Command location rules and nested-aggregation detection
//! - License gating of functions and individual signatures
//! - Column resolution against the index schema and user-defined columns
//!
//! # Example
//!
//! ```
//! use esql_validator::parse;
//! use esql_validator::semantic::{FieldType, FunctionCatalog, InMemorySchema, Validator};
//!
//! let catalog = FunctionCatalog::builtin();
//! let schema = InMemorySchema::new().with_field("bytes", FieldType::Long);
//!
//! let source = "FROM logs | EVAL kb = bytes / 1024 | WHERE kb > 10";
//! let parsed = parse(source);
//! let outcome = Validator::new(&catalog)
//!     .with_schema(&schema)
//!     .validate(&parsed.query, source);
//! assert!(outcome.is_clean());
//! ```

mod builtin;
pub mod catalog;
pub mod diag;
pub mod license;
pub mod schema;
pub mod types;
pub mod validator;

pub use catalog::{
    CatalogError, FunctionCatalog, FunctionDefinition, FunctionKind, Location, Parameter,
    Signature,
};
pub use diag::{SemanticDiagBuilder, SemanticDiagKind};
pub use license::{LicenseContext, LicenseTier, StaticLicense, UnknownLicenseTier};
pub use schema::{FieldSchema, InMemorySchema};
pub use types::{ExprType, FieldType, ParamType, TypeParseError};
pub use validator::{
    NestedAggregationPolicy, ValidationConfig, ValidationOutcome, Validator,
};
