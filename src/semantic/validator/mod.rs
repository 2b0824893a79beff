//! Semantic validator for parsed ES|QL queries.
//!
//! A run walks commands top to bottom while maintaining the visible column
//! scope. Every expression is checked depth first, so inner calls are resolved
//! before their types feed the enclosing call. Diagnostics accumulate in
//! traversal order; validation never stops at the first problem.
//!
//! The per-call order is fixed:
//!
//! 1. unknown function and definition license
//! 2. arguments, recursively
//! 3. wildcard arguments
//! 4. arity, or per-argument type mismatches
//! 5. constant-only and accepted-value constraints
//! 6. command location
//! 7. nested aggregations
//! 8. signature license

mod call_validation;
mod command_validation;
mod scope_analysis;
mod signature_matching;
mod type_inference;

use std::collections::HashMap;

use miette::Report;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::ast::{Query, Span};
use crate::diag::{Diag, DiagSeverity, SourceFile, convert_diagnostics_to_reports};
use crate::semantic::catalog::FunctionCatalog;
use crate::semantic::diag::SemanticDiagKind;
use crate::semantic::license::{LicenseContext, LicenseGate};
use crate::semantic::schema::FieldSchema;
use crate::semantic::types::ExprType;

use scope_analysis::ColumnScope;

/// How far the nested-aggregation check looks into an aggregation's arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedAggregationPolicy {
    /// Only an argument that is itself an aggregation call is reported.
    Direct,
    /// Aggregations wrapped in scalar functions or operators are reported too.
    #[default]
    Transitive,
}

/// Configuration for semantic validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidationConfig {
    /// Consult the license context for gated functions and signatures.
    pub check_licenses: bool,

    /// Policy for aggregations nested inside aggregation arguments.
    pub nested_aggregation: NestedAggregationPolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_licenses: true,
            nested_aggregation: NestedAggregationPolicy::default(),
        }
    }
}

impl ValidationConfig {
    pub fn with_license_checks(mut self, enabled: bool) -> Self {
        self.check_licenses = enabled;
        self
    }

    pub fn with_nested_aggregation(mut self, policy: NestedAggregationPolicy) -> Self {
        self.nested_aggregation = policy;
        self
    }

    /// Parses a configuration; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Outcome of semantic validation, always carrying diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// All diagnostics in traversal order.
    pub diagnostics: Vec<Diag>,
}

impl ValidationOutcome {
    pub fn new(diagnostics: Vec<Diag>) -> Self {
        Self { diagnostics }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diag> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == DiagSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diag> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == DiagSeverity::Warning)
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.errors().map(|diag| diag.message.as_str()).collect()
    }

    pub fn warning_messages(&self) -> Vec<&str> {
        self.warnings().map(|diag| diag.message.as_str()).collect()
    }

    /// Every message, errors and warnings interleaved in traversal order.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|diag| diag.message.as_str())
            .collect()
    }

    pub fn of_kind(&self, kind: SemanticDiagKind) -> impl Iterator<Item = &Diag> {
        self.diagnostics
            .iter()
            .filter(move |diag| diag.code.as_deref() == Some(kind.code()))
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Renders the diagnostics as miette reports against `source`.
    pub fn reports(&self, source: &str) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, &SourceFile::new(source))
    }
}

/// Validates queries against a function catalog, an optional index schema and
/// an optional license context.
///
/// The validator holds only shared references; each call to
/// [`Validator::validate`] owns its diagnostics and license answers, so one
/// validator can serve concurrent runs.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a FunctionCatalog,
    schema: Option<&'a dyn FieldSchema>,
    license: Option<&'a dyn LicenseContext>,
    config: ValidationConfig,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a FunctionCatalog) -> Self {
        Self {
            catalog,
            schema: None,
            license: None,
            config: ValidationConfig::default(),
        }
    }

    /// Sets the schema `FROM` exposes. Without one, column references are
    /// not checked.
    pub fn with_schema(mut self, schema: &'a dyn FieldSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the license context. Without one, license checks are skipped.
    pub fn with_license(mut self, license: &'a dyn LicenseContext) -> Self {
        self.license = Some(license);
        self
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &'a FunctionCatalog {
        self.catalog
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates `query`; `source` is the text its spans point into.
    #[instrument(skip_all, fields(commands = query.commands.len()))]
    pub fn validate(&self, query: &Query, source: &str) -> ValidationOutcome {
        debug!(functions = self.catalog.len(), "starting validation");

        let license = if self.config.check_licenses {
            self.license
        } else {
            None
        };
        let mut run = ValidationRun {
            validator: *self,
            source,
            scope: ColumnScope::open(),
            license: LicenseGate::new(license),
            call_types: HashMap::new(),
            diagnostics: Vec::new(),
        };
        run.validate_commands(query);

        debug!(diagnostics = run.diagnostics.len(), "validation finished");
        ValidationOutcome::new(run.diagnostics)
    }
}

/// Mutable state of a single validation run.
struct ValidationRun<'a, 's> {
    validator: Validator<'a>,
    source: &'s str,
    scope: ColumnScope,
    license: LicenseGate<'a>,
    /// Resolved types of calls, keyed by span, for nested-aggregation messages.
    call_types: HashMap<(usize, usize), ExprType>,
    diagnostics: Vec<Diag>,
}

impl<'s> ValidationRun<'_, 's> {
    fn text(&self, span: &Span) -> &'s str {
        crate::ast::span_text(self.source, span)
    }

    fn push(&mut self, diag: Diag) {
        self.diagnostics.push(diag);
    }

    fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == DiagSeverity::Error)
            .count()
    }
}
