//! Semantic diagnostic kinds and the constructors for every validator message.
//!
//! Message texts are stable: hosts and tests compare them verbatim.

use crate::ast::Span;
use crate::diag::{Diag, DiagLabel, DiagSeverity};
use crate::lexer::SYNTAX_ERROR_CODE;
use crate::semantic::license::LicenseTier;

/// Categories of validation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticDiagKind {
    /// Lexer or parser failure.
    SyntaxError,
    /// No signature accepts the argument count.
    ArityError,
    /// An argument does not fit the best-matching signature.
    TypeMismatch,
    /// A constant-only parameter received a column-dependent value.
    ConstantRequired,
    /// A string literal outside a parameter's accepted values.
    InvalidOption,
    /// Function used in a command that does not support it.
    UnsupportedLocation,
    /// STATS expression without an aggregation.
    MissingAggregation,
    /// Aggregation inside another aggregation's arguments.
    NestedAggregation,
    LicenseRequired,
    UnknownColumn,
    UnknownFunction,
    WildcardNotAllowed,
    InvalidCast,
}

impl SemanticDiagKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::SyntaxError => "SyntaxError",
            Self::ArityError => "ArityError",
            Self::TypeMismatch => "TypeMismatch",
            Self::ConstantRequired => "ConstantRequired",
            Self::InvalidOption => "InvalidOption",
            Self::UnsupportedLocation => "UnsupportedLocation",
            Self::MissingAggregation => "MissingAggregation",
            Self::NestedAggregation => "NestedAggregation",
            Self::LicenseRequired => "LicenseRequired",
            Self::UnknownColumn => "UnknownColumn",
            Self::UnknownFunction => "UnknownFunction",
            Self::WildcardNotAllowed => "WildcardNotAllowed",
            Self::InvalidCast => "InvalidCast",
        }
    }

    /// Code attached to [`Diag::code`] for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::SyntaxError => SYNTAX_ERROR_CODE,
            Self::ArityError => "esql::arity_error",
            Self::TypeMismatch => "esql::type_mismatch",
            Self::ConstantRequired => "esql::constant_required",
            Self::InvalidOption => "esql::invalid_option",
            Self::UnsupportedLocation => "esql::unsupported_location",
            Self::MissingAggregation => "esql::missing_aggregation",
            Self::NestedAggregation => "esql::nested_aggregation",
            Self::LicenseRequired => "esql::license_required",
            Self::UnknownColumn => "esql::unknown_column",
            Self::UnknownFunction => "esql::unknown_function",
            Self::WildcardNotAllowed => "esql::wildcard_not_allowed",
            Self::InvalidCast => "esql::invalid_cast",
        }
    }

    /// Recovers the kind from a diagnostic code.
    pub fn from_code(code: &str) -> Option<Self> {
        const KINDS: [SemanticDiagKind; 13] = [
            SemanticDiagKind::SyntaxError,
            SemanticDiagKind::ArityError,
            SemanticDiagKind::TypeMismatch,
            SemanticDiagKind::ConstantRequired,
            SemanticDiagKind::InvalidOption,
            SemanticDiagKind::UnsupportedLocation,
            SemanticDiagKind::MissingAggregation,
            SemanticDiagKind::NestedAggregation,
            SemanticDiagKind::LicenseRequired,
            SemanticDiagKind::UnknownColumn,
            SemanticDiagKind::UnknownFunction,
            SemanticDiagKind::WildcardNotAllowed,
            SemanticDiagKind::InvalidCast,
        ];
        KINDS.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns the kind recorded on `diag`, if any.
    pub fn of(diag: &Diag) -> Option<Self> {
        diag.code.as_deref().and_then(Self::from_code)
    }
}

/// Builder for semantic diagnostics.
pub struct SemanticDiagBuilder {
    kind: SemanticDiagKind,
    message: String,
    labels: Vec<DiagLabel>,
    notes: Vec<String>,
    severity: DiagSeverity,
}

impl SemanticDiagBuilder {
    pub fn new(kind: SemanticDiagKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            severity: DiagSeverity::Error,
        }
    }

    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::primary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_severity(mut self, severity: DiagSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn build(self) -> Diag {
        let mut diag = Diag::new(self.severity, self.message).with_code(self.kind.code());
        for label in self.labels {
            diag = diag.with_label(label);
        }
        for note in self.notes {
            diag = diag.with_note(note);
        }
        diag
    }
}

/// Constructors for each validator message.
impl SemanticDiagBuilder {
    /// `phrase` is the expectation, e.g. `at least one argument`.
    pub fn arity_error(function: &str, phrase: &str, got: usize, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::ArityError,
            format!("Error: [{function}] function expects {phrase}, got {got}."),
        )
        .with_primary_label(span, "wrong number of arguments")
    }

    pub fn type_mismatch(
        function: &str,
        expected: &str,
        source: &str,
        actual: &str,
        span: Span,
    ) -> Self {
        Self::new(
            SemanticDiagKind::TypeMismatch,
            format!(
                "Argument of [{function}] must be [{expected}], found value [{source}] type [{actual}]"
            ),
        )
        .with_primary_label(span, format!("expected {expected}"))
    }

    pub fn constant_required(function: &str, source: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::ConstantRequired,
            format!("Argument of [{function}] must be a constant, received [{source}]"),
        )
        .with_primary_label(span, "not a constant")
    }

    pub fn invalid_option(function: &str, value: &str, accepted: &[&str], span: Span) -> Self {
        Self::new(
            SemanticDiagKind::InvalidOption,
            format!(
                "Invalid option [\"{value}\"] for {function}. Supported options: [\"{}\"].",
                accepted.join("\", \"")
            ),
        )
        .with_primary_label(span, "unsupported option")
        .with_severity(DiagSeverity::Warning)
    }

    pub fn unsupported_location(command: &str, function: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::UnsupportedLocation,
            format!("{command} does not support function {function}"),
        )
        .with_primary_label(span, format!("not allowed in {command}"))
    }

    pub fn missing_aggregation(source: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::MissingAggregation,
            format!("At least one aggregation function required in [STATS], found [{source}]"),
        )
        .with_primary_label(span, "no aggregation function")
    }

    pub fn empty_stats(span: Span) -> Self {
        Self::new(
            SemanticDiagKind::MissingAggregation,
            "At least one aggregation or grouping expression required in [STATS]",
        )
        .with_primary_label(span, "empty STATS")
    }

    pub fn nested_aggregation(source: &str, ty: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::NestedAggregation,
            format!(
                "Aggregate function's parameters must be an attribute, literal or a non-aggregation function; found [{source}] of type [{ty}]"
            ),
        )
        .with_primary_label(span, "nested aggregation")
    }

    pub fn license_required(function: &str, tier: LicenseTier, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::LicenseRequired,
            format!("{} requires a {tier} license.", function.to_uppercase()),
        )
        .with_primary_label(span, format!("requires {tier}"))
    }

    pub fn parameter_license_required(
        function: &str,
        param: &str,
        param_type: &str,
        tier: LicenseTier,
        span: Span,
    ) -> Self {
        Self::new(
            SemanticDiagKind::LicenseRequired,
            format!(
                "{} with '{param}' of type '{param_type}' requires a {tier} license.",
                function.to_uppercase()
            ),
        )
        .with_primary_label(span, format!("requires {tier}"))
    }

    pub fn unknown_column(name: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::UnknownColumn,
            format!("Unknown column [{name}]"),
        )
        .with_primary_label(span, "not found")
    }

    pub fn unknown_function(name: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::UnknownFunction,
            format!("Unknown function [{name}]"),
        )
        .with_primary_label(span, "not found in the function catalog")
    }

    pub fn wildcard_not_allowed(function: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::WildcardNotAllowed,
            format!("Using wildcards (*) in {function} is not allowed"),
        )
        .with_primary_label(span, "wildcard")
    }

    pub fn invalid_cast(target: &str, span: Span) -> Self {
        Self::new(
            SemanticDiagKind::InvalidCast,
            format!("Unknown inline cast type [{target}]"),
        )
        .with_primary_label(span, "unknown type")
    }
}
