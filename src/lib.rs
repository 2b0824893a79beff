//! ES|QL parser and semantic validator with rich diagnostics.
//!
//! The crate lexes and parses ES|QL pipelines, then type-checks them against a
//! function catalog: overload resolution, argument constraints, command
//! locations, aggregation rules and license gating. Diagnostics render through
//! miette.
//!
//! # Example
//!
//! ```
//! use esql_validator::semantic::{FunctionCatalog, Validator};
//! use esql_validator::validate;
//!
//! let catalog = FunctionCatalog::builtin();
//! let validator = Validator::new(&catalog);
//!
//! let outcome = validate("ROW a = 1 | EVAL b = ABS(a) + 1.5", &validator);
//! assert!(outcome.is_clean());
//!
//! let outcome = validate("ROW a = 1 | EVAL LENGTH(a)", &validator);
//! assert_eq!(
//!     outcome.error_messages(),
//!     vec!["Argument of [length] must be [keyword], found value [a] type [integer]"]
//! );
//! ```

pub mod ast;
pub mod diag;
pub mod lexer;
pub mod parser;
pub mod semantic;

// Re-export syntax span primitives.
pub use ast::{Span, Spanned};

pub use diag::{Diag, DiagLabel, DiagSeverity, LabelRole, SourceFile};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use parser::{ParseResult, Parser, parse};
pub use semantic::{ValidationOutcome, Validator};

/// Parses and validates `source`. Syntax diagnostics come first, followed by
/// the semantic diagnostics of whatever parsed.
pub fn validate(source: &str, validator: &Validator<'_>) -> ValidationOutcome {
    let parsed = parse(source);
    let mut diagnostics = parsed.diagnostics;
    diagnostics.extend(validator.validate(&parsed.query, source).diagnostics);
    ValidationOutcome::new(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{FunctionCatalog, SemanticDiagKind};

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _spanned = Spanned::new(42, 0..5);
    }

    #[test]
    fn syntax_errors_precede_semantic_ones() {
        let catalog = FunctionCatalog::builtin();
        let validator = Validator::new(&catalog);
        let outcome = validate("ROW a = LENGTH(1) | EVAL # | EVAL b = c", &validator);

        let kinds: Vec<_> = outcome
            .diagnostics
            .iter()
            .filter_map(SemanticDiagKind::of)
            .collect();
        assert_eq!(kinds.first(), Some(&SemanticDiagKind::SyntaxError));
        assert!(kinds.contains(&SemanticDiagKind::TypeMismatch));
        assert!(kinds.contains(&SemanticDiagKind::UnknownColumn));
    }
}
