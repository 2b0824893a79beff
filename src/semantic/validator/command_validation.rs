//! Command-level checks and column scope transitions.

use smol_str::SmolStr;
use tracing::trace;

use crate::ast::{Command, Expression, Field, Query, Span, Spanned};
use crate::semantic::catalog::Location;
use crate::semantic::diag::SemanticDiagBuilder;
use crate::semantic::types::ExprType;

use super::ValidationRun;
use super::scope_analysis::ColumnScope;

impl ValidationRun<'_, '_> {
    pub(super) fn validate_commands(&mut self, query: &Query) {
        for command in &query.commands {
            trace!(command = command.name(), "validating command");
            self.validate_command(command);
        }
    }

    fn validate_command(&mut self, command: &Command) {
        match command {
            Command::From { .. } => {
                self.scope = match self.validator.schema {
                    Some(schema) => ColumnScope::closed(
                        schema
                            .fields()
                            .into_iter()
                            .map(|(name, ty)| (name, ExprType::Field(ty)))
                            .collect(),
                    ),
                    None => ColumnScope::open(),
                };
            }
            Command::Row { fields, .. } => {
                self.scope = ColumnScope::closed(Vec::new());
                self.define_fields(fields, Location::Row);
            }
            Command::Eval { fields, .. } => self.define_fields(fields, Location::Eval),
            Command::Where { condition, .. } => {
                self.check_expression(condition, Location::Where);
            }
            Command::Stats {
                aggregates,
                by,
                span,
            } => self.validate_stats(aggregates, by, span),
            Command::Sort { items, .. } => {
                for item in items {
                    self.check_expression(&item.expression, Location::Sort);
                }
            }
            Command::Limit { .. } => {}
            Command::Keep { columns, .. } => {
                self.check_column_patterns(columns);
                let patterns: Vec<&str> = columns.iter().map(|c| c.node.as_str()).collect();
                self.scope.keep(&patterns);
            }
            Command::Drop { columns, .. } => {
                self.check_column_patterns(columns);
                let patterns: Vec<&str> = columns.iter().map(|c| c.node.as_str()).collect();
                self.scope.drop_matching(&patterns);
            }
        }
    }

    /// Checks a field and returns the type of the column it defines; unknown
    /// when checking it raised errors.
    fn check_field(&mut self, field: &Field, location: Location) -> ExprType {
        let errors = self.error_count();
        let ty = self.check_expression(&field.expression, location);
        if self.error_count() > errors {
            ExprType::Unknown
        } else {
            ty
        }
    }

    /// Name of the column a field defines.
    fn output_name(&self, field: &Field) -> SmolStr {
        match (&field.target, &field.expression) {
            (Some(target), _) => target.node.clone(),
            (None, Expression::Column(name, _)) => name.clone(),
            (None, expression) => SmolStr::new(self.text(expression.span())),
        }
    }

    fn define_fields(&mut self, fields: &[Field], location: Location) {
        for field in fields {
            let ty = self.check_field(field, location);
            let name = self.output_name(field);
            self.scope.define(name, ty);
        }
    }

    fn validate_stats(&mut self, aggregates: &[Field], by: &[Field], span: &Span) {
        if aggregates.is_empty() && by.is_empty() {
            self.push(SemanticDiagBuilder::empty_stats(span.clone()).build());
        }

        let mut outputs = Vec::with_capacity(aggregates.len() + by.len());
        for field in aggregates {
            if !self.contains_aggregation(&field.expression) {
                let expression = &field.expression;
                self.push(
                    SemanticDiagBuilder::missing_aggregation(
                        self.text(expression.span()),
                        expression.span().clone(),
                    )
                    .build(),
                );
            }
            let ty = self.check_field(field, Location::Stats);
            outputs.push((self.output_name(field), ty));
        }
        for field in by {
            let ty = self.check_field(field, Location::StatsBy);
            outputs.push((self.output_name(field), ty));
        }

        let mut scope = ColumnScope::closed(Vec::new());
        for (name, ty) in outputs {
            scope.define(name, ty);
        }
        self.scope = scope;
    }

    /// Plain names must exist; patterns containing `*` may match nothing.
    fn check_column_patterns(&mut self, columns: &[Spanned<SmolStr>]) {
        if self.scope.is_open() {
            return;
        }
        for column in columns {
            if column.node.contains('*') || self.scope.contains(&column.node) {
                continue;
            }
            self.push(
                SemanticDiagBuilder::unknown_column(&column.node, column.span.clone()).build(),
            );
        }
    }
}
