//! Expression checking: column resolution, casts and function calls.

use tracing::trace;

use crate::ast::{Expression, FunctionCall, InlineCast, Literal};
use crate::semantic::catalog::{FunctionDefinition, FunctionKind, Location, Parameter};
use crate::semantic::diag::SemanticDiagBuilder;
use crate::semantic::types::{ExprType, FieldType};

use super::NestedAggregationPolicy;
use super::ValidationRun;
use super::scope_analysis::ColumnLookup;
use super::signature_matching::{MatchOutcome, match_signatures};
use super::type_inference::{is_constant, literal_type};

impl ValidationRun<'_, '_> {
    /// Checks `expr` as it appears in `location` and returns its type.
    pub(super) fn check_expression(&mut self, expr: &Expression, location: Location) -> ExprType {
        match expr {
            Expression::Literal(literal, _) => literal_type(literal),
            Expression::Column(name, span) => match self.scope.lookup(name) {
                ColumnLookup::Found(ty) => ty,
                ColumnLookup::Unchecked => ExprType::Unknown,
                ColumnLookup::Missing => {
                    self.push(SemanticDiagBuilder::unknown_column(name, span.clone()).build());
                    ExprType::Unknown
                }
            },
            Expression::Call(call) => self.check_call(call, location),
            Expression::InlineCast(cast) => self.check_cast(cast, location),
            Expression::List(items, _) => ExprType::Tuple(
                items
                    .iter()
                    .map(|item| self.check_expression(item, location))
                    .collect(),
            ),
            Expression::Wildcard(_) => ExprType::Wildcard,
        }
    }

    fn check_cast(&mut self, cast: &InlineCast, location: Location) -> ExprType {
        self.check_expression(&cast.expression, location);
        match FieldType::from_cast_name(&cast.target) {
            Some(ty) => ty.into(),
            None => {
                self.push(
                    SemanticDiagBuilder::invalid_cast(&cast.target, cast.target_span.clone())
                        .build(),
                );
                ExprType::Unknown
            }
        }
    }

    /// A call denied by its license keeps its resolved type for diagnostics
    /// but is unknown to the enclosing expression.
    fn check_call(&mut self, call: &FunctionCall, location: Location) -> ExprType {
        let (ty, licensed) = self.resolve_call(call, location);
        self.call_types
            .insert((call.span.start, call.span.end), ty.clone());
        if licensed { ty } else { ExprType::Unknown }
    }

    /// Returns the call's type and whether its license requirements hold.
    fn resolve_call(&mut self, call: &FunctionCall, location: Location) -> (ExprType, bool) {
        let catalog = self.validator.catalog;
        let name = call.lookup_name();

        let Some(definition) = catalog.lookup(&name) else {
            self.push(SemanticDiagBuilder::unknown_function(&name, call.span.clone()).build());
            for arg in &call.args {
                self.check_expression(arg, location);
            }
            return (ExprType::Unknown, true);
        };
        trace!(function = %definition.name, %location, "checking call");

        let mut licensed = true;
        if let Some(tier) = definition.license {
            if !self.license.allows(&definition.name, None, tier) {
                licensed = false;
                self.push(
                    SemanticDiagBuilder::license_required(&definition.name, tier, call.span.clone())
                        .build(),
                );
            }
        }

        let types: Vec<ExprType> = call
            .args
            .iter()
            .map(|arg| self.check_expression(arg, location))
            .collect();

        self.check_wildcards(definition, call);

        let (signature, result) = match match_signatures(definition, &call.args, &types) {
            MatchOutcome::Arity { expected } => {
                self.push(
                    SemanticDiagBuilder::arity_error(
                        &definition.name,
                        &expected,
                        call.args.len(),
                        call.span.clone(),
                    )
                    .build(),
                );
                return (ExprType::Unknown, licensed);
            }
            MatchOutcome::Mismatch {
                signature,
                positions,
            } => {
                self.report_mismatches(definition, signature, call, &types, &positions);
                (None, ExprType::Unknown)
            }
            MatchOutcome::Matched {
                signature,
                return_type,
            } => {
                self.check_constraints(definition, signature, call);
                (Some(signature), return_type)
            }
        };

        if !definition.is_available_in(location) {
            self.push(
                SemanticDiagBuilder::unsupported_location(
                    location.label(),
                    &definition.name,
                    call.span.clone(),
                )
                .build(),
            );
        }

        if definition.kind == FunctionKind::Agg {
            self.check_nested_aggregations(call);
        }

        if let Some(index) = signature {
            licensed &= self.check_signature_license(definition, index, call);
        }

        (result, licensed)
    }

    fn check_wildcards(&mut self, definition: &FunctionDefinition, call: &FunctionCall) {
        for (position, arg) in call.args.iter().enumerate() {
            let Expression::Wildcard(span) = arg else {
                continue;
            };
            let supported = definition.signatures.iter().any(|signature| {
                signature
                    .param_at(position)
                    .is_some_and(|param| param.supports_wildcard)
            });
            if !supported {
                self.push(
                    SemanticDiagBuilder::wildcard_not_allowed(&definition.name, span.clone())
                        .build(),
                );
            }
        }
    }

    fn report_mismatches(
        &mut self,
        definition: &FunctionDefinition,
        signature: usize,
        call: &FunctionCall,
        types: &[ExprType],
        positions: &[usize],
    ) {
        let Some(signature) = definition.signatures.get(signature) else {
            return;
        };
        for &position in positions {
            let (Some(param), Some(arg), Some(ty)) = (
                signature.param_at(position),
                call.args.get(position),
                types.get(position),
            ) else {
                continue;
            };
            let diag = SemanticDiagBuilder::type_mismatch(
                &definition.name,
                &param.param_type.to_string(),
                self.text(arg.span()),
                &ty.to_string(),
                arg.span().clone(),
            )
            .build();
            self.push(diag);
        }
    }

    /// Constant-only errors for every argument, then accepted-value warnings.
    fn check_constraints(
        &mut self,
        definition: &FunctionDefinition,
        signature: usize,
        call: &FunctionCall,
    ) {
        let Some(signature) = definition.signatures.get(signature) else {
            return;
        };
        let bound: Vec<(&Parameter, &Expression)> = call
            .args
            .iter()
            .enumerate()
            .filter_map(|(position, arg)| signature.param_at(position).map(|param| (param, arg)))
            .collect();

        for (param, arg) in &bound {
            if param.constant_only && !is_constant(arg) {
                let diag = SemanticDiagBuilder::constant_required(
                    &definition.name,
                    self.text(arg.span()),
                    arg.span().clone(),
                )
                .build();
                self.push(diag);
            }
        }

        for (param, arg) in &bound {
            let (Some(accepted), Expression::Literal(Literal::String(value), span)) =
                (&param.accepted_values, arg)
            else {
                continue;
            };
            if accepted
                .iter()
                .any(|option| option.eq_ignore_ascii_case(value))
            {
                continue;
            }
            let options: Vec<&str> = accepted.iter().map(|option| option.as_str()).collect();
            self.push(
                SemanticDiagBuilder::invalid_option(&definition.name, value, &options, span.clone())
                    .build(),
            );
        }
    }

    fn check_nested_aggregations(&mut self, call: &FunctionCall) {
        let policy = self.validator.config.nested_aggregation;
        for arg in &call.args {
            let Some(inner) = self.find_aggregation(arg, policy) else {
                continue;
            };
            let ty = self
                .call_types
                .get(&(inner.span.start, inner.span.end))
                .cloned()
                .unwrap_or(ExprType::Unknown);
            let diag = SemanticDiagBuilder::nested_aggregation(
                self.text(&inner.span),
                &ty.to_string(),
                inner.span.clone(),
            )
            .build();
            self.push(diag);
        }
    }

    /// First aggregation call in `expr`, in source order.
    fn find_aggregation<'e>(
        &self,
        expr: &'e Expression,
        policy: NestedAggregationPolicy,
    ) -> Option<&'e FunctionCall> {
        let transitive = policy == NestedAggregationPolicy::Transitive;
        match expr {
            Expression::Call(call) => {
                if self.is_aggregation(call) {
                    Some(call)
                } else if transitive {
                    call.args
                        .iter()
                        .find_map(|arg| self.find_aggregation(arg, policy))
                } else {
                    None
                }
            }
            Expression::InlineCast(cast) if transitive => {
                self.find_aggregation(&cast.expression, policy)
            }
            Expression::List(items, _) if transitive => items
                .iter()
                .find_map(|item| self.find_aggregation(item, policy)),
            _ => None,
        }
    }

    pub(super) fn is_aggregation(&self, call: &FunctionCall) -> bool {
        self.validator
            .catalog
            .lookup(&call.name)
            .is_some_and(|definition| definition.kind == FunctionKind::Agg)
    }

    /// Whether any call inside `expr` is an aggregation.
    pub(super) fn contains_aggregation(&self, expr: &Expression) -> bool {
        match expr {
            Expression::Call(call) => {
                self.is_aggregation(call)
                    || call.args.iter().any(|arg| self.contains_aggregation(arg))
            }
            Expression::InlineCast(cast) => self.contains_aggregation(&cast.expression),
            Expression::List(items, _) => items.iter().any(|item| self.contains_aggregation(item)),
            Expression::Literal(..) | Expression::Column(..) | Expression::Wildcard(_) => false,
        }
    }

    /// Returns false when the matched signature's license is denied.
    fn check_signature_license(
        &mut self,
        definition: &FunctionDefinition,
        index: usize,
        call: &FunctionCall,
    ) -> bool {
        let Some(signature) = definition.signatures.get(index) else {
            return true;
        };
        let Some(tier) = signature.license else {
            return true;
        };
        // Already covered by the definition-level check.
        if definition.license.is_some_and(|required| required >= tier) {
            return true;
        }
        if self.license.allows(&definition.name, Some(index), tier) {
            return true;
        }

        let diag = match gated_parameter(definition, index) {
            Some(param) => SemanticDiagBuilder::parameter_license_required(
                &definition.name,
                &param.name,
                &param.param_type.to_string(),
                tier,
                call.span.clone(),
            ),
            None => {
                SemanticDiagBuilder::license_required(&definition.name, tier, call.span.clone())
            }
        };
        self.push(diag.build());
        false
    }
}

/// The parameter that distinguishes a licensed signature from the unlicensed
/// ones: the first whose type no unlicensed signature declares at that
/// position, else the first parameter.
fn gated_parameter(definition: &FunctionDefinition, index: usize) -> Option<&Parameter> {
    let signature = definition.signatures.get(index)?;
    let ungated: Vec<_> = definition
        .signatures
        .iter()
        .filter(|other| other.license.is_none())
        .collect();

    signature
        .params
        .iter()
        .enumerate()
        .find(|(position, param)| {
            !ungated.iter().any(|other| {
                other
                    .param_at(*position)
                    .is_some_and(|candidate| candidate.param_type == param.param_type)
            })
        })
        .map(|(_, param)| param)
        .or_else(|| signature.params.first())
}
