//! Function signature catalog.
//!
//! A [`FunctionCatalog`] is an explicit, read-only value handed to the
//! validator. Catalogs are built in code, deserialized from JSON, or taken from
//! [`FunctionCatalog::builtin`] and overlaid with extra definitions whose names
//! shadow the built-ins.

use crate::semantic::builtin::builtin_definitions;
use crate::semantic::license::LicenseTier;
use crate::semantic::types::ParamType;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Errors
// ============================================================================

/// Fatal problems with catalog definitions.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("function definition has an empty name")]
    EmptyName,

    #[error("function [{name}] has no signatures")]
    NoSignatures { name: SmolStr },

    #[error("signature {index} of function [{name}] sets minParams but declares no parameters")]
    MinParamsWithoutParams { name: SmolStr, index: usize },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Scalar,
    Agg,
    Operator,
    Grouping,
}

/// Command contexts that may host a function call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Eval,
    Where,
    Sort,
    Row,
    Stats,
    StatsBy,
}

impl Location {
    pub const ALL: [Location; 6] = [
        Location::Eval,
        Location::Where,
        Location::Sort,
        Location::Row,
        Location::Stats,
        Location::StatsBy,
    ];

    /// Command label used in location diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Location::Eval => "EVAL",
            Location::Where => "WHERE",
            Location::Sort => "SORT",
            Location::Row => "ROW",
            Location::Stats => "STATS",
            Location::StatsBy => "STATS BY",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One declared parameter of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub constant_only: bool,
    #[serde(default)]
    pub supports_wildcard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_values: Option<Vec<SmolStr>>,
}

impl Parameter {
    pub fn new(name: impl Into<SmolStr>, param_type: impl Into<ParamType>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            optional: false,
            constant_only: false,
            supports_wildcard: false,
            accepted_values: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn constant_only(mut self) -> Self {
        self.constant_only = true;
        self
    }

    pub fn supports_wildcard(mut self) -> Self {
        self.supports_wildcard = true;
        self
    }

    pub fn with_accepted_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.accepted_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// One overload of a function.
///
/// With `min_params` set the signature is variadic: the last declared
/// parameter repeats and at least `min_params` arguments are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_params: Option<usize>,
    pub return_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseTier>,
}

impl Signature {
    pub fn new(params: Vec<Parameter>, return_type: impl Into<ParamType>) -> Self {
        Self {
            params,
            min_params: None,
            return_type: return_type.into(),
            license: None,
        }
    }

    pub fn with_min_params(mut self, min_params: usize) -> Self {
        self.min_params = Some(min_params);
        self
    }

    pub fn with_license(mut self, tier: LicenseTier) -> Self {
        self.license = Some(tier);
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.min_params.is_some()
    }

    /// Returns the minimum number of arguments.
    pub fn min_arity(&self) -> usize {
        self.min_params
            .unwrap_or_else(|| self.params.iter().filter(|p| !p.optional).count())
    }

    /// Returns the maximum number of arguments (`None` if variadic).
    pub fn max_arity(&self) -> Option<usize> {
        if self.is_variadic() {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn matches_arity(&self, arg_count: usize) -> bool {
        arg_count >= self.min_arity() && self.max_arity().is_none_or(|max| arg_count <= max)
    }

    /// Parameter bound to argument `position`; variadic tails reuse the last one.
    pub fn param_at(&self, position: usize) -> Option<&Parameter> {
        match self.params.get(position) {
            Some(param) => Some(param),
            None if self.is_variadic() => self.params.last(),
            None => None,
        }
    }
}

fn all_locations() -> BTreeSet<Location> {
    Location::ALL.into_iter().collect()
}

/// A named function with its overloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    pub signatures: Vec<Signature>,
    #[serde(default = "all_locations")]
    pub locations_available: BTreeSet<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseTier>,
}

impl FunctionDefinition {
    /// Creates a definition available in every location.
    pub fn new(name: impl Into<SmolStr>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            signatures: Vec::new(),
            locations_available: all_locations(),
            license: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn with_signatures(mut self, signatures: impl IntoIterator<Item = Signature>) -> Self {
        self.signatures.extend(signatures);
        self
    }

    /// Restricts the definition to `locations`.
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = Location>) -> Self {
        self.locations_available = locations.into_iter().collect();
        self
    }

    pub fn with_license(mut self, tier: LicenseTier) -> Self {
        self.license = Some(tier);
        self
    }

    pub fn is_available_in(&self, location: Location) -> bool {
        self.locations_available.contains(&location)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if self.signatures.is_empty() {
            return Err(CatalogError::NoSignatures {
                name: self.name.clone(),
            });
        }
        for (index, signature) in self.signatures.iter().enumerate() {
            if signature.min_params.is_some() && signature.params.is_empty() {
                return Err(CatalogError::MinParamsWithoutParams {
                    name: self.name.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Registry of function definitions keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    functions: BTreeMap<SmolStr, FunctionDefinition>,
}

impl FunctionCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a catalog from definitions. Later definitions replace earlier
    /// ones with the same name.
    pub fn new(
        definitions: impl IntoIterator<Item = FunctionDefinition>,
    ) -> Result<Self, CatalogError> {
        Self::empty().with_functions(definitions)
    }

    /// The built-in operators, scalar, aggregation and grouping functions.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for definition in builtin_definitions() {
            catalog.insert(definition);
        }
        debug!(functions = catalog.len(), "built-in catalog loaded");
        catalog
    }

    /// Overlays `definitions`, shadowing existing functions of the same name.
    pub fn with_functions(
        mut self,
        definitions: impl IntoIterator<Item = FunctionDefinition>,
    ) -> Result<Self, CatalogError> {
        for definition in definitions {
            definition.validate()?;
            self.insert(definition);
        }
        Ok(self)
    }

    /// Parses a JSON array of function definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<FunctionDefinition> = serde_json::from_str(json)?;
        debug!(functions = definitions.len(), "catalog parsed from JSON");
        Self::new(definitions)
    }

    /// Overlays definitions parsed from a JSON array.
    pub fn with_json(self, json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<FunctionDefinition> = serde_json::from_str(json)?;
        self.with_functions(definitions)
    }

    fn insert(&mut self, mut definition: FunctionDefinition) {
        let key = SmolStr::new(definition.name.to_lowercase());
        definition.name = key.clone();
        if self.functions.insert(key, definition).is_some() {
            debug!("function definition shadowed");
        }
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&FunctionDefinition> {
        match self.functions.get(name) {
            Some(definition) => Some(definition),
            None => self.functions.get(name.to_lowercase().as_str()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.functions.values()
    }
}
