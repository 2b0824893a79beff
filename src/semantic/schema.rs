//! Index field schema consulted by `FROM`.

use crate::semantic::types::FieldType;
use serde::Deserialize;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// Field names and types of the indices a query reads from.
pub trait FieldSchema: Send + Sync {
    /// Every field, in the order columns become visible after `FROM`.
    fn fields(&self) -> Vec<(SmolStr, FieldType)>;
}

/// A schema held in memory, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemorySchema {
    fields: Vec<(SmolStr, FieldType)>,
}

impl InMemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, name: impl Into<SmolStr>, ty: FieldType) -> Self {
        self.insert(name, ty);
        self
    }

    pub fn insert(&mut self, name: impl Into<SmolStr>, ty: FieldType) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = ty,
            None => self.fields.push((name, ty)),
        }
    }

    /// Parses a `{"field": "type", ...}` JSON mapping.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mapping: BTreeMap<SmolStr, FieldType> = serde_json::from_str(json)?;
        Ok(mapping.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<N: Into<SmolStr>> FromIterator<(N, FieldType)> for InMemorySchema {
    fn from_iter<I: IntoIterator<Item = (N, FieldType)>>(iter: I) -> Self {
        let mut schema = InMemorySchema::new();
        for (name, ty) in iter {
            schema.insert(name, ty);
        }
        schema
    }
}

impl<'de> Deserialize<'de> for InMemorySchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let mapping = BTreeMap::<SmolStr, FieldType>::deserialize(deserializer)?;
        Ok(mapping.into_iter().collect())
    }
}

impl FieldSchema for InMemorySchema {
    fn fields(&self) -> Vec<(SmolStr, FieldType)> {
        self.fields.clone()
    }
}
