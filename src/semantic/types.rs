//! The type lattice shared by catalog parameters, schema fields and resolved
//! expression types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Concrete data types of index fields and function values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Long,
    UnsignedLong,
    Double,
    Keyword,
    Text,
    Boolean,
    Date,
    DateNanos,
    DatePeriod,
    TimeDuration,
    Ip,
    Version,
    GeoPoint,
    GeoShape,
    CartesianPoint,
    CartesianShape,
}

impl FieldType {
    pub const ALL: [FieldType; 17] = [
        FieldType::Integer,
        FieldType::Long,
        FieldType::UnsignedLong,
        FieldType::Double,
        FieldType::Keyword,
        FieldType::Text,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::DateNanos,
        FieldType::DatePeriod,
        FieldType::TimeDuration,
        FieldType::Ip,
        FieldType::Version,
        FieldType::GeoPoint,
        FieldType::GeoShape,
        FieldType::CartesianPoint,
        FieldType::CartesianShape,
    ];

    /// Name as it appears in diagnostics and catalog JSON.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::UnsignedLong => "unsigned_long",
            FieldType::Double => "double",
            FieldType::Keyword => "keyword",
            FieldType::Text => "text",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateNanos => "date_nanos",
            FieldType::DatePeriod => "date_period",
            FieldType::TimeDuration => "time_duration",
            FieldType::Ip => "ip",
            FieldType::Version => "version",
            FieldType::GeoPoint => "geo_point",
            FieldType::GeoShape => "geo_shape",
            FieldType::CartesianPoint => "cartesian_point",
            FieldType::CartesianShape => "cartesian_shape",
        }
    }

    pub fn is_string(self) -> bool {
        matches!(self, FieldType::Keyword | FieldType::Text)
    }

    /// `text` and `keyword` values are interchangeable.
    pub fn is_compatible_with(self, expected: FieldType) -> bool {
        self == expected || (self.is_string() && expected.is_string())
    }

    /// Maps an inline-cast target (`::INT`, `::datetime`, ...) to a type.
    pub fn from_cast_name(name: &str) -> Option<FieldType> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "int" | "integer" => FieldType::Integer,
            "long" => FieldType::Long,
            "unsigned_long" => FieldType::UnsignedLong,
            "double" => FieldType::Double,
            "string" | "keyword" => FieldType::Keyword,
            "text" => FieldType::Text,
            "bool" | "boolean" => FieldType::Boolean,
            "date" | "datetime" => FieldType::Date,
            "date_nanos" => FieldType::DateNanos,
            "date_period" => FieldType::DatePeriod,
            "time_duration" => FieldType::TimeDuration,
            "ip" => FieldType::Ip,
            "version" => FieldType::Version,
            "geo_point" => FieldType::GeoPoint,
            "geo_shape" => FieldType::GeoShape,
            "cartesian_point" => FieldType::CartesianPoint,
            "cartesian_shape" => FieldType::CartesianShape,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type [{0}]")]
pub struct TypeParseError(pub String);

impl FromStr for FieldType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| TypeParseError(s.to_string()))
    }
}

/// Declared type of a signature parameter or return value.
///
/// Serialized as a plain string: `"any"`, `"keyword"` or `"keyword[]"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParamType {
    Any,
    Scalar(FieldType),
    List(FieldType),
}

impl ParamType {
    /// Element type, or `None` for `any`.
    pub fn element(self) -> Option<FieldType> {
        match self {
            ParamType::Any => None,
            ParamType::Scalar(ty) | ParamType::List(ty) => Some(ty),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Any => f.write_str("any"),
            ParamType::Scalar(ty) => write!(f, "{ty}"),
            ParamType::List(ty) => write!(f, "{ty}[]"),
        }
    }
}

impl FromStr for ParamType {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(ParamType::Any);
        }
        match s.strip_suffix("[]") {
            Some(element) => element
                .parse()
                .map(ParamType::List)
                .map_err(|_| TypeParseError(s.to_string())),
            None => s.parse().map(ParamType::Scalar),
        }
    }
}

impl TryFrom<String> for ParamType {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

impl From<FieldType> for ParamType {
    fn from(value: FieldType) -> Self {
        ParamType::Scalar(value)
    }
}

/// Type of a validated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprType {
    Field(FieldType),
    /// The `null` literal.
    Null,
    /// A query parameter; its type is only known at execution time.
    Param,
    /// Unresolvable: unknown columns, failed calls and their dependants.
    Unknown,
    /// A bare `*` argument.
    Wildcard,
    /// A parenthesised value list.
    Tuple(Vec<ExprType>),
}

impl ExprType {
    /// Types that never produce a mismatch diagnostic.
    pub fn is_permissive(&self) -> bool {
        matches!(
            self,
            ExprType::Null | ExprType::Param | ExprType::Unknown | ExprType::Wildcard
        )
    }

    pub fn as_field(&self) -> Option<FieldType> {
        match self {
            ExprType::Field(ty) => Some(*ty),
            _ => None,
        }
    }
}

impl From<FieldType> for ExprType {
    fn from(value: FieldType) -> Self {
        ExprType::Field(value)
    }
}

impl From<ParamType> for ExprType {
    /// Return types: `any` resolves to unknown, list returns to their element.
    fn from(value: ParamType) -> Self {
        match value.element() {
            Some(ty) => ExprType::Field(ty),
            None => ExprType::Unknown,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Field(ty) => write!(f, "{ty}"),
            ExprType::Null => f.write_str("null"),
            ExprType::Param => f.write_str("param"),
            ExprType::Unknown => f.write_str("unknown"),
            ExprType::Wildcard => f.write_str("*"),
            ExprType::Tuple(items) => {
                f.write_str("(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}
