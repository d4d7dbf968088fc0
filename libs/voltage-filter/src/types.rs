//! Filter type definitions
//!
//! Shared vocabulary of the filter engine:
//! - Attribute: descriptor a default rule is built from
//! - RuleType / AttributeType: declared value types
//! - Operator: comparison, spatial and temporal operators
//! - RuleValue: scalar expression and boundary values
//! - Geometry: GeoJSON-shaped geometries used by spatial rules
//! - FilterCondition: how multiple rules combine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Non-spatial properties attached to a geometry rule's feature
pub type FeatureProperties = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Attribute and Rule Types
// ============================================================================

/// Declared type of a queryable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    Boolean,
    Date,
    #[serde(alias = "dateTime", alias = "date_time")]
    DateTime,
    Geometry,
    Number,
    Select,
    Text,
}

/// Type of a rule, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Date,
    #[serde(alias = "dateTime", alias = "date_time")]
    DateTime,
    Geometry,
    Number,
    Select,
    Text,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Geometry => "geometry",
            Self::Number => "number",
            Self::Select => "select",
            Self::Text => "text",
        }
    }

    /// Date and datetime rules share the temporal operators
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute descriptor, as published by a queryable data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name (also the rule's property name)
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub attr_type: AttributeType,

    /// Display format hint (dates), not used by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Allowed values (select attributes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            format: None,
            choices: None,
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Rule operator
///
/// Serialized with the short wire values; the upper-case names are accepted
/// on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "..", alias = "BETWEEN")]
    Between,
    #[serde(rename = "=", alias = "EQUAL_TO")]
    EqualTo,
    #[serde(rename = ">", alias = "GREATER_THAN")]
    GreaterThan,
    #[serde(rename = ">=", alias = "GREATER_THAN_OR_EQUAL_TO")]
    GreaterThanOrEqualTo,
    #[serde(rename = "<", alias = "LESSER_THAN")]
    LesserThan,
    #[serde(rename = "<=", alias = "LESSER_THAN_OR_EQUAL_TO")]
    LesserThanOrEqualTo,
    #[serde(rename = "~", alias = "LIKE")]
    Like,
    #[serde(rename = "!=", alias = "NOT_EQUAL_TO")]
    NotEqualTo,

    // Spatial
    #[serde(rename = "contains", alias = "CONTAINS")]
    Contains,
    #[serde(rename = "intersects", alias = "INTERSECTS")]
    Intersects,
    #[serde(rename = "within", alias = "WITHIN")]
    Within,

    // Temporal
    #[serde(rename = "time_start", alias = "BEGINS")]
    Begins,
    #[serde(rename = "time_during", alias = "DURING")]
    During,
    #[serde(rename = "time_end", alias = "ENDS")]
    Ends,
    #[serde(rename = "time_equal", alias = "EQUALS")]
    Equals,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Self::Between,
        Self::EqualTo,
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
        Self::LesserThan,
        Self::LesserThanOrEqualTo,
        Self::Like,
        Self::NotEqualTo,
        Self::Contains,
        Self::Intersects,
        Self::Within,
        Self::Begins,
        Self::During,
        Self::Ends,
        Self::Equals,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Between => "..",
            Self::EqualTo => "=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
            Self::LesserThan => "<",
            Self::LesserThanOrEqualTo => "<=",
            Self::Like => "~",
            Self::NotEqualTo => "!=",
            Self::Contains => "contains",
            Self::Intersects => "intersects",
            Self::Within => "within",
            Self::Begins => "time_start",
            Self::During => "time_during",
            Self::Ends => "time_end",
            Self::Equals => "time_equal",
        }
    }

    /// Upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Between => "BETWEEN",
            Self::EqualTo => "EQUAL_TO",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqualTo => "GREATER_THAN_OR_EQUAL_TO",
            Self::LesserThan => "LESSER_THAN",
            Self::LesserThanOrEqualTo => "LESSER_THAN_OR_EQUAL_TO",
            Self::Like => "LIKE",
            Self::NotEqualTo => "NOT_EQUAL_TO",
            Self::Contains => "CONTAINS",
            Self::Intersects => "INTERSECTS",
            Self::Within => "WITHIN",
            Self::Begins => "BEGINS",
            Self::During => "DURING",
            Self::Ends => "ENDS",
            Self::Equals => "EQUALS",
        }
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::Contains | Self::Intersects | Self::Within)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Begins | Self::During | Self::Ends | Self::Equals
        )
    }

    /// Ordering comparisons that need a numeric expression
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::GreaterThan
                | Self::GreaterThanOrEqualTo
                | Self::LesserThan
                | Self::LesserThanOrEqualTo
        )
    }

    /// Operators that read the boundaries instead of the expression
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Between | Self::During)
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s || op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FilterError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Values
// ============================================================================

/// Scalar rule value: expression, boundary or dimension value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RuleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for RuleValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// x/y coordinate pair
pub type Coordinate = [f64; 2];

/// Geometry drawn or selected for a spatial rule (GeoJSON layout)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
}

fn write_coords(f: &mut fmt::Formatter<'_>, coords: &[Coordinate]) -> fmt::Result {
    f.write_str("(")?;
    for (i, [x, y]) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", x, y)?;
    }
    f.write_str(")")
}

fn write_rings(f: &mut fmt::Formatter<'_>, rings: &[Vec<Coordinate>]) -> fmt::Result {
    f.write_str("(")?;
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coords(f, ring)?;
    }
    f.write_str(")")
}

/// Well-known text
impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point([x, y]) => write!(f, "POINT({} {})", x, y),
            Self::MultiPoint(points) => {
                f.write_str("MULTIPOINT")?;
                write_coords(f, points)
            },
            Self::LineString(line) => {
                f.write_str("LINESTRING")?;
                write_coords(f, line)
            },
            Self::MultiLineString(lines) => {
                f.write_str("MULTILINESTRING")?;
                write_rings(f, lines)
            },
            Self::Polygon(rings) => {
                f.write_str("POLYGON")?;
                write_rings(f, rings)
            },
            Self::MultiPolygon(polygons) => {
                f.write_str("MULTIPOLYGON(")?;
                for (i, rings) in polygons.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_rings(f, rings)?;
                }
                f.write_str(")")
            },
        }
    }
}

// ============================================================================
// Filter Condition
// ============================================================================

/// How the rules of a data source combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterCondition {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
    /// OR all rules together, then negate the combination
    #[serde(alias = "NOT")]
    Not,
}
