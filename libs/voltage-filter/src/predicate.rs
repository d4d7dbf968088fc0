//! Predicate tree
//!
//! Output of the compiler: leaf predicates (comparison, like, range,
//! temporal, spatial) combined by AND / OR / NOT nodes. A tree is built
//! fresh for each compilation and never mutated afterwards.
//!
//! Encoding the tree for a feature service (OGC filter XML and the like) is
//! left to the renderer that consumes it. `Display` gives a compact text form
//! for logs and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Geometry, RuleValue};

/// Equality / inequality against a scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonFilter {
    pub property_name: String,
    pub expression: RuleValue,
    /// Case sensitivity; left to the service when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_case: Option<bool>,
}

/// Ordering comparison against a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericFilter {
    pub property_name: String,
    pub expression: f64,
}

/// Inclusive range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetweenFilter {
    pub property_name: String,
    pub lower_boundary: RuleValue,
    pub upper_boundary: RuleValue,
}

/// Pattern match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeFilter {
    pub property_name: String,
    pub pattern: String,
    pub wild_card: char,
    pub single_char: char,
    pub escape_char: char,
    pub match_case: bool,
}

/// Temporal interval, both ends formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuringFilter {
    pub property_name: String,
    pub begin: String,
    pub end: String,
}

/// Spatial relation against the data source's geometry field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialFilter {
    pub geometry_name: String,
    pub geometry: Geometry,
    /// Coordinate system of `geometry`; no annotation when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs_name: Option<String>,
}

/// Predicate tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    And { conditions: Vec<Predicate> },
    Or { conditions: Vec<Predicate> },
    Not { condition: Box<Predicate> },
    EqualTo(ComparisonFilter),
    NotEqualTo(ComparisonFilter),
    Like(LikeFilter),
    Between(BetweenFilter),
    GreaterThan(NumericFilter),
    GreaterThanOrEqualTo(NumericFilter),
    LessThan(NumericFilter),
    LessThanOrEqualTo(NumericFilter),
    During(DuringFilter),
    Contains(SpatialFilter),
    Intersects(SpatialFilter),
    Within(SpatialFilter),
}

impl Predicate {
    // ========== Composition ==========

    pub fn and(conditions: Vec<Predicate>) -> Self {
        Self::And { conditions }
    }

    pub fn or(conditions: Vec<Predicate>) -> Self {
        Self::Or { conditions }
    }

    pub fn not(condition: Predicate) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// AND of the given predicates: `None` when empty, the predicate itself
    /// when alone
    pub fn all(mut conditions: Vec<Predicate>) -> Option<Self> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Self::and(conditions)),
        }
    }

    /// OR counterpart of [`Predicate::all`]
    pub fn any(mut conditions: Vec<Predicate>) -> Option<Self> {
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Self::or(conditions)),
        }
    }

    // ========== Leaves ==========

    pub fn equal_to(
        property_name: impl Into<String>,
        expression: impl Into<RuleValue>,
        match_case: Option<bool>,
    ) -> Self {
        Self::EqualTo(ComparisonFilter {
            property_name: property_name.into(),
            expression: expression.into(),
            match_case,
        })
    }

    pub fn not_equal_to(
        property_name: impl Into<String>,
        expression: impl Into<RuleValue>,
        match_case: Option<bool>,
    ) -> Self {
        Self::NotEqualTo(ComparisonFilter {
            property_name: property_name.into(),
            expression: expression.into(),
            match_case,
        })
    }

    pub fn between(
        property_name: impl Into<String>,
        lower_boundary: impl Into<RuleValue>,
        upper_boundary: impl Into<RuleValue>,
    ) -> Self {
        Self::Between(BetweenFilter {
            property_name: property_name.into(),
            lower_boundary: lower_boundary.into(),
            upper_boundary: upper_boundary.into(),
        })
    }

    pub fn greater_than(property_name: impl Into<String>, expression: f64) -> Self {
        Self::GreaterThan(NumericFilter {
            property_name: property_name.into(),
            expression,
        })
    }

    pub fn greater_than_or_equal_to(property_name: impl Into<String>, expression: f64) -> Self {
        Self::GreaterThanOrEqualTo(NumericFilter {
            property_name: property_name.into(),
            expression,
        })
    }

    pub fn less_than(property_name: impl Into<String>, expression: f64) -> Self {
        Self::LessThan(NumericFilter {
            property_name: property_name.into(),
            expression,
        })
    }

    pub fn less_than_or_equal_to(property_name: impl Into<String>, expression: f64) -> Self {
        Self::LessThanOrEqualTo(NumericFilter {
            property_name: property_name.into(),
            expression,
        })
    }

    pub fn during(
        property_name: impl Into<String>,
        begin: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self::During(DuringFilter {
            property_name: property_name.into(),
            begin: begin.into(),
            end: end.into(),
        })
    }

    fn spatial(geometry_name: &str, geometry: &Geometry, srs_name: Option<&str>) -> SpatialFilter {
        SpatialFilter {
            geometry_name: geometry_name.to_string(),
            geometry: geometry.clone(),
            srs_name: srs_name.map(str::to_string),
        }
    }

    pub fn contains(geometry_name: &str, geometry: &Geometry, srs_name: Option<&str>) -> Self {
        Self::Contains(Self::spatial(geometry_name, geometry, srs_name))
    }

    pub fn intersects(geometry_name: &str, geometry: &Geometry, srs_name: Option<&str>) -> Self {
        Self::Intersects(Self::spatial(geometry_name, geometry, srs_name))
    }

    pub fn within(geometry_name: &str, geometry: &Geometry, srs_name: Option<&str>) -> Self {
        Self::Within(Self::spatial(geometry_name, geometry, srs_name))
    }

    // ========== Inspection ==========

    /// Child predicates of AND / OR / NOT nodes; empty for leaves
    pub fn children(&self) -> &[Predicate] {
        match self {
            Self::And { conditions } | Self::Or { conditions } => conditions,
            Self::Not { condition } => std::slice::from_ref(&**condition),
            _ => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::And { .. } | Self::Or { .. } | Self::Not { .. })
    }
}

// ============================================================================
// Text rendering
// ============================================================================

fn write_value(f: &mut fmt::Formatter<'_>, value: &RuleValue) -> fmt::Result {
    match value {
        RuleValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        other => write!(f, "{}", other),
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, conditions: &[Predicate], op: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", condition)?;
    }
    f.write_str(")")
}

fn write_spatial(f: &mut fmt::Formatter<'_>, op: &str, filter: &SpatialFilter) -> fmt::Result {
    write!(f, "{}({}, ", op, filter.geometry_name)?;
    if let Some(srs) = &filter.srs_name {
        write!(f, "SRID={};", srs)?;
    }
    write!(f, "{})", filter.geometry)
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And { conditions } => write_joined(f, conditions, "AND"),
            Self::Or { conditions } => write_joined(f, conditions, "OR"),
            Self::Not { condition } if condition.is_leaf() => write!(f, "NOT ({})", condition),
            Self::Not { condition } => write!(f, "NOT {}", condition),
            Self::EqualTo(c) => {
                write!(f, "{} = ", c.property_name)?;
                write_value(f, &c.expression)
            },
            Self::NotEqualTo(c) => {
                write!(f, "{} <> ", c.property_name)?;
                write_value(f, &c.expression)
            },
            Self::Like(l) => {
                let op = if l.match_case { "LIKE" } else { "ILIKE" };
                write!(f, "{} {} '{}'", l.property_name, op, l.pattern)
            },
            Self::Between(b) => {
                write!(f, "{} BETWEEN ", b.property_name)?;
                write_value(f, &b.lower_boundary)?;
                f.write_str(" AND ")?;
                write_value(f, &b.upper_boundary)
            },
            Self::GreaterThan(n) => write!(f, "{} > {}", n.property_name, n.expression),
            Self::GreaterThanOrEqualTo(n) => write!(f, "{} >= {}", n.property_name, n.expression),
            Self::LessThan(n) => write!(f, "{} < {}", n.property_name, n.expression),
            Self::LessThanOrEqualTo(n) => write!(f, "{} <= {}", n.property_name, n.expression),
            Self::During(d) => write!(f, "{} DURING {}/{}", d.property_name, d.begin, d.end),
            Self::Contains(s) => write_spatial(f, "CONTAINS", s),
            Self::Intersects(s) => write_spatial(f, "INTERSECTS", s),
            Self::Within(s) => write_spatial(f, "WITHIN", s),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_and_any_collapse() {
        assert!(Predicate::all(vec![]).is_none());

        let single = Predicate::equal_to("a", 1.0, None);
        assert_eq!(Predicate::all(vec![single.clone()]), Some(single.clone()));

        let pair = Predicate::any(vec![single.clone(), single.clone()]).unwrap();
        assert!(matches!(pair, Predicate::Or { ref conditions } if conditions.len() == 2));
    }

    #[test]
    fn test_children() {
        let leaf = Predicate::greater_than("h", 3.0);
        assert!(leaf.children().is_empty());

        let not = Predicate::not(leaf.clone());
        assert_eq!(not.children(), [leaf]);
    }

    #[test]
    fn test_serde_layout() {
        let predicate = Predicate::not(Predicate::or(vec![
            Predicate::equal_to("kind", "house", None),
            Predicate::within("the_geom", &Geometry::Point([1.0, 2.0]), Some("EPSG:2056")),
        ]));
        let value = serde_json::to_value(&predicate).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "not",
                "condition": {
                    "type": "or",
                    "conditions": [
                        {"type": "equalTo", "propertyName": "kind", "expression": "house"},
                        {
                            "type": "within",
                            "geometryName": "the_geom",
                            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                            "srsName": "EPSG:2056"
                        }
                    ]
                }
            })
        );

        let back: Predicate = serde_json::from_value(value).unwrap();
        assert_eq!(back, predicate);
    }

    #[test]
    fn test_display() {
        let predicate = Predicate::and(vec![
            Predicate::equal_to("name", "O'Neil", None),
            Predicate::between("height", 1.0, 5.0),
            Predicate::not(Predicate::during("date", "2020-01-01", "2020-12-31")),
        ]);
        assert_eq!(
            predicate.to_string(),
            "(name = 'O''Neil' AND height BETWEEN 1 AND 5 AND NOT (date DURING 2020-01-01/2020-12-31))"
        );

        let spatial = Predicate::intersects("geom", &Geometry::Point([0.5, 1.0]), None);
        assert_eq!(spatial.to_string(), "INTERSECTS(geom, POINT(0.5 1))");
    }
}
