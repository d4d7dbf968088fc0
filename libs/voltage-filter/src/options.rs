//! Persisted rule options record
//!
//! Plain structured form of a rule, used to store rules and to rebuild them
//! later. Optional fields that are unset are left out of the serialized form
//! rather than written as `null`.

use serde::{Deserialize, Serialize};

use crate::types::{FeatureProperties, Geometry, Operator, RuleType, RuleValue};

/// Rule options record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOptions {
    /// Display label
    pub name: String,

    /// Target attribute
    pub property_name: String,

    /// Rule type; records without one build text rules
    #[serde(rename = "type", default = "default_rule_type")]
    pub rule_type: RuleType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_custom: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<RuleValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_boundary: Option<RuleValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    /// Operators offered to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<Operator>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_boundary: Option<RuleValue>,

    /// Allowed values (select rules)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,

    /// Chosen values (select rules)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_choices: Vec<String>,

    /// Drawn geometry (geometry rules)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    /// Non-spatial feature properties (geometry rules)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_properties: Option<FeatureProperties>,
}

fn default_rule_type() -> RuleType {
    RuleType::Text
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RuleOptions {
    pub fn new(
        name: impl Into<String>,
        property_name: impl Into<String>,
        rule_type: RuleType,
    ) -> Self {
        Self {
            name: name.into(),
            property_name: property_name.into(),
            rule_type,
            is_custom: false,
            expression: None,
            lower_boundary: None,
            operator: None,
            operators: None,
            upper_boundary: None,
            choices: None,
            selected_choices: Vec::new(),
            geometry: None,
            feature_properties: None,
        }
    }
}
