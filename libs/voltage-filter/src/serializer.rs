//! Rule Serializer
//!
//! Converts rules to options records and back. `deserialize_rule` is the
//! factory's `create_rule`, so `deserialize_rule(serialize_rule(&r))`
//! reproduces every field that affects compilation.

use serde_json::Value;

use crate::error::Result;
use crate::factory::{create_rule, create_rules};
use crate::options::RuleOptions;
use crate::rule::{Rule, RuleKind};

/// Serialize a rule into the options needed to re-create it
pub fn serialize_rule(rule: &Rule) -> RuleOptions {
    let mut options = RuleOptions::new(rule.name(), rule.property_name(), rule.rule_type());
    options.is_custom = rule.is_custom();
    options.expression = rule.expression().cloned();
    options.lower_boundary = rule.lower_boundary().cloned();
    options.operator = rule.operator();
    options.operators = rule.operators().map(<[_]>::to_vec);
    options.upper_boundary = rule.upper_boundary().cloned();

    match rule.kind() {
        RuleKind::Select {
            choices,
            selected_choices,
        } => {
            options.choices = Some(choices.clone());
            options.selected_choices = selected_choices.clone();
        },
        RuleKind::Geometry {
            geometry,
            feature_properties,
        } => {
            options.geometry = geometry.clone();
            options.feature_properties = Some(feature_properties.clone());
        },
        _ => {},
    }

    options
}

/// Serialize a list of rules, preserving order
pub fn serialize_rules(rules: &[Rule]) -> Vec<RuleOptions> {
    rules.iter().map(serialize_rule).collect()
}

/// Re-create a rule from its options
pub fn deserialize_rule(options: RuleOptions) -> Result<Rule> {
    create_rule(options)
}

/// Re-create a list of rules, preserving order
pub fn deserialize_rules(options_list: Vec<RuleOptions>) -> Result<Vec<Rule>> {
    create_rules(options_list)
}

/// Serialize rules straight to a JSON array
pub fn rules_to_json(rules: &[Rule]) -> Result<Value> {
    Ok(serde_json::to_value(serialize_rules(rules))?)
}

/// Re-create rules from a JSON array of options records
pub fn rules_from_json(value: Value) -> Result<Vec<Rule>> {
    let options_list: Vec<RuleOptions> = serde_json::from_value(value)?;
    deserialize_rules(options_list)
}

impl From<&Rule> for RuleOptions {
    fn from(rule: &Rule) -> Self {
        serialize_rule(rule)
    }
}

impl From<Rule> for RuleOptions {
    fn from(rule: Rule) -> Self {
        serialize_rule(&rule)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::{FeatureProperties, Geometry, Operator, RuleType};
    use serde_json::json;

    #[test]
    fn test_serialize_text_rule_fields() {
        let rule = Rule::new("Name", "name", RuleKind::Text)
            .with_operator(Operator::Like)
            .with_expression("abc");
        let value = serde_json::to_value(serialize_rule(&rule)).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Name",
                "propertyName": "name",
                "type": "text",
                "expression": "abc",
                "operator": "~"
            })
        );
    }

    #[test]
    fn test_serialize_copies_operators() {
        let rule = Rule::new("Height", "height", RuleKind::Number)
            .with_custom(true)
            .with_operator(Operator::EqualTo)
            .with_operators(vec![Operator::EqualTo, Operator::NotEqualTo]);
        let options = serialize_rule(&rule);
        assert!(options.is_custom);
        assert_eq!(
            options.operators,
            Some(vec![Operator::EqualTo, Operator::NotEqualTo])
        );
    }

    #[test]
    fn test_serialize_geometry_rule() {
        let mut rule = Rule::new("Area", "the_geom", RuleKind::geometry()).with_operator(Operator::Within);
        rule.set_geometry(Some(Geometry::Point([1.0, 2.0])));
        let mut props = FeatureProperties::new();
        props.insert("label".into(), json!("A"));
        rule.set_feature_properties(props);

        let value = serde_json::to_value(serialize_rule(&rule)).unwrap();
        assert_eq!(value["type"], json!("geometry"));
        assert_eq!(value["featureProperties"], json!({"label": "A"}));
        assert_eq!(value["geometry"], json!({"type": "Point", "coordinates": [1.0, 2.0]}));
        assert!(value.get("choices").is_none());
    }

    #[test]
    fn test_rule_serde_goes_through_options() {
        let rule = Rule::new("Kind", "kind", RuleKind::select(vec!["a".into(), "b".into()]))
            .with_operator(Operator::EqualTo);
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["choices"], json!(["a", "b"]));

        let back: Rule = serde_json::from_value(value).unwrap();
        assert_eq!(back, rule);
        assert_eq!(back.rule_type(), RuleType::Select);
    }

    #[test]
    fn test_rules_json_round_trip() {
        let rules = vec![
            Rule::new("A", "a", RuleKind::Text).with_operator(Operator::Like),
            Rule::new("B", "b", RuleKind::Date)
                .with_operator(Operator::During)
                .with_boundaries("2020-01-01", "2020-12-31"),
        ];
        let value = rules_to_json(&rules).unwrap();
        let back = rules_from_json(value).unwrap();
        assert_eq!(back, rules);
    }

    #[test]
    fn test_rules_from_json_rejects_select_without_choices() {
        let value = json!([{"name": "K", "propertyName": "k", "type": "select"}]);
        assert!(rules_from_json(value).is_err());
    }
}
