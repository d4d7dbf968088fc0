//! Rule Factory
//!
//! Builds default rules from attribute descriptors, and rules from fully
//! specified options records.

use tracing::debug;

use crate::error::{FilterError, Result};
use crate::options::RuleOptions;
use crate::rule::{Rule, RuleKind};
use crate::types::{Attribute, AttributeType, Operator, RuleType};

/// Operators offered by custom date rules
pub const CUSTOM_DATE_OPERATORS: [Operator; 3] =
    [Operator::Equals, Operator::Begins, Operator::Ends];

/// Operators offered by geometry rules
pub const GEOMETRY_OPERATORS: [Operator; 3] =
    [Operator::Contains, Operator::Intersects, Operator::Within];

/// Operators offered by custom number rules
pub const CUSTOM_NUMBER_OPERATORS: [Operator; 6] = [
    Operator::EqualTo,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqualTo,
    Operator::LesserThan,
    Operator::LesserThanOrEqualTo,
    Operator::NotEqualTo,
];

/// Operators offered by custom text rules
pub const CUSTOM_TEXT_OPERATORS: [Operator; 3] =
    [Operator::Like, Operator::EqualTo, Operator::NotEqualTo];

/// Create the default rule for an attribute
///
/// Simple rules get one canonical operator; custom rules additionally offer
/// the full operator choice of their type. Geometry and select rules ignore
/// `is_custom`.
pub fn create_rule_from_attribute(attribute: &Attribute, is_custom: bool) -> Result<Rule> {
    let name = attribute.name.as_str();

    let rule = match attribute.attr_type {
        AttributeType::Date | AttributeType::DateTime => {
            let kind = if attribute.attr_type == AttributeType::Date {
                RuleKind::Date
            } else {
                RuleKind::DateTime
            };
            let rule = Rule::new(name, name, kind).with_custom(is_custom);
            if is_custom {
                rule.with_operator(Operator::Equals)
                    .with_operators(CUSTOM_DATE_OPERATORS.to_vec())
            } else {
                rule.with_operator(Operator::During)
            }
        },
        AttributeType::Geometry => Rule::new(name, name, RuleKind::geometry())
            .with_operator(Operator::Within)
            .with_operators(GEOMETRY_OPERATORS.to_vec()),
        AttributeType::Number => {
            let rule = Rule::new(name, name, RuleKind::Number).with_custom(is_custom);
            if is_custom {
                rule.with_operator(Operator::EqualTo)
                    .with_operators(CUSTOM_NUMBER_OPERATORS.to_vec())
            } else {
                rule.with_operator(Operator::Between)
            }
        },
        AttributeType::Select => {
            let choices = attribute
                .choices
                .as_ref()
                .filter(|choices| !choices.is_empty())
                .ok_or_else(|| FilterError::missing_choices(name))?;
            Rule::new(name, name, RuleKind::select(choices.clone()))
        },
        AttributeType::Boolean | AttributeType::Text => {
            let rule = Rule::new(name, name, RuleKind::Text)
                .with_custom(is_custom)
                .with_operator(Operator::Like);
            if is_custom {
                rule.with_operators(CUSTOM_TEXT_OPERATORS.to_vec())
            } else {
                rule
            }
        },
    };

    debug!(
        "Created {} rule for attribute '{}' (custom: {})",
        rule.rule_type(),
        name,
        is_custom
    );
    Ok(rule)
}

/// Create default rules for a list of attributes, preserving order
pub fn create_rules_from_attributes(attributes: &[Attribute], is_custom: bool) -> Result<Vec<Rule>> {
    attributes
        .iter()
        .map(|attribute| create_rule_from_attribute(attribute, is_custom))
        .collect()
}

/// Create a rule from a fully specified options record
///
/// The operator is taken verbatim; a select rule without one keeps its
/// default `EQUAL_TO`.
pub fn create_rule(options: RuleOptions) -> Result<Rule> {
    let RuleOptions {
        name,
        property_name,
        rule_type,
        is_custom,
        expression,
        lower_boundary,
        operator,
        operators,
        upper_boundary,
        choices,
        selected_choices,
        geometry,
        feature_properties,
    } = options;

    let kind = match rule_type {
        RuleType::Date => RuleKind::Date,
        RuleType::DateTime => RuleKind::DateTime,
        RuleType::Number => RuleKind::Number,
        RuleType::Text => RuleKind::Text,
        RuleType::Select => {
            let choices = choices.ok_or_else(|| FilterError::missing_choices(&property_name))?;
            RuleKind::Select {
                choices,
                selected_choices,
            }
        },
        RuleType::Geometry => {
            let mut properties = feature_properties.unwrap_or_default();
            properties.remove("geometry");
            RuleKind::Geometry {
                geometry,
                feature_properties: properties,
            }
        },
    };

    let mut rule = Rule::new(name, property_name, kind).with_custom(is_custom);
    if operator.is_some() {
        rule.set_operator(operator);
    }
    if let Some(operators) = operators {
        rule = rule.with_operators(operators);
    }
    rule.set_expression(expression);
    rule.set_lower_boundary(lower_boundary);
    rule.set_upper_boundary(upper_boundary);
    Ok(rule)
}

/// Create rules from a list of options records, preserving order
pub fn create_rules<I>(options_list: I) -> Result<Vec<Rule>>
where
    I: IntoIterator<Item = RuleOptions>,
{
    options_list.into_iter().map(create_rule).collect()
}

impl TryFrom<RuleOptions> for Rule {
    type Error = FilterError;

    fn try_from(options: RuleOptions) -> Result<Self> {
        create_rule(options)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::RuleValue;

    #[test]
    fn test_date_attribute_defaults() {
        let attribute = Attribute::new("created", AttributeType::Date);

        let simple = create_rule_from_attribute(&attribute, false).unwrap();
        assert_eq!(simple.rule_type(), RuleType::Date);
        assert_eq!(simple.operator(), Some(Operator::During));
        assert!(simple.operators().is_none());
        assert!(!simple.is_custom());

        let custom = create_rule_from_attribute(&attribute, true).unwrap();
        assert_eq!(custom.operator(), Some(Operator::Equals));
        assert_eq!(custom.operators(), Some(&CUSTOM_DATE_OPERATORS[..]));
        assert!(custom.is_custom());

        let datetime = Attribute::new("updated", AttributeType::DateTime);
        let rule = create_rule_from_attribute(&datetime, false).unwrap();
        assert_eq!(rule.rule_type(), RuleType::DateTime);
    }

    #[test]
    fn test_geometry_attribute_ignores_custom() {
        let attribute = Attribute::new("the_geom", AttributeType::Geometry);
        for is_custom in [false, true] {
            let rule = create_rule_from_attribute(&attribute, is_custom).unwrap();
            assert_eq!(rule.rule_type(), RuleType::Geometry);
            assert_eq!(rule.operator(), Some(Operator::Within));
            assert_eq!(rule.operators(), Some(&GEOMETRY_OPERATORS[..]));
            assert!(!rule.is_custom());
            let record = serde_json::to_value(&rule).unwrap();
            assert!(record.get("isCustom").is_none());
        }
    }

    #[test]
    fn test_number_attribute_defaults() {
        let attribute = Attribute::new("height", AttributeType::Number);

        let simple = create_rule_from_attribute(&attribute, false).unwrap();
        assert_eq!(simple.operator(), Some(Operator::Between));

        let custom = create_rule_from_attribute(&attribute, true).unwrap();
        assert_eq!(custom.operator(), Some(Operator::EqualTo));
        assert_eq!(custom.operators().unwrap().len(), 6);
    }

    #[test]
    fn test_select_attribute_requires_choices() {
        let attribute = Attribute::new("kind", AttributeType::Select);
        let err = create_rule_from_attribute(&attribute, false).unwrap_err();
        assert!(matches!(err, FilterError::MissingChoices(ref p) if p == "kind"));

        let empty = Attribute::new("kind", AttributeType::Select).with_choices(Vec::<String>::new());
        assert!(create_rule_from_attribute(&empty, false).is_err());

        let attribute = attribute.with_choices(["house", "barn"]);
        let rule = create_rule_from_attribute(&attribute, true).unwrap();
        assert_eq!(rule.choices().unwrap(), ["house", "barn"]);
        assert!(!rule.is_custom());
    }

    #[test]
    fn test_text_and_boolean_attributes() {
        let text = Attribute::new("name", AttributeType::Text);
        let rule = create_rule_from_attribute(&text, false).unwrap();
        assert_eq!(rule.rule_type(), RuleType::Text);
        assert_eq!(rule.operator(), Some(Operator::Like));
        assert!(rule.operators().is_none());

        let custom = create_rule_from_attribute(&text, true).unwrap();
        assert_eq!(custom.operators(), Some(&CUSTOM_TEXT_OPERATORS[..]));

        let boolean = Attribute::new("active", AttributeType::Boolean);
        let rule = create_rule_from_attribute(&boolean, false).unwrap();
        assert_eq!(rule.rule_type(), RuleType::Text);
    }

    #[test]
    fn test_create_rules_preserves_order() {
        let attributes = vec![
            Attribute::new("a", AttributeType::Text),
            Attribute::new("b", AttributeType::Number),
            Attribute::new("c", AttributeType::Date),
        ];
        let rules = create_rules_from_attributes(&attributes, false).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.property_name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_create_rule_takes_operator_verbatim() {
        let mut options = RuleOptions::new("Height", "height", RuleType::Number);
        options.operator = Some(Operator::LesserThan);
        options.expression = Some(RuleValue::Number(3.0));

        let rule = create_rule(options).unwrap();
        assert_eq!(rule.operator(), Some(Operator::LesserThan));
        assert_eq!(rule.expression(), Some(&RuleValue::Number(3.0)));
        assert!(rule.operators().is_none());
    }

    #[test]
    fn test_create_select_rule_defaults_to_equal_to() {
        let mut options = RuleOptions::new("Kind", "kind", RuleType::Select);
        options.choices = Some(vec!["a".into(), "b".into()]);
        let rule = create_rule(options.clone()).unwrap();
        assert_eq!(rule.operator(), Some(Operator::EqualTo));

        options.operator = Some(Operator::NotEqualTo);
        let rule = create_rule(options).unwrap();
        assert_eq!(rule.operator(), Some(Operator::NotEqualTo));
    }

    #[test]
    fn test_create_select_rule_without_choices_fails() {
        let options = RuleOptions::new("Kind", "kind", RuleType::Select);
        assert!(matches!(
            create_rule(options),
            Err(FilterError::MissingChoices(_))
        ));
    }
}
