//! Rule Cloner / Merger
//!
//! - `clone_rule`: independent copy of a rule, same variant
//! - `extend_rule`: one-way propagation of the dynamic fields

use tracing::trace;

use crate::rule::{DynamicField, Rule, RuleKind};
use crate::types::RuleType;

/// Create an independent copy of a rule
///
/// The copy of a geometry rule carries the source's feature properties but
/// starts without a geometry of its own.
pub fn clone_rule(rule: &Rule) -> Rule {
    let kind = match rule.kind() {
        RuleKind::Geometry {
            feature_properties, ..
        } => RuleKind::Geometry {
            geometry: None,
            feature_properties: feature_properties.clone(),
        },
        other => other.clone(),
    };

    let mut clone = Rule::new(rule.name(), rule.property_name(), kind).with_custom(rule.is_custom());
    if let Some(operators) = rule.operators() {
        clone = clone.with_operators(operators.to_vec());
    }
    clone.set_operator(rule.operator());
    clone.set_expression(rule.expression().cloned());
    clone.set_lower_boundary(rule.lower_boundary().cloned());
    clone.set_upper_boundary(rule.upper_boundary().cloned());
    clone
}

/// Copy the dynamic fields of `source` onto `dest`
///
/// Each field is only written when it differs. Select rules also take over
/// the selection, geometry rules the geometry and the feature properties.
/// Static fields of `dest` are left alone.
///
/// Returns the fields of `dest` that changed, in write order.
pub fn extend_rule(source: &Rule, dest: &mut Rule) -> Vec<DynamicField> {
    let mut changed = Vec::new();

    if dest.set_expression(source.expression().cloned()) {
        changed.push(DynamicField::Expression);
    }
    if dest.set_lower_boundary(source.lower_boundary().cloned()) {
        changed.push(DynamicField::LowerBoundary);
    }
    if dest.set_operator(source.operator()) {
        changed.push(DynamicField::Operator);
    }
    if dest.set_upper_boundary(source.upper_boundary().cloned()) {
        changed.push(DynamicField::UpperBoundary);
    }

    match (source.kind(), dest.rule_type()) {
        (RuleKind::Select { .. }, RuleType::Select) => {
            if dest.set_selected_choices(source.selected_choices().to_vec()) {
                changed.push(DynamicField::SelectedChoices);
            }
        },
        (
            RuleKind::Geometry {
                geometry,
                feature_properties,
            },
            RuleType::Geometry,
        ) => {
            if dest.set_geometry(geometry.clone()) {
                changed.push(DynamicField::Geometry);
            }
            if dest.feature_properties() != Some(feature_properties) {
                dest.clear_feature_properties();
                dest.set_feature_properties(feature_properties.clone());
                changed.push(DynamicField::FeatureProperties);
            }
        },
        _ => {},
    }

    trace!(
        "Extended rule '{}' from '{}': {:?}",
        dest.property_name(),
        source.property_name(),
        changed
    );
    changed
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::types::{FeatureProperties, Geometry, Operator, RuleValue};
    use serde_json::json;

    fn geometry_rule() -> Rule {
        let mut rule = Rule::new("Area", "the_geom", RuleKind::geometry())
            .with_operator(Operator::Intersects)
            .with_operators(vec![Operator::Contains, Operator::Intersects, Operator::Within]);
        rule.set_geometry(Some(Geometry::Point([1.0, 2.0])));
        let mut props = FeatureProperties::new();
        props.insert("name".into(), json!("drawn"));
        rule.set_feature_properties(props);
        rule
    }

    #[test]
    fn test_clone_is_equal_and_independent() {
        let source = Rule::new("Name", "name", RuleKind::Text)
            .with_custom(true)
            .with_operator(Operator::Like)
            .with_operators(vec![Operator::Like, Operator::EqualTo])
            .with_expression("abc");

        let mut clone = clone_rule(&source);
        assert_eq!(clone, source);

        clone.set_expression(Some("xyz".into()));
        assert_eq!(source.expression(), Some(&RuleValue::from("abc")));
    }

    #[test]
    fn test_clone_keeps_unset_fields_unset() {
        let source = Rule::new("Height", "height", RuleKind::Number);
        let clone = clone_rule(&source);
        assert!(clone.operator().is_none());
        assert!(clone.expression().is_none());
        assert!(clone.lower_boundary().is_none());
        assert!(clone.operators().is_none());
        assert_eq!(clone.rule_type(), RuleType::Number);
    }

    #[test]
    fn test_clone_geometry_rule_copies_properties_only() {
        let source = geometry_rule();
        let clone = clone_rule(&source);

        assert_eq!(clone.rule_type(), RuleType::Geometry);
        assert!(clone.geometry().is_none());
        assert_eq!(clone.feature_properties(), source.feature_properties());
        assert_eq!(clone.operator(), Some(Operator::Intersects));
    }

    #[test]
    fn test_clone_select_rule_copies_choices() {
        let mut source = Rule::new(
            "Kind",
            "kind",
            RuleKind::select(vec!["a".into(), "b".into(), "c".into()]),
        )
        .with_operator(Operator::EqualTo);
        source.set_selected_choices(vec!["b".into()]);

        let clone = clone_rule(&source);
        assert_eq!(clone.choices(), source.choices());
        assert_eq!(clone.selected_choices(), ["b"]);
    }

    #[test]
    fn test_extend_copies_dynamic_fields_only() {
        let source = Rule::new("Height", "height", RuleKind::Number)
            .with_operator(Operator::Between)
            .with_boundaries(1.0, 10.0);
        let mut dest = Rule::new("Width", "width", RuleKind::Number)
            .with_operator(Operator::EqualTo)
            .with_expression(4.0);

        let changed = extend_rule(&source, &mut dest);
        assert_eq!(
            changed,
            [
                DynamicField::Expression,
                DynamicField::LowerBoundary,
                DynamicField::Operator,
                DynamicField::UpperBoundary,
            ]
        );
        assert_eq!(dest.operator(), source.operator());
        assert_eq!(dest.expression(), None);
        assert_eq!(dest.lower_boundary(), source.lower_boundary());
        assert_eq!(dest.upper_boundary(), source.upper_boundary());
        assert_eq!(dest.name(), "Width");
        assert_eq!(dest.property_name(), "width");

        // Second pass is a no-op
        assert!(extend_rule(&source, &mut dest).is_empty());
    }

    #[test]
    fn test_extend_geometry_replaces_feature_properties() {
        let source = geometry_rule();
        let mut dest = Rule::new("Area", "the_geom", RuleKind::geometry());
        let mut stale = FeatureProperties::new();
        stale.insert("stale".into(), json!(true));
        dest.set_feature_properties(stale);

        let changed = extend_rule(&source, &mut dest);
        assert!(changed.contains(&DynamicField::Geometry));
        assert!(changed.contains(&DynamicField::FeatureProperties));
        assert_eq!(dest.geometry(), source.geometry());
        assert_eq!(dest.feature_properties(), source.feature_properties());
        assert!(!dest.feature_properties().unwrap().contains_key("stale"));
    }

    #[test]
    fn test_extend_across_variants_keeps_variant_state() {
        let source = geometry_rule();
        let mut dest = Rule::new("Name", "name", RuleKind::Text);
        extend_rule(&source, &mut dest);
        assert_eq!(dest.rule_type(), RuleType::Text);
        assert_eq!(dest.operator(), Some(Operator::Intersects));
        assert!(dest.geometry().is_none());
    }
}
