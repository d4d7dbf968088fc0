//! Rule entity
//!
//! A rule is one typed filter criterion. The shared fields live on [`Rule`];
//! the variant-specific ones live on [`RuleKind`], which also fixes the rule
//! type for the rule's lifetime.
//!
//! Only the dynamic fields can change after construction. Every setter
//! reports whether it changed anything so callers can drive their own change
//! notification.

use serde::{Deserialize, Serialize};

use crate::options::RuleOptions;
use crate::types::{FeatureProperties, Geometry, Operator, RuleType, RuleValue};

/// Variant-specific rule state
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Text,
    Number,
    Date,
    DateTime,
    Select {
        /// Allowed values, in display order
        choices: Vec<String>,
        /// Currently chosen values, in selection order
        selected_choices: Vec<String>,
    },
    Geometry {
        geometry: Option<Geometry>,
        /// Side properties of the drawn feature, display only
        feature_properties: FeatureProperties,
    },
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Text => RuleType::Text,
            Self::Number => RuleType::Number,
            Self::Date => RuleType::Date,
            Self::DateTime => RuleType::DateTime,
            Self::Select { .. } => RuleType::Select,
            Self::Geometry { .. } => RuleType::Geometry,
        }
    }

    pub fn select(choices: Vec<String>) -> Self {
        Self::Select {
            choices,
            selected_choices: Vec::new(),
        }
    }

    pub fn geometry() -> Self {
        Self::Geometry {
            geometry: None,
            feature_properties: FeatureProperties::new(),
        }
    }
}

/// Dynamic rule field, as reported by setters and [`crate::extend_rule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicField {
    Expression,
    LowerBoundary,
    Operator,
    UpperBoundary,
    SelectedChoices,
    Geometry,
    FeatureProperties,
}

/// Filter rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleOptions", into = "RuleOptions")]
pub struct Rule {
    name: String,
    property_name: String,
    is_custom: bool,
    operator: Option<Operator>,
    operators: Option<Vec<Operator>>,
    expression: Option<RuleValue>,
    lower_boundary: Option<RuleValue>,
    upper_boundary: Option<RuleValue>,
    kind: RuleKind,
}

/// Configured state of a rule, see [`Rule::value`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleSnapshot<'a> {
    pub operator: Operator,
    pub property_name: &'a str,
    pub expression: Option<&'a RuleValue>,
    pub lower_boundary: Option<&'a RuleValue>,
    pub upper_boundary: Option<&'a RuleValue>,
}

impl Rule {
    /// Select rules always start out comparing with `EQUAL_TO`
    pub fn new(name: impl Into<String>, property_name: impl Into<String>, kind: RuleKind) -> Self {
        let operator = match kind {
            RuleKind::Select { .. } => Some(Operator::EqualTo),
            _ => None,
        };
        Self {
            name: name.into(),
            property_name: property_name.into(),
            is_custom: false,
            operator,
            operators: None,
            expression: None,
            lower_boundary: None,
            upper_boundary: None,
            kind,
        }
    }

    // ========== Builders ==========

    pub fn with_custom(mut self, is_custom: bool) -> Self {
        self.is_custom = is_custom;
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_operators(mut self, operators: Vec<Operator>) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn with_expression(mut self, expression: impl Into<RuleValue>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_boundaries(
        mut self,
        lower: impl Into<RuleValue>,
        upper: impl Into<RuleValue>,
    ) -> Self {
        self.lower_boundary = Some(lower.into());
        self.upper_boundary = Some(upper.into());
        self
    }

    // ========== Static fields ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn rule_type(&self) -> RuleType {
        self.kind.rule_type()
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn operators(&self) -> Option<&[Operator]> {
        self.operators.as_deref()
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn choices(&self) -> Option<&[String]> {
        match &self.kind {
            RuleKind::Select { choices, .. } => Some(choices),
            _ => None,
        }
    }

    // ========== Dynamic fields ==========

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn expression(&self) -> Option<&RuleValue> {
        self.expression.as_ref()
    }

    pub fn lower_boundary(&self) -> Option<&RuleValue> {
        self.lower_boundary.as_ref()
    }

    pub fn upper_boundary(&self) -> Option<&RuleValue> {
        self.upper_boundary.as_ref()
    }

    /// Selected choices; always empty for non-select rules
    pub fn selected_choices(&self) -> &[String] {
        match &self.kind {
            RuleKind::Select {
                selected_choices, ..
            } => selected_choices,
            _ => &[],
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            RuleKind::Geometry { geometry, .. } => geometry.as_ref(),
            _ => None,
        }
    }

    pub fn feature_properties(&self) -> Option<&FeatureProperties> {
        match &self.kind {
            RuleKind::Geometry {
                feature_properties, ..
            } => Some(feature_properties),
            _ => None,
        }
    }

    pub fn set_operator(&mut self, operator: Option<Operator>) -> bool {
        replace_if_changed(&mut self.operator, operator)
    }

    pub fn set_expression(&mut self, expression: Option<RuleValue>) -> bool {
        replace_if_changed(&mut self.expression, expression)
    }

    pub fn set_lower_boundary(&mut self, boundary: Option<RuleValue>) -> bool {
        replace_if_changed(&mut self.lower_boundary, boundary)
    }

    pub fn set_upper_boundary(&mut self, boundary: Option<RuleValue>) -> bool {
        replace_if_changed(&mut self.upper_boundary, boundary)
    }

    /// No-op on non-select rules
    pub fn set_selected_choices(&mut self, selection: Vec<String>) -> bool {
        match &mut self.kind {
            RuleKind::Select {
                selected_choices, ..
            } => replace_if_changed(selected_choices, selection),
            _ => false,
        }
    }

    /// No-op on non-geometry rules
    pub fn set_geometry(&mut self, value: Option<Geometry>) -> bool {
        match &mut self.kind {
            RuleKind::Geometry { geometry, .. } => replace_if_changed(geometry, value),
            _ => false,
        }
    }

    /// Merge properties into the attached feature; no-op on non-geometry rules
    pub fn set_feature_properties(&mut self, properties: FeatureProperties) -> bool {
        let RuleKind::Geometry {
            feature_properties, ..
        } = &mut self.kind
        else {
            return false;
        };
        let mut changed = false;
        for (key, value) in properties {
            if key == "geometry" {
                continue;
            }
            if feature_properties.get(&key) != Some(&value) {
                feature_properties.insert(key, value);
                changed = true;
            }
        }
        changed
    }

    pub fn clear_feature_properties(&mut self) -> bool {
        match &mut self.kind {
            RuleKind::Geometry {
                feature_properties, ..
            } if !feature_properties.is_empty() => {
                feature_properties.clear();
                true
            },
            _ => false,
        }
    }

    // ========== Configured value ==========

    /// Whether the rule holds a comparison value
    ///
    /// The value of a select rule is its selection and the value of a
    /// geometry rule is its geometry.
    fn has_expression(&self) -> bool {
        match &self.kind {
            RuleKind::Select {
                selected_choices, ..
            } => !selected_choices.is_empty(),
            RuleKind::Geometry { geometry, .. } => geometry.is_some(),
            _ => self.expression.is_some(),
        }
    }

    /// Configured state, or `None` while the rule is incomplete
    ///
    /// A rule is configured once it has an operator and, for `BETWEEN` and
    /// `DURING`, both boundaries or, for every other operator, a value.
    pub fn value(&self) -> Option<RuleSnapshot<'_>> {
        let operator = self.operator?;
        let complete = if operator.is_range() {
            self.lower_boundary.is_some() && self.upper_boundary.is_some()
        } else {
            self.has_expression()
        };
        complete.then(|| RuleSnapshot {
            operator,
            property_name: &self.property_name,
            expression: self.expression.as_ref(),
            lower_boundary: self.lower_boundary.as_ref(),
            upper_boundary: self.upper_boundary.as_ref(),
        })
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
