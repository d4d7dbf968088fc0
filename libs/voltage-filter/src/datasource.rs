//! Data source abstraction
//!
//! The compiler only reads from a data source: its default rules, how they
//! combine, its time and dimension context, and the name of its geometry
//! field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rule::Rule;
use crate::time::{TimeProperty, TimeRange};
use crate::types::{FilterCondition, RuleValue};

/// Geometry field name used when a data source does not declare one
pub const DEFAULT_GEOMETRY_NAME: &str = "the_geom";

/// Dimension filter: the attribute a dimension constrains, and an optional
/// fixed value overriding the live dimension value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
}

/// Dimension filters, keyed by dimension name
pub type DimensionsFiltersConfig = BTreeMap<String, DimensionFilter>;

/// Live dimension values, keyed by dimension name
pub type Dimensions = BTreeMap<String, Option<RuleValue>>;

/// Read-only view of a queryable data source
///
/// Implementations:
/// - `DataSourceConfig`: owned, deserializable data source
pub trait DataSource {
    /// Default rule set
    fn filter_rules(&self) -> &[Rule];

    /// How the rules combine
    fn filter_condition(&self) -> FilterCondition;

    /// Selected time value or range
    fn time_range_value(&self) -> Option<&TimeRange>;

    fn time_property(&self) -> Option<&TimeProperty>;

    /// Attribute holding the feature time
    fn time_attribute_name(&self) -> Option<&str>;

    fn dimensions_filters_config(&self) -> &DimensionsFiltersConfig;

    fn dimensions(&self) -> &Dimensions;

    /// Target field of spatial predicates
    fn geometry_name(&self) -> &str;
}

/// Owned data source description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSourceConfig {
    pub name: String,
    pub filter_rules: Vec<Rule>,
    pub filter_condition: FilterCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range_value: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_property: Option<TimeProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_attribute_name: Option<String>,
    pub dimensions_filters_config: DimensionsFiltersConfig,
    pub dimensions: Dimensions,
    pub geometry_name: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            filter_rules: Vec::new(),
            filter_condition: FilterCondition::default(),
            time_range_value: None,
            time_property: None,
            time_attribute_name: None,
            dimensions_filters_config: DimensionsFiltersConfig::new(),
            dimensions: Dimensions::new(),
            geometry_name: DEFAULT_GEOMETRY_NAME.to_string(),
        }
    }
}

impl DataSourceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.filter_rules = rules;
        self
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.filter_condition = condition;
        self
    }

    pub fn with_geometry_name(mut self, geometry_name: impl Into<String>) -> Self {
        self.geometry_name = geometry_name.into();
        self
    }

    pub fn with_time(
        mut self,
        attribute_name: impl Into<String>,
        property: TimeProperty,
        range: TimeRange,
    ) -> Self {
        self.time_attribute_name = Some(attribute_name.into());
        self.time_property = Some(property);
        self.time_range_value = Some(range);
        self
    }

    pub fn with_dimension_filter(
        mut self,
        dimension: impl Into<String>,
        field: impl Into<String>,
        value: Option<RuleValue>,
    ) -> Self {
        self.dimensions_filters_config.insert(
            dimension.into(),
            DimensionFilter {
                field: field.into(),
                value,
            },
        );
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>, value: Option<RuleValue>) -> Self {
        self.dimensions.insert(dimension.into(), value);
        self
    }
}

impl DataSource for DataSourceConfig {
    fn filter_rules(&self) -> &[Rule] {
        &self.filter_rules
    }

    fn filter_condition(&self) -> FilterCondition {
        self.filter_condition
    }

    fn time_range_value(&self) -> Option<&TimeRange> {
        self.time_range_value.as_ref()
    }

    fn time_property(&self) -> Option<&TimeProperty> {
        self.time_property.as_ref()
    }

    fn time_attribute_name(&self) -> Option<&str> {
        self.time_attribute_name.as_deref()
    }

    fn dimensions_filters_config(&self) -> &DimensionsFiltersConfig {
        &self.dimensions_filters_config
    }

    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    fn geometry_name(&self) -> &str {
        &self.geometry_name
    }
}
