//! Voltage Filter - Rule Filtering Library
//!
//! Typed filter rules for queryable data sources, providing:
//! - Rule creation from data source attributes or from persisted records
//! - Rule cloning and state propagation between rule copies
//! - Rule serialization to and from compact JSON records
//! - Compilation of rules into a predicate tree for feature queries
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Attribute  │────▶│   Factory    │────▶│    Rule     │
//! │  / Options  │     │ (validate)   │     │ (dynamic)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                                                 │
//!                       ┌─────────────────────────┼──────────────┐
//!                       ▼                         ▼              ▼
//!                ┌─────────────┐          ┌──────────────┐ ┌────────────┐
//!                │   Cloner    │          │   Compiler   │ │ Serializer │
//!                │  (extend)   │          │ (predicate)  │ │  (records) │
//!                └─────────────┘          └──────────────┘ └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use voltage_filter::{
//!     create_rule_from_attribute, Attribute, AttributeType, CreateFilterOptions,
//!     DataSourceConfig, FilterCompiler, Operator,
//! };
//!
//! let mut rule = create_rule_from_attribute(&Attribute::new("height", AttributeType::Number), false)?;
//! rule.set_operator(Some(Operator::GreaterThan));
//! rule.set_expression(Some(12.0.into()));
//!
//! let source = DataSourceConfig::new("buildings").with_rules(vec![rule]);
//! let filter = FilterCompiler::default().create_filter(CreateFilterOptions::new(&source))?;
//! assert_eq!(filter.map(|f| f.to_string()).as_deref(), Some("height > 12"));
//! # Ok::<(), voltage_filter::FilterError>(())
//! ```

mod cloner;
mod compiler;
pub mod config;
mod datasource;
mod error;
mod factory;
mod options;
pub mod predicate;
mod rule;
mod serializer;
pub mod time;
pub mod types;

// Re-export public API
pub use cloner::{clone_rule, extend_rule};
pub use compiler::{CreateFilterOptions, FilterCompiler};
pub use config::{FilterConfig, LikeConfig, TemporalConfig};
pub use datasource::{
    DataSource, DataSourceConfig, DimensionFilter, Dimensions, DimensionsFiltersConfig,
    DEFAULT_GEOMETRY_NAME,
};
pub use error::{FilterError, Result};
pub use factory::{
    create_rule, create_rule_from_attribute, create_rules, create_rules_from_attributes,
    CUSTOM_DATE_OPERATORS, CUSTOM_NUMBER_OPERATORS, CUSTOM_TEXT_OPERATORS, GEOMETRY_OPERATORS,
};
pub use options::RuleOptions;
pub use predicate::Predicate;
pub use rule::{DynamicField, Rule, RuleKind, RuleSnapshot};
pub use serializer::{
    deserialize_rule, deserialize_rules, rules_from_json, rules_to_json, serialize_rule,
    serialize_rules,
};
pub use time::{TimeMode, TimeProperty, TimeRange, TimeResolution};

// Re-export value types for convenience
pub use types::{
    Attribute, AttributeType, FeatureProperties, FilterCondition, Geometry, Operator, RuleType,
    RuleValue,
};
