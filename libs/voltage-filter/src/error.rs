//! Filter Engine Error Types

use thiserror::Error;

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Filter engine errors
///
/// Only caller contract violations are errors. A rule that is not configured
/// yet, or an operator the compiler has nothing to say about, compiles to
/// `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Select rule or attribute without choices
    #[error("Select rule '{0}' has no choices")]
    MissingChoices(String),

    /// Spatial operator on a rule that carries no geometry
    #[error("Spatial rule '{0}' has no geometry")]
    MissingGeometry(String),

    /// Numeric comparison against a non-numeric expression
    #[error("Rule '{property_name}' requires a numeric expression, got {expression}")]
    NonNumericExpression {
        property_name: String,
        expression: String,
    },

    /// Unknown operator name
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Malformed value in a record
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FilterError {
    pub fn missing_choices(property_name: impl Into<String>) -> Self {
        Self::MissingChoices(property_name.into())
    }

    pub fn missing_geometry(property_name: impl Into<String>) -> Self {
        Self::MissingGeometry(property_name.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Serialization(err.to_string())
    }
}

impl From<figment::Error> for FilterError {
    fn from(err: figment::Error) -> Self {
        FilterError::Config(err.to_string())
    }
}
