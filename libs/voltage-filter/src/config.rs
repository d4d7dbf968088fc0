//! Filter engine configuration
//!
//! Named defaults for the compiler, loadable through figment.
//!
//! Priority (highest to lowest):
//! 1. Environment variables (`VOLTAGE_FILTER_`, `__` between levels)
//! 2. Config file (`.toml`, `.yaml` / `.yml`, `.json`)
//! 3. Default values

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FilterError, Result};
use crate::time::TimeResolution;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "VOLTAGE_FILTER_";

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub like: LikeConfig,
    pub temporal: TemporalConfig,
}

/// LIKE pattern metacharacters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LikeConfig {
    pub wild_card: char,
    pub single_char: char,
    pub escape_char: char,
    pub match_case: bool,
}

impl Default for LikeConfig {
    fn default() -> Self {
        Self {
            wild_card: '*',
            single_char: '.',
            escape_char: '!',
            match_case: false,
        }
    }
}

/// Date rule and time range settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Span of an open-ended `BEGINS` interval
    pub begins_span_years: u32,
    /// Fixed start of an `ENDS` interval
    pub ends_begin: String,
    /// Resolution of time properties that declare none
    pub default_resolution: TimeResolution,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            begins_span_years: 30,
            ends_begin: "1970-01-01".to_string(),
            default_resolution: TimeResolution::Second,
        }
    }
}

impl FilterConfig {
    /// Figment layering defaults, an optional file and the environment
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(FilterConfig::default()));

        if let Some(path) = path {
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FilterError::config("Config file must have an extension"))?;

            figment = match extension {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => {
                    return Err(FilterError::config(format!(
                        "Unsupported config file format: {}",
                        extension
                    )))
                },
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration, see module docs for the layering
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)?
            .extract()
            .map_err(|e| FilterError::config(format!("Failed to load configuration: {}", e)))
    }
}
