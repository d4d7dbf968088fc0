//! Input file loading
//!
//! Data sources, rule lists and attribute lists are read from YAML or JSON,
//! picked by file extension.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Read and deserialize a `.yaml` / `.yml` / `.json` file
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    debug!("Loaded {} bytes from {:?}", content.len(), path);

    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file {:?}", path)),
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file {:?}", path)),
        Some(other) => bail!("Unsupported file format '{}': {:?}", other, path),
        None => bail!("Input file must have an extension: {:?}", path),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;
    use voltage_filter::{Attribute, AttributeType, DataSourceConfig, RuleOptions};

    fn write_input(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_attributes() {
        let file = write_input(
            ".yaml",
            "- name: height\n  type: number\n- name: kind\n  type: select\n  choices: [a, b]\n",
        );
        let attributes: Vec<Attribute> = load_file(file.path()).unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1].attr_type, AttributeType::Select);
    }

    #[test]
    fn test_load_json_data_source() {
        let file = write_input(
            ".json",
            r#"{"name": "roads", "filterRules": [{"name": "W", "propertyName": "width", "type": "number", "operator": ">", "expression": 3}]}"#,
        );
        let source: DataSourceConfig = load_file(file.path()).unwrap();
        assert_eq!(source.filter_rules.len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_input(".txt", "[]");
        let err = load_file::<Vec<RuleOptions>>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }
}
