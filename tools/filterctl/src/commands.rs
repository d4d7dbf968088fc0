//! Command handlers
//!
//! Every command reads its inputs from files and renders its result as a
//! string; `main` writes it to stdout so results can be piped into other
//! tools.

use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use std::path::Path;
use tracing::info;
use voltage_filter::{
    create_rules_from_attributes, deserialize_rules, serialize_rules, Attribute,
    CreateFilterOptions, DataSourceConfig, FilterCompiler, Predicate, Rule, RuleOptions,
};

use crate::input::load_file;

/// Output format of compiled filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Predicate tree as JSON
    #[default]
    Json,
    /// Compact text expression
    Text,
}

/// Arguments of `filterctl compile`
pub struct CompileArgs<'a> {
    pub source: &'a Path,
    pub rules: Option<&'a Path>,
    pub inc_time: bool,
    pub inc_dimensions: bool,
    pub srs_name: Option<&'a str>,
    pub format: OutputFormat,
}

/// Compile the rules of a data source into one filter
pub fn compile(compiler: &FilterCompiler, args: CompileArgs<'_>) -> Result<String> {
    let source: DataSourceConfig = load_file(args.source)?;
    let rules: Option<Vec<Rule>> = args.rules.map(load_file).transpose()?;

    let mut options = CreateFilterOptions::new(&source)
        .include_time(args.inc_time)
        .include_dimensions(args.inc_dimensions);
    if let Some(rules) = rules.as_deref() {
        options = options.with_rules(rules);
    }
    if let Some(srs_name) = args.srs_name {
        options = options.with_srs_name(srs_name);
    }

    let filter = compiler.create_filter(options)?;
    info!(
        "Compiled {} rule(s) of '{}'",
        rules.as_ref().map_or(source.filter_rules.len(), Vec::len),
        source.name
    );

    render_filter(filter.as_ref(), args.format)
}

fn render_filter(filter: Option<&Predicate>, format: OutputFormat) -> Result<String> {
    Ok(match (format, filter) {
        (OutputFormat::Json, filter) => serde_json::to_string_pretty(&filter)?,
        (OutputFormat::Text, Some(filter)) => filter.to_string(),
        (OutputFormat::Text, None) => "No constraint".yellow().to_string(),
    })
}

/// Create the default rules of an attribute list
pub fn rules(attributes: &Path, custom: bool) -> Result<String> {
    let attributes: Vec<Attribute> = load_file(attributes)?;
    let rules = create_rules_from_attributes(&attributes, custom)?;
    info!("Created {} rule(s)", rules.len());

    Ok(serde_json::to_string_pretty(&serialize_rules(&rules))?)
}

/// Validate a rule list and render it in canonical form
pub fn normalize(path: &Path) -> Result<String> {
    let options: Vec<RuleOptions> = load_file(path)?;
    let rules = deserialize_rules(options)?;

    let configured = rules.iter().filter(|r| r.value().is_some()).count();
    info!(
        "{} rule(s) valid, {} configured",
        rules.len().to_string().green(),
        configured
    );

    Ok(serde_json::to_string_pretty(&serialize_rules(&rules))?)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_input(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn compile_args(source: &Path) -> CompileArgs<'_> {
        CompileArgs {
            source,
            rules: None,
            inc_time: false,
            inc_dimensions: false,
            srs_name: None,
            format: OutputFormat::Json,
        }
    }

    const BUILDINGS: &str = r#"
name: buildings
filterCondition: or
filterRules:
  - name: Height
    propertyName: height
    type: number
    operator: ">"
    expression: 12
  - name: Kind
    propertyName: kind
    type: select
    choices: [house, shed]
    selectedChoices: [shed]
dimensionsFiltersConfig:
  FLOOR:
    field: floor
dimensions:
  FLOOR: 2
"#;

    #[test]
    fn test_compile_source_rules_to_json() {
        let source = write_input(".yaml", BUILDINGS);
        let output = compile(&FilterCompiler::default(), compile_args(source.path())).unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "or",
                "conditions": [
                    {"type": "greaterThan", "propertyName": "height", "expression": 12.0},
                    {"type": "equalTo", "propertyName": "kind", "expression": "shed"}
                ]
            })
        );
    }

    #[test]
    fn test_compile_with_rule_override_and_dimensions() {
        let source = write_input(".yaml", BUILDINGS);
        let rules = write_input(
            ".json",
            r#"[{"name": "Name", "propertyName": "name", "type": "text", "operator": "=", "expression": "Tower"}]"#,
        );
        let args = CompileArgs {
            rules: Some(rules.path()),
            inc_dimensions: true,
            ..compile_args(source.path())
        };
        let output = compile(&FilterCompiler::default(), args).unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "and",
                "conditions": [
                    {"type": "equalTo", "propertyName": "name", "expression": "Tower"},
                    {"type": "equalTo", "propertyName": "floor", "expression": 2.0, "matchCase": true}
                ]
            })
        );
    }

    #[test]
    fn test_compile_text_format_and_empty_result() {
        let source = write_input(".yaml", BUILDINGS);
        let args = CompileArgs {
            format: OutputFormat::Text,
            ..compile_args(source.path())
        };
        let output = compile(&FilterCompiler::default(), args).unwrap();
        assert_eq!(output, "(height > 12 OR kind = 'shed')");

        let empty = write_input(".json", r#"{"name": "empty"}"#);
        let output = compile(&FilterCompiler::default(), compile_args(empty.path())).unwrap();
        assert_eq!(output, "null");
    }

    #[test]
    fn test_rules_from_attributes() {
        let attributes = write_input(
            ".yaml",
            "- name: height\n  type: number\n- name: kind\n  type: select\n  choices: [a, b]\n",
        );
        let output = rules(attributes.path(), true).unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["propertyName"], json!("height"));
        assert_eq!(value[0]["operator"], json!("="));
        assert_eq!(value[0]["isCustom"], json!(true));
        assert_eq!(value[0]["operators"].as_array().unwrap().len(), 6);
        assert_eq!(
            value[1],
            json!({
                "name": "kind",
                "propertyName": "kind",
                "type": "select",
                "operator": "=",
                "choices": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_rules_rejects_select_without_choices() {
        let attributes = write_input(".json", r#"[{"name": "kind", "type": "select"}]"#);
        let err = rules(attributes.path(), false).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_normalize_canonicalizes_records() {
        let input = write_input(
            ".json",
            r#"[
                {"name": "Height", "propertyName": "height", "type": "number", "operator": "GREATER_THAN", "expression": 3, "isCustom": false},
                {"name": "Kind", "propertyName": "kind", "type": "select", "choices": ["a"]}
            ]"#,
        );
        let output = normalize(input.path()).unwrap();

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!([
                {"name": "Height", "propertyName": "height", "type": "number", "operator": ">", "expression": 3.0},
                {"name": "Kind", "propertyName": "kind", "type": "select", "operator": "=", "choices": ["a"]}
            ])
        );
    }
}
