//! Predicate Compiler
//!
//! Turns rules into predicate trees:
//! - `create_filter_from_rule`: one rule → predicate or nothing
//! - `create_filter`: rules of a data source, combined by its filter
//!   condition, plus optional time and dimension constraints
//!
//! An incomplete rule, or an operator that means nothing for the rule's
//! type, contributes no constraint. Only caller mistakes (spatial rule
//! without geometry, numeric comparison against a non-number) are errors.

use chrono::NaiveDateTime;
use tracing::{debug, trace, warn};

use crate::config::FilterConfig;
use crate::datasource::DataSource;
use crate::error::{FilterError, Result};
use crate::predicate::{LikeFilter, Predicate};
use crate::rule::{Rule, RuleKind, RuleSnapshot};
use crate::time::{
    add_resolution, add_years, end_of_day, format_date, format_datetime, format_time_value,
    format_wms_time_param, from_millis, parse_datetime, TimeResolution,
};
use crate::types::{FilterCondition, Operator, RuleValue};

/// Options of [`FilterCompiler::create_filter`]
#[derive(Clone, Copy)]
pub struct CreateFilterOptions<'a> {
    /// Source of the default rules and of the time / dimension context
    pub data_source: &'a dyn DataSource,
    /// Prebuilt predicate used instead of compiling rules
    pub filter: Option<&'a Predicate>,
    /// Rules used instead of the data source's
    pub filter_rules: Option<&'a [Rule]>,
    /// AND the dimension filters of the data source in
    pub inc_dimensions: bool,
    /// AND the time range of the data source in
    pub inc_time: bool,
    /// Coordinate system annotation of spatial predicates
    pub srs_name: Option<&'a str>,
}

impl<'a> CreateFilterOptions<'a> {
    pub fn new(data_source: &'a dyn DataSource) -> Self {
        Self {
            data_source,
            filter: None,
            filter_rules: None,
            inc_dimensions: false,
            inc_time: false,
            srs_name: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_rules(mut self, rules: &'a [Rule]) -> Self {
        self.filter_rules = Some(rules);
        self
    }

    pub fn include_dimensions(mut self, inc_dimensions: bool) -> Self {
        self.inc_dimensions = inc_dimensions;
        self
    }

    pub fn include_time(mut self, inc_time: bool) -> Self {
        self.inc_time = inc_time;
        self
    }

    pub fn with_srs_name(mut self, srs_name: &'a str) -> Self {
        self.srs_name = Some(srs_name);
        self
    }
}

/// Rule-to-predicate compiler
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler {
    config: FilterConfig,
}

impl FilterCompiler {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Compile the rules of a data source into one predicate
    ///
    /// Rules combine according to the data source's filter condition: AND,
    /// OR, or NOT, which ORs the rules and negates the combination. The time
    /// and dimension predicates, when requested, are ANDed onto the result.
    pub fn create_filter(&self, options: CreateFilterOptions<'_>) -> Result<Option<Predicate>> {
        let data_source = options.data_source;

        let mut main = match options.filter {
            Some(filter) => Some(filter.clone()),
            None => {
                let rules = options
                    .filter_rules
                    .unwrap_or_else(|| data_source.filter_rules());

                let mut conditions = Vec::with_capacity(rules.len());
                for rule in rules {
                    if let Some(predicate) =
                        self.create_filter_from_rule(rule, data_source, options.srs_name)?
                    {
                        conditions.push(predicate);
                    }
                }

                let condition = data_source.filter_condition();
                let combined = match condition {
                    FilterCondition::And => Predicate::all(conditions),
                    FilterCondition::Or | FilterCondition::Not => Predicate::any(conditions),
                };
                match (condition, combined) {
                    (FilterCondition::Not, Some(predicate)) => Some(Predicate::not(predicate)),
                    (_, combined) => combined,
                }
            },
        };

        if options.inc_time {
            if let Some(time_filter) = self.create_time_filter(data_source) {
                main = Some(and_with(main, time_filter));
            }
        }

        if options.inc_dimensions {
            if let Some(dimensions_filter) = self.create_dimensions_filter(data_source) {
                main = Some(and_with(main, dimensions_filter));
            }
        }

        match &main {
            Some(predicate) => trace!("Compiled filter: {}", predicate),
            None => trace!("Compiled filter: no constraint"),
        }
        Ok(main)
    }

    /// Compile a single rule
    ///
    /// Date rules and select rules are handled by type; every other rule by
    /// its operator. Spatial predicates target the data source's geometry
    /// field rather than the rule's property.
    pub fn create_filter_from_rule(
        &self,
        rule: &Rule,
        data_source: &dyn DataSource,
        srs_name: Option<&str>,
    ) -> Result<Option<Predicate>> {
        let Some(value) = rule.value() else {
            debug!("Rule '{}' is not configured, skipped", rule.property_name());
            return Ok(None);
        };
        let property_name = value.property_name;

        if rule.rule_type().is_temporal() {
            return Ok(self.create_date_filter(&value));
        }

        if let RuleKind::Select {
            selected_choices, ..
        } = rule.kind()
        {
            let conditions = selected_choices
                .iter()
                .map(|choice| Predicate::equal_to(property_name, choice.as_str(), None))
                .collect();
            return Ok(Predicate::any(conditions));
        }

        let predicate = match value.operator {
            Operator::Contains | Operator::Intersects | Operator::Within => {
                let geometry = rule
                    .geometry()
                    .ok_or_else(|| FilterError::missing_geometry(property_name))?;
                let geometry_name = data_source.geometry_name();
                Some(match value.operator {
                    Operator::Contains => Predicate::contains(geometry_name, geometry, srs_name),
                    Operator::Intersects => {
                        Predicate::intersects(geometry_name, geometry, srs_name)
                    },
                    _ => Predicate::within(geometry_name, geometry, srs_name),
                })
            },
            Operator::GreaterThan
            | Operator::GreaterThanOrEqualTo
            | Operator::LesserThan
            | Operator::LesserThanOrEqualTo => {
                let number = numeric_expression(&value)?;
                Some(match value.operator {
                    Operator::GreaterThan => Predicate::greater_than(property_name, number),
                    Operator::GreaterThanOrEqualTo => {
                        Predicate::greater_than_or_equal_to(property_name, number)
                    },
                    Operator::LesserThan => Predicate::less_than(property_name, number),
                    _ => Predicate::less_than_or_equal_to(property_name, number),
                })
            },
            Operator::Between => match (value.lower_boundary, value.upper_boundary) {
                (Some(lower), Some(upper)) => {
                    Some(Predicate::between(property_name, lower.clone(), upper.clone()))
                },
                _ => None,
            },
            Operator::EqualTo => value
                .expression
                .map(|expression| Predicate::equal_to(property_name, expression.clone(), None)),
            Operator::NotEqualTo => value.expression.map(|expression| {
                Predicate::not_equal_to(property_name, expression.clone(), None)
            }),
            Operator::Like => value
                .expression
                .map(|expression| self.create_like_filter(property_name, expression)),
            Operator::Begins | Operator::During | Operator::Ends | Operator::Equals => None,
        };

        if predicate.is_none() {
            debug!(
                "Operator {} on {} rule '{}' gives no constraint",
                value.operator.name(),
                rule.rule_type(),
                property_name
            );
        }
        Ok(predicate)
    }

    /// Case-insensitive substring match on the literal expression
    fn create_like_filter(&self, property_name: &str, expression: &RuleValue) -> Predicate {
        let like = &self.config.like;
        Predicate::Like(LikeFilter {
            property_name: property_name.to_string(),
            pattern: self.like_pattern(expression),
            wild_card: like.wild_card,
            single_char: like.single_char,
            escape_char: like.escape_char,
            match_case: like.match_case,
        })
    }

    /// Escape the pattern metacharacters of `expression` and wrap it in
    /// wildcards
    ///
    /// The escape character is doubled first so the escapes added for the
    /// single-char and wildcard characters are not escaped again.
    pub fn like_pattern(&self, expression: &RuleValue) -> String {
        let like = &self.config.like;
        let escape = like.escape_char;
        let escaped = expression
            .to_string()
            .replace(escape, &format!("{0}{0}", escape))
            .replace(like.single_char, &format!("{}{}", escape, like.single_char))
            .replace(like.wild_card, &format!("{}{}", escape, like.wild_card));
        format!("{0}{1}{0}", like.wild_card, escaped)
    }

    /// Interval predicate of a date rule
    ///
    /// - `DURING`: both boundaries, day precision
    /// - `EQUALS`: the whole day of the expression, second precision
    /// - `BEGINS`: from the expression on, for the configured span
    /// - `ENDS`: from the configured fixed start up to the expression
    fn create_date_filter(&self, value: &RuleSnapshot<'_>) -> Option<Predicate> {
        let temporal = &self.config.temporal;
        let property_name = value.property_name;
        let parse = |v: Option<&RuleValue>| -> Option<NaiveDateTime> {
            let v = v?;
            let parsed = parse_datetime(v);
            if parsed.is_none() {
                warn!("Rule '{}': invalid date '{}'", property_name, v);
            }
            parsed
        };

        let (begin, end) = match value.operator {
            Operator::During => (
                format_date(&parse(value.lower_boundary)?),
                format_date(&parse(value.upper_boundary)?),
            ),
            Operator::Equals => {
                let begin = parse(value.expression)?;
                let end = end_of_day(begin)?;
                (format_datetime(&begin), format_datetime(&end))
            },
            Operator::Begins => {
                let begin = parse(value.expression)?;
                let end = add_years(begin, temporal.begins_span_years)?;
                (format_date(&begin), format_date(&end))
            },
            Operator::Ends => (
                temporal.ends_begin.clone(),
                format_date(&parse(value.expression)?),
            ),
            other => {
                debug!(
                    "Operator {} on date rule '{}' gives no constraint",
                    other.name(),
                    property_name
                );
                return None;
            },
        };

        Some(Predicate::during(property_name, begin, end))
    }

    /// Interval predicate of the data source's selected time
    ///
    /// A full range maps onto its two formatted ends. A single time spans
    /// one unit of the time property's resolution, minus one second; at
    /// second resolution there is nothing to span and no predicate.
    pub fn create_time_filter(&self, data_source: &dyn DataSource) -> Option<Predicate> {
        let range = data_source.time_range_value()?;
        let property = data_source.time_property()?;
        let name = data_source.time_attribute_name()?;
        let resolution = property
            .resolution
            .unwrap_or(self.config.temporal.default_resolution);

        if let Some(end) = range.end {
            let begin = format_time_value(range.start, resolution)?;
            let end = format_time_value(end, resolution)?;
            return Some(Predicate::during(name, begin, end));
        }

        if resolution == TimeResolution::Second {
            debug!("Time value of '{}' at second resolution, no time filter", name);
            return None;
        }

        let start = format_wms_time_param(property, range, resolution)
            .and_then(|value| parse_datetime(&RuleValue::Text(value)))
            .or_else(|| from_millis(range.start))?;
        let end = add_resolution(start, resolution)?
            .checked_sub_signed(chrono::TimeDelta::seconds(1))?;

        Some(Predicate::during(
            name,
            format_datetime(&start),
            format_datetime(&end),
        ))
    }

    /// AND of one case-sensitive equality per configured dimension
    ///
    /// A fixed value in the configuration wins over the live dimension
    /// value; dimensions with neither are skipped.
    pub fn create_dimensions_filter(&self, data_source: &dyn DataSource) -> Option<Predicate> {
        let dimensions = data_source.dimensions();
        let conditions = data_source
            .dimensions_filters_config()
            .iter()
            .filter_map(|(key, filter)| {
                let value = filter
                    .value
                    .clone()
                    .or_else(|| dimensions.get(key).cloned().flatten())?;
                Some(Predicate::equal_to(filter.field.as_str(), value, Some(true)))
            })
            .collect();
        Predicate::all(conditions)
    }
}

fn numeric_expression(value: &RuleSnapshot<'_>) -> Result<f64> {
    value
        .expression
        .and_then(RuleValue::as_f64)
        .ok_or_else(|| FilterError::NonNumericExpression {
            property_name: value.property_name.to_string(),
            expression: value
                .expression
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
}

fn and_with(main: Option<Predicate>, extra: Predicate) -> Predicate {
    match main {
        Some(main) => Predicate::and(vec![main, extra]),
        None => extra,
    }
}
