//! Time helpers
//!
//! - Parsing of rule date expressions (ISO strings or epoch milliseconds)
//! - Date / datetime formatting used in temporal predicates
//! - WMS-time formatting of a data source's time range
//!
//! All times are handled as UTC.

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RuleValue;

/// `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD HH:mm:ss`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between start and end of a WMS time range
pub const WMS_RANGE_SEPARATOR: char = '/';

const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Resolution of a time-aware data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeResolution {
    Year,
    Month,
    Day,
    #[default]
    #[serde(alias = "seconds")]
    Second,
}

/// Whether the data source is queried with a single time or a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    #[default]
    Value,
    Range,
}

/// Time dimension of a data source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeProperty {
    /// Falls back to the configured default resolution when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<TimeResolution>,

    #[serde(default)]
    pub mode: TimeMode,
}

/// Selected time value or range, in milliseconds since the epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

// ============================================================================
// Parsing and formatting
// ============================================================================

/// Parse a rule value into a UTC date and time
///
/// Text values may be RFC 3339 timestamps, `YYYY-MM-DD[( |T)HH:mm[:ss[.fff]]]`,
/// `YYYY-MM` or `YYYY`; numbers are epoch milliseconds.
pub fn parse_datetime(value: &RuleValue) -> Option<NaiveDateTime> {
    match value {
        RuleValue::Number(ms) => from_millis(*ms as i64),
        RuleValue::Text(text) => parse_datetime_str(text.trim()),
        RuleValue::Bool(_) => None,
    }
}

fn parse_datetime_str(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), DATE_FORMAT))
        .ok()
        .or_else(|| {
            let year = text
                .parse::<i32>()
                .ok()
                .filter(|_| text.len() == 4)?;
            NaiveDate::from_ymd_opt(year, 1, 1)
        })?;
    date.and_hms_opt(0, 0, 0)
}

/// Epoch milliseconds to UTC date and time
pub fn from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Last second of the day starting at `dt`
pub fn end_of_day(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    dt.checked_add_days(Days::new(1))?
        .checked_sub_signed(TimeDelta::seconds(1))
}

/// Add whole years, clamping Feb 29 to Feb 28
pub fn add_years(dt: NaiveDateTime, years: u32) -> Option<NaiveDateTime> {
    dt.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// Add one unit of `resolution`; `None` for second resolution
pub fn add_resolution(dt: NaiveDateTime, resolution: TimeResolution) -> Option<NaiveDateTime> {
    match resolution {
        TimeResolution::Year => dt.checked_add_months(Months::new(12)),
        TimeResolution::Month => dt.checked_add_months(Months::new(1)),
        TimeResolution::Day => dt.checked_add_days(Days::new(1)),
        TimeResolution::Second => None,
    }
}

// ============================================================================
// WMS time
// ============================================================================

/// Format one time value at the given resolution
///
/// `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or `YYYY-MM-DDTHH:MM:SSZ` for seconds.
pub fn format_time_value(ms: i64, resolution: TimeResolution) -> Option<String> {
    let dt = from_millis(ms)?;
    let format = match resolution {
        TimeResolution::Year => "%Y",
        TimeResolution::Month => "%Y-%m",
        TimeResolution::Day => DATE_FORMAT,
        TimeResolution::Second => "%Y-%m-%dT%H:%M:%SZ",
    };
    Some(dt.format(format).to_string())
}

/// Format a time range into a WMS `TIME` parameter
///
/// Range-mode properties with an end give `start/end`; anything else gives
/// the start alone.
pub fn format_wms_time_param(
    property: &TimeProperty,
    range: &TimeRange,
    resolution: TimeResolution,
) -> Option<String> {
    let start = format_time_value(range.start, resolution)?;
    match (property.mode, range.end) {
        (TimeMode::Range, Some(end)) => {
            let end = format_time_value(end, resolution)?;
            Some(format!("{}{}{}", start, WMS_RANGE_SEPARATOR, end))
        },
        _ => Some(start),
    }
}
