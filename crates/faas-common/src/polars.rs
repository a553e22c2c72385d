//! Polars AnyValue utility functions.
//!
//! This module converts Polars `AnyValue` cells into the JSON scalars carried
//! by canonical records, and decodes Polars' physical temporal values into
//! `chrono` types.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, TimeUnit};
use serde_json::{Number, Value};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars `AnyValue` to a JSON scalar.
///
/// Returns `None` for cells that must be omitted from a canonical record:
/// `Null` and non-finite floats. Integers and finite floats become JSON
/// numbers, booleans stay booleans, strings stay strings. Temporal cells are
/// rendered with their Polars display form; date columns that need a specific
/// format are resolved before conversion.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use faas_common::any_to_json;
/// use serde_json::json;
///
/// assert_eq!(any_to_json(AnyValue::Null), None);
/// assert_eq!(any_to_json(AnyValue::Int32(5)), Some(json!(5)));
/// assert_eq!(any_to_json(AnyValue::String("a")), Some(json!("a")));
/// ```
pub fn any_to_json(value: AnyValue<'_>) -> Option<Value> {
    match value {
        AnyValue::Null => None,
        AnyValue::Boolean(b) => Some(Value::Bool(b)),
        AnyValue::Int8(v) => Some(Value::from(v)),
        AnyValue::Int16(v) => Some(Value::from(v)),
        AnyValue::Int32(v) => Some(Value::from(v)),
        AnyValue::Int64(v) => Some(Value::from(v)),
        AnyValue::UInt8(v) => Some(Value::from(v)),
        AnyValue::UInt16(v) => Some(Value::from(v)),
        AnyValue::UInt32(v) => Some(Value::from(v)),
        AnyValue::UInt64(v) => Some(Value::from(v)),
        AnyValue::Float32(v) => Number::from_f64(f64::from(v)).map(Value::Number),
        AnyValue::Float64(v) => Number::from_f64(v).map(Value::Number),
        AnyValue::String(s) => Some(Value::String(s.to_string())),
        AnyValue::StringOwned(s) => Some(Value::String(s.to_string())),
        AnyValue::Date(days) => date_from_epoch_days(days)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string())),
        other => Some(Value::String(other.to_string())),
    }
}

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null` and formats floats without unnecessary
/// trailing zeros. Used for diagnostics and for string-typed date columns.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use faas_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decodes a Polars `Date` physical value (days since the Unix epoch).
pub fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Decodes a Polars `Datetime` physical value in the given unit.
///
/// The physical value counts from the Unix epoch in UTC, so the result is the
/// UTC date-time of the instant, whatever time zone the column carries.
pub fn datetime_from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    utc.map(|dt| dt.naive_utc())
}
