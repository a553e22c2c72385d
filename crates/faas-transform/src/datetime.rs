//! Date column resolution.
//!
//! The service reads the date variable as text and parses it with the
//! caller's `date_format`. Every cell of the date column is therefore
//! rendered to a string here:
//!
//! - string cells are parsed with the format and re-rendered with it, so a
//!   value that would not parse remotely is rejected locally
//! - native `Date`/`Datetime` cells are rendered directly, with the format
//!   when one is given; time-zone aware columns other than UTC are rejected
//! - formats without a day or without a month (monthly, yearly series) pin
//!   the missing fields to 01
//! - without a format, strings pass through and temporal cells use
//!   `%Y-%m-%d` / `%Y-%m-%d %H:%M:%S`

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use faas_common::{any_to_string, date_from_epoch_days, datetime_from_epoch};
use faas_model::{FaasError, Result, ValidationError};
use polars::prelude::{AnyValue, DataFrame, TimeUnit};

/// Rendering used for native dates when no format is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendering used for native date-times when no format is configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Check that a date format is a usable strftime pattern.
///
/// # Examples
///
/// ```
/// use faas_transform::datetime::validate_date_format;
///
/// assert!(validate_date_format("%Y-%m-%d").is_ok());
/// assert!(validate_date_format("%Y-%Q").is_err());
/// ```
pub fn validate_date_format(format: &str) -> std::result::Result<(), ValidationError> {
    if format.trim().is_empty() {
        return Err(invalid_format(format, "format is empty"));
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid_format(format, "unrecognized format specifier"));
    }
    Ok(())
}

/// Resolve one date column into per-row strings.
///
/// `None` marks a missing cell; the caller omits it from the record.
pub fn resolve_date_column(
    data: &DataFrame,
    column: &str,
    format: Option<&str>,
) -> Result<Vec<Option<String>>> {
    if let Some(format) = format {
        validate_date_format(format)?;
    }

    let series = data
        .column(column)
        .map_err(|e| FaasError::Frame(e.to_string()))?;

    let mut values = Vec::with_capacity(data.height());
    for idx in 0..data.height() {
        let cell = series
            .get(idx)
            .map_err(|e| FaasError::Frame(e.to_string()))?;
        values.push(resolve_cell(cell, column, format)?);
    }
    Ok(values)
}

fn resolve_cell(cell: AnyValue<'_>, column: &str, format: Option<&str>) -> Result<Option<String>> {
    match cell {
        AnyValue::Null => Ok(None),
        AnyValue::Date(days) => {
            let Some(date) = date_from_epoch_days(days) else {
                return Ok(None);
            };
            let rendered = render(
                date.and_time(NaiveTime::MIN),
                format.unwrap_or(DEFAULT_DATE_FORMAT),
            )?;
            Ok(Some(rendered))
        }
        AnyValue::Datetime(value, unit, zone) => {
            let zone = zone.map(|zone| zone.to_string());
            resolve_datetime(value, unit, zone.as_deref(), column, format)
        }
        AnyValue::DatetimeOwned(value, unit, zone) => {
            let zone = zone.as_ref().map(|zone| zone.to_string());
            resolve_datetime(value, unit, zone.as_deref(), column, format)
        }
        other => {
            let text = any_to_string(other);
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            match format {
                None => Ok(Some(text.to_string())),
                Some(format) => {
                    let parsed = parse_with_format(text, format).ok_or_else(|| {
                        ValidationError::DateParse {
                            column: column.to_string(),
                            value: text.to_string(),
                            format: format.to_string(),
                        }
                    })?;
                    Ok(Some(render(parsed, format)?))
                }
            }
        }
    }
}

/// Render a `Datetime` cell. Physical values are UTC instants, so only naive
/// and UTC columns keep their wall-clock date.
fn resolve_datetime(
    value: i64,
    unit: TimeUnit,
    zone: Option<&str>,
    column: &str,
    format: Option<&str>,
) -> Result<Option<String>> {
    if let Some(zone) = zone.filter(|zone| !is_utc(zone)) {
        return Err(ValidationError::ZonedDate {
            column: column.to_string(),
            timezone: zone.to_string(),
        }
        .into());
    }
    let Some(datetime) = datetime_from_epoch(value, unit) else {
        return Ok(None);
    };
    Ok(Some(render(
        datetime,
        format.unwrap_or(DEFAULT_DATETIME_FORMAT),
    )?))
}

fn is_utc(zone: &str) -> bool {
    matches!(zone, "UTC" | "Etc/UTC" | "Z" | "+00:00")
}

/// Parse a value as a date-time, a date, a year-month or a year.
fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
        return Some(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    // Monthly series carry no day, yearly series neither day nor month.
    NaiveDate::parse_from_str(&format!("{value} 01"), &format!("{format} %d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value} 01 01"), &format!("{format} %m %d")))
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn render(datetime: NaiveDateTime, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", datetime.format(format)).map_err(|_| {
        invalid_format(format, "format cannot be rendered for a local date-time")
    })?;
    Ok(out)
}

fn invalid_format(format: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidDateFormat {
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn frame(values: &[Option<&str>]) -> DataFrame {
        let series = Series::new("data_tidy".into(), values);
        DataFrame::new(vec![series.into_column()]).expect("build frame")
    }

    #[test]
    fn string_dates_are_normalized_with_format() {
        let df = frame(&[Some("2020-1-5"), Some(" 2020-02-01 "), None]);
        let values = resolve_date_column(&df, "data_tidy", Some("%Y-%m-%d")).unwrap();
        assert_eq!(
            values,
            vec![
                Some("2020-01-05".to_string()),
                Some("2020-02-01".to_string()),
                None
            ]
        );
    }

    #[test]
    fn day_first_format_round_trips() {
        let df = frame(&[Some("31/01/2021")]);
        let values = resolve_date_column(&df, "data_tidy", Some("%d/%m/%Y")).unwrap();
        assert_eq!(values, vec![Some("31/01/2021".to_string())]);
    }

    #[test]
    fn monthly_values_parse() {
        let df = frame(&[Some("2021-03")]);
        let values = resolve_date_column(&df, "data_tidy", Some("%Y-%m")).unwrap();
        assert_eq!(values, vec![Some("2021-03".to_string())]);
    }

    #[test]
    fn mismatched_value_names_format() {
        let df = frame(&[Some("2020-01-01"), Some("01/02/2020")]);
        let err = resolve_date_column(&df, "data_tidy", Some("%Y-%m-%d")).unwrap_err();
        match err {
            FaasError::Validation(ValidationError::DateParse {
                column,
                value,
                format,
            }) => {
                assert_eq!(column, "data_tidy");
                assert_eq!(value, "01/02/2020");
                assert_eq!(format, "%Y-%m-%d");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_format_is_rejected() {
        let df = frame(&[Some("2020-01-01")]);
        let err = resolve_date_column(&df, "data_tidy", Some("%Y-%Q")).unwrap_err();
        assert!(matches!(
            err,
            FaasError::Validation(ValidationError::InvalidDateFormat { .. })
        ));
        assert!(validate_date_format("   ").is_err());
    }

    #[test]
    fn strings_pass_through_without_format() {
        let df = frame(&[Some("2020 Q1"), Some("")]);
        let values = resolve_date_column(&df, "data_tidy", None).unwrap();
        assert_eq!(values, vec![Some("2020 Q1".to_string()), None]);
    }

    #[test]
    fn native_dates_are_stringified() {
        let dates = [
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
        ];
        let series = Series::new("data_tidy".into(), &dates[..]);
        let df = DataFrame::new(vec![series.into_column()]).unwrap();

        let values = resolve_date_column(&df, "data_tidy", None).unwrap();
        assert_eq!(
            values,
            vec![Some("2020-01-01".to_string()), Some("2020-02-01".to_string())]
        );

        let values = resolve_date_column(&df, "data_tidy", Some("%d/%m/%Y")).unwrap();
        assert_eq!(
            values,
            vec![Some("01/01/2020".to_string()), Some("01/02/2020".to_string())]
        );
    }

    #[test]
    fn yearly_text_values_parse() {
        let df = frame(&[Some("2019"), Some("2020")]);
        let values = resolve_date_column(&df, "data_tidy", Some("%Y")).unwrap();
        assert_eq!(
            values,
            vec![Some("2019".to_string()), Some("2020".to_string())]
        );
    }

    #[test]
    fn yearly_integer_values_parse() {
        let series = Series::new("ano".into(), &[Some(2019i64), None, Some(2021)]);
        let df = DataFrame::new(vec![series.into_column()]).unwrap();
        let values = resolve_date_column(&df, "ano", Some("%Y")).unwrap();
        assert_eq!(
            values,
            vec![Some("2019".to_string()), None, Some("2021".to_string())]
        );
    }

    #[test]
    fn native_datetimes_are_stringified() {
        let stamps = [
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 2)
                .unwrap()
                .and_hms_opt(13, 30, 5)
                .unwrap(),
        ];
        let series = Series::new("data_tidy".into(), &stamps[..]);
        let df = DataFrame::new(vec![series.into_column()]).unwrap();

        let values = resolve_date_column(&df, "data_tidy", None).unwrap();
        assert_eq!(
            values,
            vec![
                Some("2020-01-01 00:00:00".to_string()),
                Some("2020-01-02 13:30:05".to_string())
            ]
        );

        let values = resolve_date_column(&df, "data_tidy", Some("%Y-%m-%d")).unwrap();
        assert_eq!(
            values,
            vec![Some("2020-01-01".to_string()), Some("2020-01-02".to_string())]
        );
    }

    #[test]
    fn zoned_datetimes_are_rejected() {
        // Local midnight in Tokyo is 15:00 UTC on the previous day.
        let instant = NaiveDate::from_ymd_opt(2019, 12, 31)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();

        let err = resolve_datetime(
            instant,
            TimeUnit::Milliseconds,
            Some("Asia/Tokyo"),
            "data_tidy",
            Some("%Y-%m-%d"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FaasError::Validation(ValidationError::ZonedDate { ref timezone, .. }) if timezone == "Asia/Tokyo"
        ));

        let utc = resolve_datetime(
            instant,
            TimeUnit::Milliseconds,
            Some("UTC"),
            "data_tidy",
            Some("%Y-%m-%d"),
        )
        .unwrap();
        assert_eq!(utc, Some("2019-12-31".to_string()));
    }

    #[test]
    fn missing_column_is_a_frame_error() {
        let df = frame(&[Some("2020-01-01")]);
        let err = resolve_date_column(&df, "date", None).unwrap_err();
        assert!(matches!(err, FaasError::Frame(_)));
    }
}
