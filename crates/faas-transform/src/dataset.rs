//! Dataset canonicalization.
//!
//! Turns caller tables into the positional bundle the service expects:
//! date column resolved to text, date and target columns first, column names
//! sanitized, rows converted to sparse records, datasets relabelled
//! `forecast_<N>_<name>`.

use std::collections::HashSet;

use faas_common::{any_to_json, sanitize_identifier};
use faas_model::{CanonicalRecord, DatasetBundle, FaasError, Result, SchemaError};
use serde_json::Value;
use tracing::{debug, trace};

use crate::datetime::resolve_date_column;
use crate::frame::NamedTable;

/// Canonicalize every table, numbering them in slice order.
pub fn canonicalize_datasets(
    tables: &[NamedTable],
    date_variable: &str,
    date_format: Option<&str>,
) -> Result<DatasetBundle> {
    let mut bundle = DatasetBundle::new();
    for table in tables {
        let records = canonicalize_table(table, date_variable, date_format)?;
        let label = bundle.push(&sanitize_identifier(&table.name), records);
        debug!(dataset = %table.name, label, "dataset canonicalized");
    }
    debug!(
        datasets = bundle.len(),
        records = bundle.record_count(),
        "dataset bundle built"
    );
    Ok(bundle)
}

/// Canonicalize one table into sparse records.
pub fn canonicalize_table(
    table: &NamedTable,
    date_variable: &str,
    date_format: Option<&str>,
) -> Result<Vec<CanonicalRecord>> {
    if !table.has_target() {
        return Err(SchemaError::MissingTargetColumn {
            dataset: table.name.clone(),
        }
        .into());
    }
    if !table.has_column(date_variable) {
        return Err(SchemaError::MissingDateColumn {
            dataset: table.name.clone(),
            column: date_variable.to_string(),
        }
        .into());
    }

    let dates = resolve_date_column(&table.data, date_variable, date_format)?;
    let order = column_order(&table.column_names(), date_variable, &table.name);
    let names = sanitized_names(&order, &table.name)?;

    let height = table.record_count();
    let mut records: Vec<CanonicalRecord> = (0..height)
        .map(|_| CanonicalRecord::with_capacity(order.len()))
        .collect();
    let mut dropped = 0usize;

    for (source, name) in order.iter().zip(&names) {
        if source == date_variable {
            for (record, date) in records.iter_mut().zip(&dates) {
                match date {
                    Some(date) => record.insert(name.clone(), Value::String(date.clone())),
                    None => dropped += 1,
                }
            }
            continue;
        }

        let series = table
            .data
            .column(source)
            .map_err(|e| FaasError::Frame(e.to_string()))?;
        for (idx, record) in records.iter_mut().enumerate() {
            let cell = series
                .get(idx)
                .map_err(|e| FaasError::Frame(e.to_string()))?;
            match any_to_json(cell) {
                Some(value) => record.insert(name.clone(), value),
                None => dropped += 1,
            }
        }
    }

    debug!(
        dataset = %table.name,
        rows = height,
        columns = names.len(),
        "table converted to records"
    );
    trace!(dataset = %table.name, dropped, "missing cells omitted");
    Ok(records)
}

/// Date column first, target second, remaining columns in frame order.
///
/// # Examples
///
/// ```
/// use faas_transform::dataset::column_order;
///
/// let columns = vec!["promo".to_string(), "sales".to_string(), "date".to_string()];
/// assert_eq!(column_order(&columns, "date", "sales"), vec!["date", "sales", "promo"]);
/// ```
pub fn column_order(columns: &[String], date_variable: &str, target: &str) -> Vec<String> {
    let mut order = Vec::with_capacity(columns.len());
    order.push(date_variable.to_string());
    if target != date_variable {
        order.push(target.to_string());
    }
    order.extend(
        columns
            .iter()
            .filter(|column| column.as_str() != date_variable && column.as_str() != target)
            .cloned(),
    );
    order
}

fn sanitized_names(order: &[String], dataset: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::with_capacity(order.len());
    let mut names = Vec::with_capacity(order.len());
    for column in order {
        let name = sanitize_identifier(column);
        if !seen.insert(name.clone()) {
            return Err(SchemaError::DuplicateColumn {
                dataset: dataset.to_string(),
                column: name,
            }
            .into());
        }
        names.push(name);
    }
    Ok(names)
}
