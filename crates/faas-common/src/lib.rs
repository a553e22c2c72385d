//! Shared utilities for FaaS client crates.
//!
//! This crate provides common utilities used across the workspace,
//! including identifier sanitization and Polars cell conversion helpers.

pub mod polars;
pub mod sanitize;

// Re-export commonly used functions at crate root for convenience
pub use crate::polars::{
    any_to_json, any_to_string, date_from_epoch_days, datetime_from_epoch, format_numeric,
};
pub use crate::sanitize::{sanitize_all, sanitize_identifier};
