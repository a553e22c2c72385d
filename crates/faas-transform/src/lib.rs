//! Request preparation for the FaaS client.
//!
//! This crate turns caller input into wire-ready structures:
//!
//! - **frame**: named input tables backed by Polars DataFrames
//! - **datetime**: date column parsing and rendering
//! - **dataset**: table canonicalization into the positional bundle
//! - **spec**: model spec validation and wire shaping

pub mod dataset;
pub mod datetime;
pub mod frame;
pub mod spec;

pub use dataset::{canonicalize_datasets, canonicalize_table, column_order};
pub use datetime::{resolve_date_column, validate_date_format};
pub use frame::NamedTable;
pub use spec::{ModelSpecExt, normalize_model_spec, to_wire};
