//! Named input tables.
//!
//! A [`NamedTable`] pairs a Polars DataFrame with the dataset name the caller
//! keys it by. The name doubles as the forecast target: the frame must carry
//! a column with exactly that name.

use polars::prelude::DataFrame;

/// A caller-supplied dataset.
///
/// Tables are borrowed by the canonicalizer and never modified.
#[derive(Debug, Clone)]
pub struct NamedTable {
    /// Dataset name, also the target column.
    pub name: String,
    /// The dataset contents.
    pub data: DataFrame,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Returns the number of rows in the table.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether the frame has a column with exactly this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|column| column.as_str() == name)
    }

    /// Whether the target column (named after the dataset) is present.
    pub fn has_target(&self) -> bool {
        self.has_column(&self.name)
    }
}
