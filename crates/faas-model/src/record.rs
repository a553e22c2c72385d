//! Canonical records and the positional dataset bundle.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// One table row as a sparse field mapping.
///
/// Null cells are never stored, so field presence is the only signal the
/// service consumes. Fields keep the column order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    fields: Vec<(String, Value)>,
}

impl CanonicalRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field. `Value::Null` is dropped rather than stored.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        if value.is_null() {
            return;
        }
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// True if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if every cell of the row was missing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Canonical datasets keyed by positional label (`forecast_<N>_<name>`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetBundle {
    entries: Vec<(String, Vec<CanonicalRecord>)>,
}

impl DatasetBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the positional label for the dataset at 1-based `position`.
    ///
    /// # Examples
    ///
    /// ```
    /// use faas_model::DatasetBundle;
    ///
    /// assert_eq!(DatasetBundle::label(1, "sales"), "forecast_1_sales");
    /// ```
    pub fn label(position: usize, name: &str) -> String {
        format!("forecast_{position}_{name}")
    }

    /// Append a dataset. Its position is the current length plus one.
    pub fn push(&mut self, name: &str, records: Vec<CanonicalRecord>) -> &str {
        let label = Self::label(self.entries.len() + 1, name);
        self.entries.push((label, records));
        &self.entries[self.entries.len() - 1].0
    }

    /// Records stored under a positional label.
    pub fn get(&self, label: &str) -> Option<&[CanonicalRecord]> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, records)| records.as_slice())
    }

    /// Labels in position order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Label/records pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CanonicalRecord])> {
        self.entries
            .iter()
            .map(|(label, records)| (label.as_str(), records.as_slice()))
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no dataset has been pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records across all datasets.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }
}

impl Serialize for DatasetBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, records) in &self.entries {
            map.serialize_entry(label, records)?;
        }
        map.end()
    }
}
