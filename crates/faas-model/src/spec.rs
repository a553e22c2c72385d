//! Model configuration submitted alongside the datasets.

use std::collections::BTreeMap;

use serde_json::Value;

/// Top-level keys every raw model spec must carry, in wire spelling.
pub const REQUIRED_SPEC_KEYS: [&str; 12] = [
    "log",
    "seas.d",
    "n_steps",
    "n_windows",
    "n_best",
    "accuracy_crit",
    "info_crit",
    "exclusions",
    "golden_variables",
    "fill_forecast",
    "cv_summary",
    "selection_methods",
];

/// Keys every raw `selection_methods` block must carry.
pub const REQUIRED_SELECTION_KEYS: [&str; 3] = ["lasso", "rf", "corr"];

/// Variable selection methods the service may apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMethods {
    pub lasso: bool,
    pub rf: bool,
    pub corr: bool,
    /// Further method switches forwarded to the service untouched.
    pub extra: BTreeMap<String, Value>,
}

impl Default for SelectionMethods {
    fn default() -> Self {
        Self {
            lasso: true,
            rf: true,
            corr: true,
            extra: BTreeMap::new(),
        }
    }
}

/// Typed model configuration.
///
/// Field names follow the wire keys; `seas_d` travels as `seas.d`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    /// Apply a log transformation to the series.
    pub log: bool,
    /// Apply seasonal differencing.
    pub seas_d: bool,
    /// Forecast horizon.
    pub n_steps: u32,
    /// Number of cross-validation windows.
    pub n_windows: u32,
    /// Number of best models to keep.
    pub n_best: u32,
    /// Accuracy criterion, e.g. `MAPE`.
    pub accuracy_crit: String,
    /// Information criterion, e.g. `AIC`.
    pub info_crit: String,
    /// Groups of mutually exclusive variables.
    pub exclusions: Vec<Vec<String>>,
    /// Variables always retained by selection.
    pub golden_variables: Vec<String>,
    /// Fill explanatory variables forward with their own forecasts.
    pub fill_forecast: bool,
    /// Cross-validation summary statistic, e.g. `average`.
    pub cv_summary: String,
    pub selection_methods: SelectionMethods,
    /// Additional keys forwarded to the service untouched.
    pub extra: BTreeMap<String, Value>,
}

impl ModelSpec {
    /// Create a spec with the service's customary defaults.
    pub fn new(n_steps: u32, n_windows: u32) -> Self {
        Self {
            log: true,
            seas_d: true,
            n_steps,
            n_windows,
            n_best: 20,
            accuracy_crit: "MAPE".to_string(),
            info_crit: "AIC".to_string(),
            exclusions: Vec::new(),
            golden_variables: Vec::new(),
            fill_forecast: false,
            cv_summary: "average".to_string(),
            selection_methods: SelectionMethods::default(),
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_golden_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.golden_variables = variables.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, exclusions: Vec<Vec<String>>) -> Self {
        self.exclusions = exclusions;
        self
    }

    #[must_use]
    pub fn with_selection_methods(mut self, methods: SelectionMethods) -> Self {
        self.selection_methods = methods;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let spec = ModelSpec::new(12, 3);
        assert_eq!(spec.n_steps, 12);
        assert_eq!(spec.n_windows, 3);
        assert_eq!(spec.accuracy_crit, "MAPE");
        assert!(spec.selection_methods.lasso);
        assert!(spec.selection_methods.extra.is_empty());
        assert!(spec.extra.is_empty());
    }

    #[test]
    fn builders() {
        let spec = ModelSpec::new(6, 2)
            .with_golden_variables(["x1", "x2"])
            .with_exclusions(vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(spec.golden_variables, vec!["x1", "x2"]);
        assert_eq!(spec.exclusions.len(), 1);
    }
}
