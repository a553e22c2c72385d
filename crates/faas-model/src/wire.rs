//! Wire shapes expected by the forecasting service.
//!
//! The service deserializes every configuration value as a vector, so
//! scalars travel as one-element arrays.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

/// Variable-reduction priority sent as `selection_methods.apply.collinear`.
pub const APPLY_COLLINEAR: [&str; 4] = ["corr", "rf", "lasso", "no_reduction"];

/// A scalar serialized as a one-element sequence.
///
/// # Examples
///
/// ```
/// use faas_model::Singleton;
///
/// let json = serde_json::to_string(&Singleton(true)).unwrap();
/// assert_eq!(json, "[true]");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Singleton<T>(pub T);

impl<T: Serialize> Serialize for Singleton<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.0)?;
        seq.end()
    }
}

impl<T> From<T> for Singleton<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

/// Model configuration in the shape the service deserializes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WireModelSpec {
    pub log: Singleton<bool>,
    #[serde(rename = "seas.d")]
    pub seas_d: Singleton<bool>,
    pub n_steps: Singleton<u32>,
    pub n_windows: Singleton<u32>,
    pub n_best: Singleton<u32>,
    pub accuracy_crit: Singleton<String>,
    pub info_crit: Singleton<String>,
    pub exclusions: Vec<Vec<String>>,
    pub golden_variables: Vec<String>,
    pub fill_forecast: Singleton<bool>,
    pub cv_summary: Singleton<String>,
    pub selection_methods: WireSelectionMethods,
    /// Pass-through keys, already vector-shaped.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Selection method flags plus the fixed collinearity priority.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WireSelectionMethods {
    pub lasso: Singleton<bool>,
    pub rf: Singleton<bool>,
    pub corr: Singleton<bool>,
    #[serde(rename = "apply.collinear")]
    pub apply_collinear: [&'static str; 4],
    /// Pass-through method switches, already vector-shaped.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn singleton_wraps_scalars() {
        assert_eq!(serde_json::to_value(Singleton(12u32)).unwrap(), json!([12]));
        assert_eq!(
            serde_json::to_value(Singleton("MAPE".to_string())).unwrap(),
            json!(["MAPE"])
        );
    }

    #[test]
    fn selection_methods_use_dotted_key() {
        let methods = WireSelectionMethods {
            lasso: Singleton(true),
            rf: Singleton(false),
            corr: Singleton(true),
            apply_collinear: APPLY_COLLINEAR,
            extra: BTreeMap::from([("elastic_net".to_string(), json!([false]))]),
        };
        assert_eq!(
            serde_json::to_value(&methods).unwrap(),
            json!({
                "lasso": [true],
                "rf": [false],
                "corr": [true],
                "apply.collinear": ["corr", "rf", "lasso", "no_reduction"],
                "elastic_net": [false]
            })
        );
    }
}
