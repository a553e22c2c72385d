//! Model spec normalization.
//!
//! Raw configuration arrives as a JSON object with wire spelling
//! (`seas.d`, `selection_methods.lasso`, ...). [`normalize_model_spec`] checks
//! that every required key is present and typed, producing a [`ModelSpec`].
//! [`to_wire`] then shapes a spec for transport: scalars wrapped as
//! one-element vectors, list entries sanitized, and the fixed collinearity
//! priority attached.
//!
//! Keys outside the required set, at the top level and inside
//! `selection_methods`, are forwarded under their sanitized spelling. Two keys
//! that would share a wire name are rejected.

use std::collections::BTreeMap;

use faas_common::{sanitize_all, sanitize_identifier};
use faas_model::{
    APPLY_COLLINEAR, ModelSpec, REQUIRED_SELECTION_KEYS, REQUIRED_SPEC_KEYS, Result,
    SelectionMethods, Singleton, ValidationError, WireModelSpec, WireSelectionMethods,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const SELECTION_METHODS: &str = "selection_methods";
const APPLY_COLLINEAR_KEY: &str = "apply.collinear";
/// Names inside `selection_methods` that the wire shape fills itself.
const RESERVED_SELECTION_KEYS: [&str; 4] = ["lasso", "rf", "corr", APPLY_COLLINEAR_KEY];

/// Validate and type a raw model spec.
///
/// # Errors
///
/// - [`ValidationError::InvalidSpec`] when `raw` is not an object
/// - [`ValidationError::MissingSpecKey`] naming the first absent key
/// - [`ValidationError::InvalidSpecValue`] when a value has the wrong type,
///   or when an extra key sanitizes to a name already in use
pub fn normalize_model_spec(raw: &Value) -> Result<ModelSpec> {
    let object = raw
        .as_object()
        .ok_or_else(|| ValidationError::InvalidSpec("expected a key/value object".to_string()))?;

    for key in REQUIRED_SPEC_KEYS {
        if !object.contains_key(key) {
            return Err(ValidationError::MissingSpecKey(key.to_string()).into());
        }
    }

    let methods = object
        .get(SELECTION_METHODS)
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(SELECTION_METHODS, "expected a key/value object"))?;
    for key in REQUIRED_SELECTION_KEYS {
        if !methods.contains_key(key) {
            return Err(ValidationError::MissingSpecKey(format!("{SELECTION_METHODS}.{key}")).into());
        }
    }
    if methods.contains_key(APPLY_COLLINEAR_KEY) {
        debug!("caller-supplied apply.collinear replaced by the protocol default");
    }

    let extra = pass_through(object, &REQUIRED_SPEC_KEYS, "")?;
    let selection_extra = pass_through(
        methods,
        &RESERVED_SELECTION_KEYS,
        &format!("{SELECTION_METHODS}."),
    )?;

    let spec = ModelSpec {
        log: bool_field(object, "log")?,
        seas_d: bool_field(object, "seas.d")?,
        n_steps: count_field(object, "n_steps")?,
        n_windows: count_field(object, "n_windows")?,
        n_best: count_field(object, "n_best")?,
        accuracy_crit: string_field(object, "accuracy_crit")?,
        info_crit: string_field(object, "info_crit")?,
        exclusions: exclusions_field(object)?,
        golden_variables: string_list(object, "golden_variables")?,
        fill_forecast: bool_field(object, "fill_forecast")?,
        cv_summary: string_field(object, "cv_summary")?,
        selection_methods: SelectionMethods {
            lasso: nested_bool(methods, "lasso")?,
            rf: nested_bool(methods, "rf")?,
            corr: nested_bool(methods, "corr")?,
            extra: selection_extra,
        },
        extra,
    };
    debug!(
        n_steps = spec.n_steps,
        n_windows = spec.n_windows,
        extra_keys = spec.extra.len(),
        "model spec normalized"
    );
    Ok(spec)
}

/// Shape a spec for the wire.
pub fn to_wire(spec: &ModelSpec) -> WireModelSpec {
    WireModelSpec {
        log: Singleton(spec.log),
        seas_d: Singleton(spec.seas_d),
        n_steps: Singleton(spec.n_steps),
        n_windows: Singleton(spec.n_windows),
        n_best: Singleton(spec.n_best),
        accuracy_crit: Singleton(spec.accuracy_crit.clone()),
        info_crit: Singleton(spec.info_crit.clone()),
        exclusions: spec.exclusions.iter().map(sanitize_all).collect(),
        golden_variables: sanitize_all(&spec.golden_variables),
        fill_forecast: Singleton(spec.fill_forecast),
        cv_summary: Singleton(spec.cv_summary.clone()),
        selection_methods: WireSelectionMethods {
            lasso: Singleton(spec.selection_methods.lasso),
            rf: Singleton(spec.selection_methods.rf),
            corr: Singleton(spec.selection_methods.corr),
            apply_collinear: APPLY_COLLINEAR,
            extra: wire_extras(&spec.selection_methods.extra, &RESERVED_SELECTION_KEYS),
        },
        extra: wire_extras(&spec.extra, &REQUIRED_SPEC_KEYS),
    }
}

/// Normalization entry points as methods on [`ModelSpec`].
pub trait ModelSpecExt: Sized {
    /// See [`normalize_model_spec`].
    fn from_value(raw: &Value) -> Result<Self>;
    /// See [`to_wire`].
    fn to_wire(&self) -> WireModelSpec;
}

impl ModelSpecExt for ModelSpec {
    fn from_value(raw: &Value) -> Result<Self> {
        normalize_model_spec(raw)
    }

    fn to_wire(&self) -> WireModelSpec {
        to_wire(self)
    }
}

/// Entries of `object` outside `reserved`, checked for wire-name clashes.
fn pass_through(
    object: &Map<String, Value>,
    reserved: &[&str],
    path: &str,
) -> Result<BTreeMap<String, Value>> {
    let mut taken: BTreeMap<String, &str> = BTreeMap::new();
    let mut extra = BTreeMap::new();
    for (key, value) in object {
        if reserved.contains(&key.as_str()) {
            continue;
        }
        let wire = sanitize_identifier(key);
        if reserved.contains(&wire.as_str()) {
            return Err(invalid(
                &format!("{path}{key}"),
                &format!("sanitizes to the required key '{wire}'"),
            )
            .into());
        }
        if let Some(other) = taken.insert(wire.clone(), key) {
            return Err(invalid(
                &format!("{path}{key}"),
                &format!("sanitizes to '{wire}', same as '{other}'"),
            )
            .into());
        }
        extra.insert(key.clone(), value.clone());
    }
    Ok(extra)
}

/// Sanitized, vector-shaped extras; clashing entries of a hand-built spec are dropped.
fn wire_extras(extra: &BTreeMap<String, Value>, reserved: &[&str]) -> BTreeMap<String, Value> {
    let mut wire = BTreeMap::new();
    for (key, value) in extra {
        let name = sanitize_identifier(key);
        if reserved.contains(&name.as_str()) || wire.contains_key(&name) {
            warn!(key = %key, wire = %name, "extra spec key clashes on the wire, dropped");
            continue;
        }
        wire.insert(name, vector_shaped(value));
    }
    wire
}

fn vector_shaped(value: &Value) -> Value {
    match value {
        Value::Array(_) => value.clone(),
        other => Value::Array(vec![other.clone()]),
    }
}

/// Accept `x` or an already-wrapped `[x]`.
fn scalar<'a>(key: &str, value: &'a Value) -> Result<&'a Value> {
    match value {
        Value::Array(items) if items.len() == 1 => Ok(&items[0]),
        Value::Array(_) => Err(invalid(key, "expected a single value").into()),
        other => Ok(other),
    }
}

fn bool_value(key: &str, value: &Value) -> Result<bool> {
    match scalar(key, value)? {
        Value::Bool(b) => Ok(*b),
        other => Err(invalid(key, &format!("expected a boolean, got {other}")).into()),
    }
}

fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    object
        .get(key)
        .ok_or_else(|| ValidationError::MissingSpecKey(key.to_string()).into())
}

fn bool_field(object: &Map<String, Value>, key: &str) -> Result<bool> {
    bool_value(key, field(object, key)?)
}

fn nested_bool(methods: &Map<String, Value>, key: &str) -> Result<bool> {
    let path = format!("{SELECTION_METHODS}.{key}");
    let value = methods
        .get(key)
        .ok_or_else(|| ValidationError::MissingSpecKey(path.clone()))?;
    bool_value(&path, value)
}

fn count_field(object: &Map<String, Value>, key: &str) -> Result<u32> {
    let value = scalar(key, field(object, key)?)?;
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(key, &format!("expected a non-negative integer, got {value}")).into())
}

fn string_field(object: &Map<String, Value>, key: &str) -> Result<String> {
    match scalar(key, field(object, key)?)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(invalid(key, &format!("expected a string, got {other}")).into()),
    }
}

fn strings(key: &str, value: &Value) -> Result<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => return Err(invalid(key, &format!("expected a list, got {other}")).into()),
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(invalid(key, &format!("expected string entries, got {other}")).into()),
        })
        .collect()
}

fn string_list(object: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    strings(key, field(object, key)?)
}

fn exclusions_field(object: &Map<String, Value>) -> Result<Vec<Vec<String>>> {
    const KEY: &str = "exclusions";
    match field(object, KEY)? {
        Value::Array(groups) => groups.iter().map(|group| strings(KEY, group)).collect(),
        Value::Null => Ok(Vec::new()),
        other => Err(invalid(KEY, &format!("expected a list of lists, got {other}")).into()),
    }
}

fn invalid(key: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidSpecValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
