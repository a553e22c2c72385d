//! Request envelope assembly and body encoding.
//!
//! The service expects a single form field `body` holding the JSON envelope,
//! gzip-compressed and base64-encoded (standard alphabet, padded).

use std::fmt;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use faas_common::sanitize_identifier;
use faas_model::{DatasetBundle, FaasError, Result, Singleton, ValidationError, WireModelSpec};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::logging::redact_value;

/// Value of the `Content-Encoding` header sent with every request.
pub const CONTENT_ENCODING: &str = "gzip";

/// Caller metadata carried alongside the datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Address the results are delivered to.
    pub user_email: String,
    pub project_id: String,
    pub date_variable: String,
    /// strftime pattern of the date variable.
    pub date_format: String,
}

impl RequestMetadata {
    pub fn new(
        user_email: impl Into<String>,
        project_id: impl Into<String>,
        date_variable: impl Into<String>,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            user_email: user_email.into(),
            project_id: project_id.into(),
            date_variable: date_variable.into(),
            date_format: date_format.into(),
        }
    }

    /// Check the user email before any other work.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.user_email.contains('@') {
            Ok(())
        } else {
            Err(ValidationError::InvalidEmail(self.user_email.clone()))
        }
    }
}

/// The JSON document the service decodes from the `body` field.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub data_list: &'a DatasetBundle,
    pub model_spec: &'a WireModelSpec,
    pub user_email: Singleton<&'a str>,
    pub project_id: Singleton<&'a str>,
    pub date_variable: Singleton<String>,
    pub date_format: Singleton<&'a str>,
}

impl<'a> RequestEnvelope<'a> {
    /// The date variable is sanitized to match the record keys.
    pub fn new(
        bundle: &'a DatasetBundle,
        spec: &'a WireModelSpec,
        metadata: &'a RequestMetadata,
    ) -> Self {
        Self {
            data_list: bundle,
            model_spec: spec,
            user_email: Singleton(metadata.user_email.as_str()),
            project_id: Singleton(metadata.project_id.as_str()),
            date_variable: Singleton(sanitize_identifier(&metadata.date_variable)),
            date_format: Singleton(metadata.date_format.as_str()),
        }
    }

    /// Serialize, gzip and base64-encode the envelope.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| FaasError::Encoding(e.to_string()))?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|e| FaasError::Encoding(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| FaasError::Encoding(e.to_string()))?;

        let encoded = STANDARD.encode(&compressed);
        debug!(
            json_bytes = json.len(),
            gzip_bytes = compressed.len(),
            body_bytes = encoded.len(),
            "request body encoded"
        );
        Ok(encoded)
    }
}

/// An encoded body plus the headers that accompany it.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedRequest {
    /// Base64 text of the gzip-compressed JSON envelope.
    pub body: String,
    /// Access key, sent verbatim as the `Authorization` header.
    pub authorization: String,
}

impl EncodedRequest {
    /// `Content-Encoding` and `Authorization` header pairs.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Encoding".to_string(), CONTENT_ENCODING.to_string()),
            ("Authorization".to_string(), self.authorization.clone()),
        ]
    }

    /// Decode the body back into its JSON envelope.
    pub fn decode(&self) -> Result<Value> {
        decode_body(&self.body)
    }
}

impl fmt::Debug for EncodedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedRequest")
            .field("body_len", &self.body.len())
            .field("authorization", &redact_value(&self.authorization))
            .finish()
    }
}

/// Build the encoded request for a prepared bundle and wire spec.
///
/// # Errors
///
/// [`ValidationError::InvalidEmail`] when the email has no `@`; this is
/// checked before anything is serialized.
pub fn build_request(
    bundle: &DatasetBundle,
    spec: &WireModelSpec,
    metadata: &RequestMetadata,
    access_key: &str,
) -> Result<EncodedRequest> {
    metadata.validate()?;
    let body = RequestEnvelope::new(bundle, spec, metadata).encode()?;
    Ok(EncodedRequest {
        body,
        authorization: access_key.to_string(),
    })
}

/// Reverse the body encoding: base64, then gunzip, then JSON.
pub fn decode_body(body: &str) -> Result<Value> {
    let compressed = STANDARD
        .decode(body)
        .map_err(|e| FaasError::Encoding(format!("invalid base64: {e}")))?;
    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| FaasError::Encoding(format!("invalid gzip stream: {e}")))?;
    serde_json::from_slice(&json).map_err(|e| FaasError::Encoding(format!("invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faas_model::{CanonicalRecord, ModelSpec};
    use faas_transform::to_wire;
    use serde_json::json;

    fn bundle() -> DatasetBundle {
        let mut record = CanonicalRecord::new();
        record.insert("data_tidy", json!("2020-01-01"));
        record.insert("sales", json!(5));
        let mut bundle = DatasetBundle::new();
        bundle.push("sales", vec![record]);
        bundle
    }

    fn metadata(email: &str) -> RequestMetadata {
        RequestMetadata::new(email, "demo", "data_tidy", "%Y-%m-%d")
    }

    #[test]
    fn invalid_email_is_rejected() {
        let spec = to_wire(&ModelSpec::new(12, 3));
        let err = build_request(&bundle(), &spec, &metadata("nobody"), "key").unwrap_err();
        assert!(matches!(
            err,
            FaasError::Validation(ValidationError::InvalidEmail(ref email)) if email == "nobody"
        ));
    }

    #[test]
    fn body_decodes_to_envelope() {
        let spec = to_wire(&ModelSpec::new(12, 3));
        let encoded = build_request(&bundle(), &spec, &metadata("a@b.com"), "key").unwrap();
        let decoded = encoded.decode().unwrap();
        assert_eq!(decoded["user_email"], json!(["a@b.com"]));
        assert_eq!(decoded["project_id"], json!(["demo"]));
        assert_eq!(decoded["date_variable"], json!(["data_tidy"]));
        assert_eq!(decoded["date_format"], json!(["%Y-%m-%d"]));
        assert_eq!(
            decoded["data_list"],
            json!({"forecast_1_sales": [{"data_tidy": "2020-01-01", "sales": 5}]})
        );
        assert_eq!(decoded["model_spec"]["n_steps"], json!([12]));
    }

    #[test]
    fn date_variable_is_sanitized() {
        let spec = to_wire(&ModelSpec::new(12, 3));
        let meta = RequestMetadata::new("a@b.com", "demo", "período", "%Y-%m");
        let decoded = build_request(&bundle(), &spec, &meta, "key")
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(decoded["date_variable"], json!(["periodo"]));
    }

    #[test]
    fn headers_carry_key_verbatim() {
        let spec = to_wire(&ModelSpec::new(12, 3));
        let encoded = build_request(&bundle(), &spec, &metadata("a@b.com"), "s3cr3t").unwrap();
        assert_eq!(
            encoded.headers(),
            vec![
                ("Content-Encoding".to_string(), "gzip".to_string()),
                ("Authorization".to_string(), "s3cr3t".to_string()),
            ]
        );
        assert!(!format!("{encoded:?}").contains("s3cr3t"));
    }

    #[test]
    fn garbage_bodies_fail_to_decode() {
        assert!(matches!(decode_body("not base64!"), Err(FaasError::Encoding(_))));
        let plain = STANDARD.encode(b"{}");
        assert!(matches!(decode_body(&plain), Err(FaasError::Encoding(_))));
    }
}
