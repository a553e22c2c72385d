//! Service variants and the thin response envelope.

use std::fmt;

use serde_json::Value;

/// Status codes the service uses to acknowledge a request.
pub const SUCCESS_STATUSES: [u16; 3] = [200, 201, 202];

/// The remote service variant a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Validates the request without modeling.
    Validate,
    /// Queues the modeling run.
    Model,
}

impl Service {
    /// URL path appended to the configured base URL.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Model => "cluster",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Validate => "validation",
            Self::Model => "modeling",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Returns whether a status acknowledges the request.
#[must_use]
pub fn is_success_status(status: u16) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// Parse a response body, keeping non-JSON text as a JSON string.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Extract `info.warning_list` when the body reports `status: "Warnings"`.
pub fn warning_list(body: &Value) -> Option<Vec<String>> {
    if body.get("status").and_then(Value::as_str) != Some("Warnings") {
        return None;
    }
    let list = body
        .get("info")
        .and_then(|info| info.get("warning_list"))
        .and_then(Value::as_array)?;
    Some(
        list.iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Outcome of an acknowledged call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub service: Service,
    pub status: u16,
    /// Parsed response body.
    pub body: Value,
    /// Warnings reported by the modeling service.
    pub warnings: Vec<String>,
    /// Number of HTTP attempts performed.
    pub attempts: u32,
}

impl CallResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Human-readable confirmation for display.
    #[must_use]
    pub fn confirmation(&self) -> String {
        match self.service {
            Service::Validate => format!(
                "HTTP {}: request successfully received and validated. \
                 The modeling call can now be made.",
                self.status
            ),
            Service::Model => format!(
                "HTTP {}: request successfully received. \
                 Results will soon be available in your Projects module.",
                self.status
            ),
        }
    }
}
