//! Client configuration.

use std::time::Duration;

use faas_model::Service;
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Production endpoint of the forecasting service.
pub const DEFAULT_BASE_URL: &str = "https://scalling-models-api-pixv2bua7q-uk.a.run.app/";

/// HTTP timeout for a single attempt (20 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);

/// Settings for [`FaasClient`](crate::FaasClient).
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use faas_submit::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"timeout": 60}"#).unwrap();
/// assert_eq!(config.timeout.as_secs(), 60);
/// assert_eq!(config.retry.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the service path is appended to.
    pub base_url: String,
    /// Per-attempt timeout, in seconds when serialized.
    #[serde(with = "seconds")]
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL for a service variant.
    #[must_use]
    pub fn endpoint(&self, service: Service) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, service.path())
        } else {
            format!("{}/{}", self.base_url, service.path())
        }
    }
}

/// `Duration` as fractional seconds.
pub(crate) mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
