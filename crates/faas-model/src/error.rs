//! Error types for the FaaS client.

use thiserror::Error;

/// Malformed caller input, detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The user email has no `@`.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// A required model spec key is absent.
    #[error("model spec is missing required key '{0}'")]
    MissingSpecKey(String),

    /// A model spec key is present with an unusable value.
    #[error("invalid model spec value for '{key}': {reason}")]
    InvalidSpecValue { key: String, reason: String },

    /// The raw model spec is not a key/value structure.
    #[error("invalid model spec: {0}")]
    InvalidSpec(String),

    /// The date format is not a usable strftime pattern.
    #[error("invalid date format '{format}': {reason}")]
    InvalidDateFormat { format: String, reason: String },

    /// A date cell does not match the configured date format.
    #[error("value '{value}' in column '{column}' does not match date format '{format}'")]
    DateParse {
        column: String,
        value: String,
        format: String,
    },

    /// The date column is time-zone aware; only naive or UTC values are sent.
    #[error("date variable '{column}' is in time zone '{timezone}'; convert it to local wall-clock time first")]
    ZonedDate { column: String, timezone: String },
}

/// Structural mismatch between a dataset and its declared roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The dataset has no column named after itself.
    #[error("variable '{dataset}' not found in the dataset")]
    MissingTargetColumn { dataset: String },

    /// The dataset has no date column.
    #[error("date variable '{column}' not found in dataset '{dataset}'")]
    MissingDateColumn { dataset: String, column: String },

    /// Two columns collapse to the same name after sanitization.
    #[error("column '{column}' appears more than once in dataset '{dataset}' after sanitization")]
    DuplicateColumn { dataset: String, column: String },
}

/// Errors that can occur while preparing or submitting a request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FaasError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A dataset does not have the expected shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The service answered with a non-success status.
    #[error("request failed with status {status} after {attempts} attempt(s): {body}")]
    Remote {
        /// HTTP status code of the final response.
        status: u16,
        /// Raw response body, for diagnostics.
        body: String,
        /// Number of attempts performed.
        attempts: u32,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Serializing or compressing the payload failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Reading a dataset failed.
    #[error("DataFrame operation failed: {0}")]
    Frame(String),
}

impl FaasError {
    /// Returns a short message suitable for end-user display.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(_) => "The request is invalid. Please check the input values.",
            Self::Schema(_) => "A dataset does not have the expected columns.",
            Self::Remote { status, .. } if *status >= 500 => {
                "The forecasting service is unavailable. Please try again later."
            }
            Self::Remote { .. } => "The forecasting service rejected the request.",
            Self::Network(_) => {
                "Could not reach the forecasting service. Please check your internet connection."
            }
            Self::Encoding(_) | Self::Frame(_) => "An unexpected error occurred.",
        }
    }

    /// Returns whether submitting the same request again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { status, .. } => *status == 500,
            Self::Network(_) => true,
            _ => false,
        }
    }

    /// HTTP status of a remote failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for FaaS operations.
pub type Result<T> = std::result::Result<T, FaasError>;
