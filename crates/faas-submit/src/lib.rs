//! Client for the FaaS forecasting service.
//!
//! This crate ties the pipeline together and talks to the service:
//!
//! - **envelope**: request assembly and gzip/base64 body encoding
//! - **transport**: the HTTP seam, retries and response classification
//! - **retry**: retry policy and sleeper
//! - **config**: client settings
//! - **client**: [`FaasClient`] with `validate` and `run_model`
//! - **logging**: opt-in `tracing-subscriber` setup
//!
//! # Example
//!
//! ```no_run
//! use faas_model::ModelSpec;
//! use faas_submit::{SubmitRequest, validate};
//! use faas_transform::NamedTable;
//!
//! let sales = polars::df!("data_tidy" => ["2020-01-01"], "sales" => [5i32])?;
//! let request = SubmitRequest::new(
//!     vec![NamedTable::new("sales", sales)],
//!     "data_tidy",
//!     "%Y-%m-%d",
//!     ModelSpec::new(12, 3),
//! )
//! .with_project_id("demo")
//! .with_user_email("analyst@example.com")
//! .with_access_key("token");
//!
//! let result = validate(&request)?;
//! println!("{}", result.confirmation());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod logging;
pub mod retry;
pub mod transport;

pub use client::{FaasClient, SubmitRequest, run_model, validate};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use envelope::{EncodedRequest, RequestEnvelope, RequestMetadata, build_request, decode_body};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, Transport, classify, send_with_retry,
};
