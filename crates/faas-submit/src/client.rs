//! Caller-facing client.
//!
//! A call runs the local pipeline (email check, dataset canonicalization,
//! wire spec, envelope encoding) and then posts the body through the
//! configured [`Transport`]. Every local failure happens before the first
//! network call.

use std::fmt;

use faas_model::{CallResult, ModelSpec, Result, Service};
use faas_transform::{NamedTable, canonicalize_datasets, to_wire};
use tracing::{debug, info_span};

use crate::config::ClientConfig;
use crate::envelope::{EncodedRequest, RequestMetadata, build_request};
use crate::retry::{Sleeper, ThreadSleeper};
use crate::transport::{HttpRequest, HttpTransport, Transport, send_with_retry};

/// Everything needed for one validation or modeling call.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Tables in submission order; each must contain a column named after it.
    pub datasets: Vec<NamedTable>,
    pub date_variable: String,
    /// strftime pattern of the date variable, e.g. `%Y-%m-%d`.
    pub date_format: String,
    pub model_spec: ModelSpec,
    pub project_id: String,
    /// Address the results are sent to.
    pub user_email: String,
    /// Token sent as the `Authorization` header.
    pub access_key: String,
    /// Ask the modeling service to skip its own validation pass.
    pub skip_validation: bool,
}

impl SubmitRequest {
    pub fn new(
        datasets: Vec<NamedTable>,
        date_variable: impl Into<String>,
        date_format: impl Into<String>,
        model_spec: ModelSpec,
    ) -> Self {
        Self {
            datasets,
            date_variable: date_variable.into(),
            date_format: date_format.into(),
            model_spec,
            project_id: String::new(),
            user_email: String::new(),
            access_key: String::new(),
            skip_validation: false,
        }
    }

    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    #[must_use]
    pub fn with_user_email(mut self, user_email: impl Into<String>) -> Self {
        self.user_email = user_email.into();
        self
    }

    #[must_use]
    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = access_key.into();
        self
    }

    #[must_use]
    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    /// Metadata carried next to the datasets in the envelope.
    #[must_use]
    pub fn metadata(&self) -> RequestMetadata {
        RequestMetadata::new(
            &self.user_email,
            &self.project_id,
            &self.date_variable,
            &self.date_format,
        )
    }
}

/// Client for the validation and modeling services.
pub struct FaasClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
}

impl FaasClient {
    /// Create a client backed by [`HttpTransport`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run the local pipeline without any network I/O.
    pub fn prepare(&self, request: &SubmitRequest) -> Result<EncodedRequest> {
        let metadata = request.metadata();
        metadata.validate()?;

        let bundle = canonicalize_datasets(
            &request.datasets,
            &request.date_variable,
            Some(request.date_format.as_str()),
        )?;
        let spec = to_wire(&request.model_spec);
        debug!(
            datasets = bundle.len(),
            records = bundle.record_count(),
            "request prepared"
        );
        build_request(&bundle, &spec, &metadata, &request.access_key)
    }

    /// Submit the request to the validation service.
    pub fn validate(&self, request: &SubmitRequest) -> Result<CallResult> {
        self.submit(Service::Validate, request)
    }

    /// Submit the request to the modeling service.
    pub fn run_model(&self, request: &SubmitRequest) -> Result<CallResult> {
        self.submit(Service::Model, request)
    }

    fn submit(&self, service: Service, request: &SubmitRequest) -> Result<CallResult> {
        let span = info_span!("faas_call", %service, project = %request.project_id);
        let _guard = span.enter();

        let encoded = self.prepare(request)?;
        let http = HttpRequest::for_service(
            self.config.endpoint(service),
            service,
            &encoded,
            request.skip_validation,
        );
        send_with_retry(
            self.transport.as_ref(),
            self.sleeper.as_ref(),
            &self.config.retry,
            service,
            &http,
        )
    }
}

impl fmt::Debug for FaasClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaasClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Validate with a default-configured client.
pub fn validate(request: &SubmitRequest) -> Result<CallResult> {
    FaasClient::new(ClientConfig::default())?.validate(request)
}

/// Run the model with a default-configured client.
pub fn run_model(request: &SubmitRequest) -> Result<CallResult> {
    FaasClient::new(ClientConfig::default())?.run_model(request)
}
