//! HTTP transport and response classification.
//!
//! [`Transport`] is the seam between the client and the network. The
//! production implementation posts form-encoded bodies with a blocking
//! `reqwest` client; tests substitute stubs that script responses.

use std::sync::Arc;
use std::time::Duration;

use faas_model::{CallResult, FaasError, Result, Service, is_success_status, parse_body, warning_list};
use reqwest::blocking::Client;
use tracing::{debug, info, trace, warn};

use crate::envelope::EncodedRequest;
use crate::logging::redact_value;
use crate::retry::{RetryPolicy, Sleeper};

/// A form POST ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    /// Attach the form fields a service variant expects to an encoded body.
    ///
    /// Validation sends `body` only; modeling adds `skip_validation`.
    pub fn for_service(
        url: impl Into<String>,
        service: Service,
        encoded: &EncodedRequest,
        skip_validation: bool,
    ) -> Self {
        let mut form = vec![("body".to_string(), encoded.body.clone())];
        if service == Service::Model {
            form.push(("skip_validation".to_string(), skip_validation.to_string()));
        }
        Self {
            url: url.into(),
            headers: encoded.headers(),
            form,
        }
    }

    /// Value of a form field, if present.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw text of a service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends one form POST and returns whatever status the server answered.
///
/// Only failures to obtain a response are errors; non-success statuses are
/// returned as responses.
pub trait Transport: Send + Sync {
    fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).post_form(request)
    }
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FaasError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.post(&request.url).form(&request.form);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| FaasError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| FaasError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Send `request`, retrying the statuses the policy lists.
///
/// Transport failures end the loop immediately. The response that ends the
/// loop is classified with [`classify`].
pub fn send_with_retry(
    transport: &dyn Transport,
    sleeper: &dyn Sleeper,
    policy: &RetryPolicy,
    service: Service,
    request: &HttpRequest,
) -> Result<CallResult> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        debug!(%service, attempt, url = %request.url, "sending request");
        let response = transport.post_form(request)?;
        trace!(
            %service,
            status = response.status,
            body = redact_value(&response.body),
            "response received"
        );

        if !policy.should_retry(response.status, attempt) {
            return classify(service, response, attempt);
        }
        warn!(
            %service,
            attempt,
            status = response.status,
            delay_ms = policy.delay.as_millis(),
            "server error, retrying"
        );
        sleeper.sleep(policy.delay);
    }
}

/// Turn the final response into a [`CallResult`] or a remote error.
pub fn classify(service: Service, response: HttpResponse, attempts: u32) -> Result<CallResult> {
    if !is_success_status(response.status) {
        warn!(%service, status = response.status, attempts, "request rejected");
        return Err(FaasError::Remote {
            status: response.status,
            body: response.body,
            attempts,
        });
    }

    let body = parse_body(&response.body);
    let warnings = match service {
        Service::Model => warning_list(&body).unwrap_or_default(),
        Service::Validate => Vec::new(),
    };
    let result = CallResult {
        service,
        status: response.status,
        body,
        warnings,
        attempts,
    };

    info!(%service, status = result.status, attempts, "{}", result.confirmation());
    for warning in &result.warnings {
        warn!(%service, "{warning}");
    }
    Ok(result)
}
