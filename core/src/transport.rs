//! Executes `HttpRequest` values against the network.
//!
//! `send` performs exactly one exchange and returns whatever the server
//! answered; `perform` adds the single status policy shared by every
//! operation. No retries and no caching happen here.

use ureq::Agent;

use crate::error::ApiError;
use crate::http::{check_status, HttpMethod, HttpRequest, HttpResponse};

/// A blocking HTTP executor.
pub trait Transport {
    /// Issue one request and read the full response body.
    ///
    /// Non-2xx responses are returned as data. Only failures where no
    /// response was obtained map to `ApiError::Transport`.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Issue one request and return the body of a 2xx response.
    fn perform(&self, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        check_status(self.send(request)?)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// `Transport` backed by a ureq agent.
///
/// The agent has status-as-error disabled so 4xx/5xx responses come back as
/// data and the body can be carried in the error.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.full_url();
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), request).call(),
            HttpMethod::Post => send_body(with_headers(self.agent.post(&url), request), request),
            HttpMethod::Put => send_body(with_headers(self.agent.put(&url), request), request),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(&url), request), request),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // ureq caps bodies at 10 MiB by default; the whole body is always read.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match &request.body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}
