//! reqwest-backed `Transport` for the REST backend.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;

use pulsoft_contracts::{
    error::{PulsoftError, PulsoftResult},
    remote::{ApiRequest, HttpMethod},
};
use pulsoft_core::traits::Transport;

use crate::config::ServiceConfig;

/// Sends `ApiRequest`s to the backend over HTTP.
///
/// One attempt per request: no retries, no backoff.
#[derive(Debug, Clone)]
pub struct RestTransport {
    client: Client,
    base_url: String,
}

impl RestTransport {
    /// Build a transport from the `[backend]` section of `config`.
    ///
    /// Returns `PulsoftError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &ServiceConfig) -> PulsoftResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if !config.backend.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(|e| PulsoftError::Config {
            reason: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self {
            client,
            base_url: config.backend.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `endpoint` onto the base URL with exactly one slash between them.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn send(&self, request: &ApiRequest, bearer_token: &str) -> PulsoftResult<Value> {
        let url = self.url_for(&request.endpoint);
        debug!(method = %request.method, url = %url, "sending backend request");

        let mut builder = self
            .client
            .request(method_of(request.method), &url)
            .bearer_auth(bearer_token)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| PulsoftError::Transport {
            reason: format!("{} {}: {}", request.method, url, e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PulsoftError::HttpStatus {
                status: status.as_u16(),
                endpoint: request.endpoint.clone(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| PulsoftError::Transport {
            reason: format!("failed to read body from {}: {}", url, e),
        })?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| PulsoftError::MalformedPayload {
            reason: format!("'{}' returned invalid JSON: {}", request.endpoint, e),
        })
    }
}
