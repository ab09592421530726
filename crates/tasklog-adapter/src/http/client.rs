/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::http::{Result, TasklogError};
use crate::types::ApiEnvelope;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Applied to every request except log page fetches.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Log pages can be large and slow, so no timeout unless set here.
    pub log_fetch_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            log_fetch_timeout: None,
        }
    }
}

/// Credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
}

/// HTTP client for the console's task log API
#[derive(Debug, Clone)]
pub struct TasklogClient {
    http_client: Client,
    base_url: Url,
    config: ClientConfig,
    credentials: Option<Credentials>,
}

impl TasklogClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(TasklogError::Config(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        // Request timeouts are applied per request so log fetches can opt out.
        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            config,
            credentials: None,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build full URL by appending percent-encoded path segments to the base URL
    pub(crate) fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TasklogError::Config(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build request builder with auth applied and no timeout
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.credentials {
            Some(credentials) => builder.bearer_auth(&credentials.token),
            None => builder,
        }
    }

    /// Build request builder with the default request timeout
    pub(crate) fn timed_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request(method, url).timeout(self.config.timeout)
    }

    /// Send a request and decode a JSON body, bare or enveloped
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TasklogError::api_error(status, error_message(&body, status)));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        envelope.into_result()
    }
}

/// Extract a readable message from an error body
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|message| message.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
