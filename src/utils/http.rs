//! HTTP client utilities.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;
use crate::utils::{with_retry, RetryConfig};

/// Default user agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    retry: RetryConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::with_user_agent(USER_AGENT)
    }

    /// Create a new HTTP client with a custom user agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, SourceError> {
        Self::from_config(user_agent, &HttpConfig::default())
    }

    /// Create a client honouring the timeout and attempt limits in `config`
    pub fn from_config(user_agent: &str, config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            retry: RetryConfig {
                max_attempts: config.max_attempts.max(1) as u32,
                ..RetryConfig::default()
            },
        })
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// GET `url` and decode a JSON body, retrying transient failures
    ///
    /// `decorate` may add headers (API keys) to each attempt.
    pub async fn get_json<T, F>(&self, url: &str, decorate: F) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let body = with_retry(self.retry, || {
            let request = decorate(self.client.get(url));
            async move {
                let response = request.send().await?;
                check_status(response.status(), url)?;
                Ok(response.text().await?)
            }
        })
        .await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// GET `url` and return the body as text, retrying transient failures
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        with_retry(self.retry, || {
            let request = self.client.get(url);
            async move {
                let response = request.send().await?;
                check_status(response.status(), url)?;
                Ok(response.text().await?)
            }
        })
        .await
    }
}

/// Map an HTTP status onto the source error taxonomy
pub fn check_status(status: StatusCode, url: &str) -> Result<(), SourceError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::NOT_FOUND => Err(SourceError::NotFound(url.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimit),
        s if s.is_server_error() => Err(SourceError::Network(format!(
            "Server returned status: {}",
            s
        ))),
        s => Err(SourceError::Api(format!("Unexpected status: {}", s))),
    }
}
