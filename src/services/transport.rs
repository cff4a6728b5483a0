//! HTTP transport
//!
//! The pipeline talks to the service through a single `POST url json -> json`
//! operation. `HttpTransport` implements it with reqwest; tests and embedders
//! can plug in their own.

use crate::utils::error::{helpers, ErrorContext, MagicResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// JSON-over-HTTP POST
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the decoded JSON response
    ///
    /// Non-success statuses fail with `MagicError::Transport`.
    async fn post(&self, url: &str, body: &Value) -> MagicResult<Value>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> MagicResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create a transport with a custom timeout
    pub fn with_timeout(timeout_secs: u64) -> MagicResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("magic-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Handle HTTP response
    async fn handle_response(&self, response: Response) -> MagicResult<Value> {
        let status = response.status();

        if status.is_success() {
            let value: Value = response
                .json::<Value>()
                .await
                .response_context("Failed to parse response body")?;
            debug!("Request completed successfully");
            Ok(value)
        } else {
            let status_text = status.canonical_reason().unwrap_or("Unknown Status");
            let error_text = response.text().await.unwrap_or_default();
            error!("Request failed: {} - {}", status, error_text);

            let message = if error_text.is_empty() {
                status_text.to_string()
            } else {
                format!("{} - {}", status_text, error_text)
            };
            Err(helpers::transport_error(status.as_u16(), message))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: &Value) -> MagicResult<Value> {
        debug!("POST {}", url);

        let payload = serde_json::to_vec(body)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(HttpTransport::new().is_ok());
        assert!(HttpTransport::with_timeout(5).is_ok());
    }
}
