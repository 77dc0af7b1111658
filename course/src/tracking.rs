//! Completion tracking: the collaborator notified when a course completes.

use crate::config::TrackingConfig;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from a tracking notification
///
/// These never reach callers of the store. The reducer turns them into a
/// [`CourseAction::TrackingFailed`](crate::types::CourseAction::TrackingFailed)
/// feedback action.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Endpoint answered with a non-success status
    #[error("Tracking API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
}

/// Boxed future returned by [`TrackingClient::send_tracking_data`]
pub type TrackingFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, TrackingError>> + Send + 'a>>;

/// Sends completion data to a learning management system
pub trait TrackingClient: Send + Sync {
    /// Report the course completion status
    fn send_tracking_data(&self, is_complete: bool) -> TrackingFuture<'_>;
}

/// Request body sent to the tracking endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPayload {
    /// Whether the course is complete
    pub is_complete: bool,
}

/// Tracking client posting JSON over HTTP
#[derive(Clone, Debug)]
pub struct HttpTrackingClient {
    client: Client,
    endpoint: String,
}

impl HttpTrackingClient {
    /// Create a client for `endpoint` with reqwest defaults
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a client from configuration, applying its request timeout
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::RequestFailed` if the HTTP client cannot be built
    pub fn from_config(config: &TrackingConfig) -> Result<Self, TrackingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrackingError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint this client posts to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn post(&self, is_complete: bool) -> Result<Value, TrackingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TrackingPayload { is_complete })
            .send()
            .await
            .map_err(|e| TrackingError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TrackingError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(TrackingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(status = status.as_u16(), "Tracking data accepted");

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| TrackingError::ResponseParseFailed(e.to_string()))
    }
}

impl TrackingClient for HttpTrackingClient {
    fn send_tracking_data(&self, is_complete: bool) -> TrackingFuture<'_> {
        Box::pin(self.post(is_complete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn payload_uses_camel_case() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&TrackingPayload { is_complete: true })?;
        assert_eq!(json, r#"{"isComplete":true}"#);
        Ok(())
    }

    #[test]
    fn client_from_config_keeps_endpoint() -> Result<(), TrackingError> {
        let config = TrackingConfig {
            enabled: true,
            endpoint: "http://localhost:9000/track".to_string(),
            timeout: Duration::from_millis(250),
        };
        let client = HttpTrackingClient::from_config(&config)?;
        assert_eq!(client.endpoint(), "http://localhost:9000/track");
        Ok(())
    }

    #[test]
    fn api_error_display() {
        let error = TrackingError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Tracking API error (status 503): unavailable"
        );
    }
}
