//! In-memory tracking clients for tests and local runs.

use crate::tracking::{TrackingClient, TrackingError, TrackingFuture};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Records every tracking call and answers with a fixed response
///
/// Clones share the call log.
///
/// # Example
///
/// ```
/// use course_progress::mocks::RecordingTrackingClient;
///
/// let tracker = RecordingTrackingClient::new();
/// assert_eq!(tracker.call_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingTrackingClient {
    calls: Arc<Mutex<Vec<bool>>>,
    response: Value,
    delay: Option<Duration>,
}

impl RecordingTrackingClient {
    /// Create a client that answers `null`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `response`
    #[must_use]
    pub fn with_response(mut self, response: Value) -> Self {
        self.response = response;
        self
    }

    /// Sleep before answering
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The `is_complete` values received, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<bool> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl TrackingClient for RecordingTrackingClient {
    fn send_tracking_data(&self, is_complete: bool) -> TrackingFuture<'_> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(is_complete);

        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.response.clone())
        })
    }
}

/// Fails every call with an API error
#[derive(Clone, Debug)]
pub struct FailingTrackingClient {
    status: u16,
    calls: Arc<AtomicUsize>,
}

impl FailingTrackingClient {
    /// Create a client failing with `status`
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of calls received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingTrackingClient {
    fn default() -> Self {
        Self::new(500)
    }
}

impl TrackingClient for FailingTrackingClient {
    fn send_tracking_data(&self, _is_complete: bool) -> TrackingFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.status;
        Box::pin(async move {
            Err(TrackingError::Api {
                status,
                message: "tracking unavailable".to_string(),
            })
        })
    }
}
