//! [`MockBackend`]: a recording backend with scripted responses.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use qontinui_client::{ApiRequest, Backend, Error, Result};
use serde_json::{Value, json};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value> + Send + Sync>;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    pub token: Option<String>,
}

/// Backend that records every request and answers from a responder closure.
///
/// # Example
///
/// ```rust
/// use qontinui_test_utils::MockBackend;
/// use serde_json::json;
///
/// let backend = MockBackend::with_response(json!({"id": "p1"}));
/// assert_eq!(backend.request_count(), 0);
/// ```
pub struct MockBackend {
    requests: Mutex<Vec<RecordedRequest>>,
    responder: Responder,
    delay: Option<Duration>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Answer every request with `{}`.
    pub fn new() -> Self {
        Self::with_response(json!({}))
    }

    /// Answer every request with a clone of `body`.
    pub fn with_response(body: Value) -> Self {
        Self::responding(move |_| Ok(body.clone()))
    }

    /// Answer every request with a remote error.
    pub fn with_status(status: u16, message: &str) -> Self {
        let message = message.to_string();
        Self::responding(move |_| {
            Err(Error::Remote {
                status,
                message: message.clone(),
            })
        })
    }

    /// Answer through `responder`.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delay: None,
        }
    }

    /// Sleep before answering, so callers can cancel mid-flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot of the recorded requests, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request.
    ///
    /// # Panics
    /// Panics if nothing was recorded.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("MockBackend::last_request: no requests recorded"))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value> {
        self.requests.lock().unwrap().push(RecordedRequest {
            request: request.clone(),
            token: token.map(str::to_string),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}
