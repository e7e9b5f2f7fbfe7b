//! Mock backends for testing
//!
//! These mocks enable session testing without real I/O.

use crate::backend::{BackendError, DialogueBackend, Route, TurnReply, TurnRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that returns queued replies
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<TurnReply, BackendError>>>,
    /// Record of all requests made, with the route each went to
    pub requests: Mutex<Vec<(Route, TurnRequest)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: TurnReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: BackendError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<(Route, TurnRequest)> {
        self.requests.lock().unwrap().clone()
    }

    /// Routes of recorded requests, in order
    pub fn recorded_routes(&self) -> Vec<Route> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(route, _)| *route)
            .collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogueBackend for MockBackend {
    async fn send_turn(
        &self,
        route: Route,
        request: &TurnRequest,
    ) -> Result<TurnReply, BackendError> {
        self.requests.lock().unwrap().push((route, request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::transport("No mock reply queued")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Gated Mock Backend (for in-flight testing)
// ============================================================================

/// Mock backend that holds each request until released
pub struct GatedBackend {
    inner: MockBackend,
    /// Notified when a request reaches the backend
    pub request_started: Arc<Notify>,
    /// Notify once to let one held request complete
    pub release: Arc<Notify>,
}

impl GatedBackend {
    pub fn new() -> Self {
        Self {
            inner: MockBackend::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn mock(&self) -> &MockBackend {
        &self.inner
    }
}

impl Default for GatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogueBackend for GatedBackend {
    async fn send_turn(
        &self,
        route: Route,
        request: &TurnRequest,
    ) -> Result<TurnReply, BackendError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.send_turn(route, request).await
    }

    fn name(&self) -> &str {
        "gated-mock"
    }
}
