//! Dialogue backend abstraction
//!
//! The backend is an opaque remote service. The session controller only
//! needs one operation: send a turn down a route and get a reply back.

mod config;
mod error;
mod http;
mod types;

pub use config::{BackendConfig, ConfigError};
pub use error::{BackendError, BackendErrorKind};
pub use http::HttpBackend;
pub use types::{Route, TurnReply, TurnRequest, WireMessage};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for dialogue backends
#[async_trait]
pub trait DialogueBackend: Send + Sync {
    /// Send one user turn to the operation selected by `route`
    async fn send_turn(&self, route: Route, request: &TurnRequest)
        -> Result<TurnReply, BackendError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: DialogueBackend + ?Sized> DialogueBackend for Arc<T> {
    async fn send_turn(
        &self,
        route: Route,
        request: &TurnRequest,
    ) -> Result<TurnReply, BackendError> {
        (**self).send_turn(route, request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for dialogue backends
pub struct LoggingBackend {
    inner: Arc<dyn DialogueBackend>,
    name: String,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn DialogueBackend>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl DialogueBackend for LoggingBackend {
    async fn send_turn(
        &self,
        route: Route,
        request: &TurnRequest,
    ) -> Result<TurnReply, BackendError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_turn(route, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    backend = %self.name,
                    route = %route,
                    duration_ms = %duration.as_millis(),
                    history_len = request.messages.len(),
                    declared_state = ?reply.state,
                    ended = reply.ended,
                    "Backend turn completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.name,
                    route = %route,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    retryable = e.is_retryable(),
                    "Backend turn failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
