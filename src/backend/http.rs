//! HTTP implementation of the dialogue backend

use super::types::remote_error;
use super::{BackendConfig, BackendError, DialogueBackend, Route, TurnReply, TurnRequest};
use async_trait::async_trait;
use reqwest::Client;

/// Dialogue backend reached over HTTP with JSON bodies
pub struct HttpBackend {
    client: Client,
    general_url: String,
    constrained_url: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            general_url: config.endpoint(Route::General),
            constrained_url: config.endpoint(Route::ConstrainedReply),
        })
    }

    pub fn url(&self, route: Route) -> &str {
        match route {
            Route::General => &self.general_url,
            Route::ConstrainedReply => &self.constrained_url,
        }
    }
}

#[async_trait]
impl DialogueBackend for HttpBackend {
    async fn send_turn(
        &self,
        route: Route,
        request: &TurnRequest,
    ) -> Result<TurnReply, BackendError> {
        let response = self
            .client
            .post(self.url(route))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    BackendError::transport(format!("Connection failed: {e}"))
                } else {
                    BackendError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &body));
        }

        TurnReply::parse(&body).map_err(|e| e.with_status(status.as_u16()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
