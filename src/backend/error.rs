//! Backend error types

use thiserror::Error;

/// Failure talking to the dialogue backend, with classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    /// HTTP status, when the backend answered at all
    pub status: Option<u16>,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Protocol, message)
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Remote,
            message: message.into(),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether sending the same turn again has a reasonable chance of working
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            BackendErrorKind::Transport => true,
            BackendErrorKind::Remote => matches!(self.status, Some(429 | 500..=599)),
            BackendErrorKind::Protocol => false,
        }
    }

    /// Text for the system turn that reports this failure in the transcript
    pub fn transcript_text(&self) -> String {
        let text = match self.kind {
            BackendErrorKind::Transport => format!("Network error: {}", self.message),
            BackendErrorKind::Protocol => {
                format!("Unexpected response from the assistant: {}", self.message)
            }
            BackendErrorKind::Remote => match self.status {
                Some(status) => format!("The assistant reported an error ({status}): {}", self.message),
                None => format!("The assistant reported an error: {}", self.message),
            },
        };
        if self.is_retryable() {
            format!("{text}. Please try again.")
        } else {
            text
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Request not sent or no response received, including timeouts
    Transport,
    /// Response received but unparseable, or declares an unknown state
    Protocol,
    /// Backend answered with a non-success status
    Remote,
}
