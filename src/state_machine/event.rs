//! Events that can occur in a session

use crate::backend::{BackendError, TurnReply};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
    },
    Reset,

    // Backend events, tagged with the generation the request was issued under
    BackendReply {
        generation: u64,
        reply: TurnReply,
    },
    BackendFailure {
        generation: u64,
        error: BackendError,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UserSubmit { .. } => "user_submit",
            Event::Reset => "reset",
            Event::BackendReply { .. } => "backend_reply",
            Event::BackendFailure { .. } => "backend_failure",
        }
    }
}
