//! Wire types for the dialogue backend
//!
//! Request:  `{ "message", "messages": [{speaker, text}], "state" }`
//! Response: `{ "message" | "reply", "messages"?, "state"?, "ended" | "conversation_ended"? }`

use super::BackendError;
use crate::state_machine::ConversationState;
use crate::transcript::Turn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest slice of an error body quoted back into the transcript
const MAX_QUOTED_BODY_CHARS: usize = 200;

/// Which backend operation a user turn goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Free-form turn
    General,
    /// Follow-up the backend explicitly asked for (e.g. feedback on a proposal)
    ConstrainedReply,
}

impl Route {
    pub fn for_state(state: ConversationState) -> Self {
        match state {
            ConversationState::AwaitingConstrainedReply => Route::ConstrainedReply,
            ConversationState::Active | ConversationState::Ended => Route::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Route::General => "general",
            Route::ConstrainedReply => "constrained_reply",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// History entry as exchanged with the backend.
///
/// Speakers are kept as opaque strings: backend history may carry roles the
/// client never renders (e.g. the backend's own system prompt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(alias = "role")]
    pub speaker: String,
    #[serde(alias = "content")]
    pub text: String,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            speaker: turn.speaker.as_str().to_string(),
            text: turn.text.clone(),
        }
    }
}

/// Outbound turn, self-describing so the backend never depends on client memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRequest {
    pub message: String,
    pub messages: Vec<WireMessage>,
    pub state: ConversationState,
}

/// Parsed, validated backend reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub message: String,
    /// Authoritative backend history, when the backend sends one
    pub messages: Option<Vec<WireMessage>>,
    /// Declared state; `None` leaves the current state unchanged
    pub state: Option<ConversationState>,
    pub ended: bool,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    message: Option<String>,
    reply: Option<String>,
    messages: Option<Vec<WireMessage>>,
    state: Option<String>,
    ended: Option<bool>,
    conversation_ended: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawErrorBody {
    error: Option<String>,
    message: Option<String>,
}

impl TurnReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            messages: None,
            state: None,
            ended: false,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: ConversationState) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Vec<WireMessage>) -> Self {
        self.messages = Some(messages);
        self
    }

    #[must_use]
    pub fn ending(mut self) -> Self {
        self.ended = true;
        self
    }

    /// Parse a success body.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when the body is not JSON of the expected
    /// shape, carries no reply text, or declares a state outside the closed
    /// set of conversation states.
    pub fn parse(body: &str) -> Result<Self, BackendError> {
        let raw: RawReply = serde_json::from_str(body)
            .map_err(|e| BackendError::protocol(format!("Failed to parse response: {e}")))?;

        let message = raw
            .message
            .or(raw.reply)
            .ok_or_else(|| BackendError::protocol("Response has no reply text"))?;

        let state = raw
            .state
            .map(|s| s.parse::<ConversationState>())
            .transpose()
            .map_err(|e| BackendError::protocol(e.to_string()))?;

        Ok(Self {
            message,
            messages: raw.messages,
            state,
            ended: raw.ended.unwrap_or(false) || raw.conversation_ended.unwrap_or(false),
        })
    }
}

/// Build the error for a non-success response
pub fn remote_error(status: u16, body: &str) -> BackendError {
    let message = serde_json::from_str::<RawErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| {
            let quoted: String = body.chars().take(MAX_QUOTED_BODY_CHARS).collect();
            if quoted.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {}", quoted.trim())
            }
        });
    BackendError::remote(status, message)
}
