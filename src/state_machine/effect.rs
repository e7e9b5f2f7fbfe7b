//! Effects produced by state transitions

use crate::backend::{Route, WireMessage};
use crate::state_machine::ConversationState;
use crate::transcript::Speaker;

/// Shown after the final reply of a conversation
pub const CONVERSATION_ENDED_NOTICE: &str =
    "Conversation ended. Start a new conversation to continue.";

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the current transcript
    AppendTurn { speaker: Speaker, text: String },

    /// Capture the outbound request from the history as it stands. The
    /// request is sent once every effect of the transition has been applied.
    RequestBackend {
        route: Route,
        message: String,
        state: ConversationState,
    },

    /// Adopt the backend's history as the context for the next request
    ReplaceHistory { messages: Vec<WireMessage> },

    /// Drop any backend history
    ClearHistory,

    /// Replace the transcript with an empty one for `generation`
    ResetTranscript { generation: u64 },
}

impl Effect {
    pub fn user_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    pub fn system_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::System,
            text: text.into(),
        }
    }

    pub fn conversation_ended_notice() -> Self {
        Self::system_turn(CONVERSATION_ENDED_NOTICE)
    }
}
