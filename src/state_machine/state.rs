//! Conversation state types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle of a conversation, as declared by the backend.
///
/// `normal` and `awaiting_feedback` are the names older backends use and are
/// accepted on input only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Accepting free-form turns
    #[default]
    #[serde(alias = "normal")]
    Active,
    /// Backend expects a specific kind of follow-up
    #[serde(alias = "awaiting_feedback")]
    AwaitingConstrainedReply,
    /// Terminal, no further turns
    Ended,
}

impl ConversationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationState::Active => "active",
            ConversationState::AwaitingConstrainedReply => "awaiting_constrained_reply",
            ConversationState::Ended => "ended",
        }
    }

    /// No transition leaves a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversationState::Ended)
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized conversation state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for ConversationState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" | "normal" => Ok(ConversationState::Active),
            "awaiting_constrained_reply" | "awaiting_feedback" => {
                Ok(ConversationState::AwaitingConstrainedReply)
            }
            "ended" => Ok(ConversationState::Ended),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Everything the transition function needs to know about a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub conversation: ConversationState,
    /// True from the moment a turn is dispatched until its outcome is applied
    pub pending_request: bool,
    /// Bumped on every reset; replies from older generations are discarded
    pub generation: u64,
}

impl SessionState {
    pub fn can_submit(&self) -> bool {
        !self.conversation.is_terminal() && !self.pending_request
    }
}
