//! Pure state transition function
//!
//! The client never advances lifecycle state on its own. Apart from the
//! `pending_request` lock, every state change comes from a field the backend
//! declared in a reply.

use super::{ConversationState, Effect, Event, SessionState};
use crate::backend::Route;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Why a submission was refused locally. Never reaches the network or the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting for the previous reply")]
    RequestPending,
    #[error("Conversation has ended, start a new one to continue")]
    ConversationEnded,
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error(transparent)]
    Rejected(#[from] SubmitRejection),
    #[error("Reply for generation {received} arrived after reset to generation {current}")]
    StaleGeneration { current: u64, received: u64 },
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // User submission
        // ============================================================
        Event::UserSubmit { text } => {
            if state.conversation.is_terminal() {
                return Err(SubmitRejection::ConversationEnded.into());
            }
            if state.pending_request {
                return Err(SubmitRejection::RequestPending.into());
            }
            let text = text.trim();
            if text.is_empty() {
                return Err(SubmitRejection::EmptyMessage.into());
            }

            Ok(TransitionResult::new(SessionState {
                pending_request: true,
                ..*state
            })
            .with_effect(Effect::RequestBackend {
                route: Route::for_state(state.conversation),
                message: text.to_string(),
                state: state.conversation,
            })
            .with_effect(Effect::user_turn(text)))
        }

        // ============================================================
        // Backend reply: declared state wins, `ended` overrides it
        // ============================================================
        Event::BackendReply { generation, reply } => {
            ensure_outcome_expected(state, generation)?;

            let conversation = if reply.ended {
                ConversationState::Ended
            } else {
                reply.state.unwrap_or(state.conversation)
            };

            let mut result = TransitionResult::new(SessionState {
                conversation,
                pending_request: false,
                ..*state
            })
            .with_effect(Effect::bot_turn(reply.message));

            if let Some(messages) = reply.messages {
                result = result.with_effect(Effect::ReplaceHistory { messages });
            }
            if conversation.is_terminal() {
                result = result.with_effect(Effect::conversation_ended_notice());
            }
            Ok(result)
        }

        // ============================================================
        // Backend failure: report it, leave lifecycle state alone
        // ============================================================
        Event::BackendFailure { generation, error } => {
            ensure_outcome_expected(state, generation)?;

            Ok(TransitionResult::new(SessionState {
                pending_request: false,
                ..*state
            })
            .with_effect(Effect::system_turn(error.transcript_text())))
        }

        // ============================================================
        // Reset: fresh transcript, fresh generation, from any state
        // ============================================================
        Event::Reset => {
            let generation = state.generation + 1;
            Ok(TransitionResult::new(SessionState {
                conversation: ConversationState::Active,
                pending_request: false,
                generation,
            })
            .with_effects([Effect::ResetTranscript { generation }, Effect::ClearHistory]))
        }
    }
}

fn ensure_outcome_expected(state: &SessionState, generation: u64) -> Result<(), TransitionError> {
    if generation != state.generation {
        return Err(TransitionError::StaleGeneration {
            current: state.generation,
            received: generation,
        });
    }
    if !state.pending_request {
        return Err(TransitionError::InvalidTransition(
            "backend outcome with no request pending".to_string(),
        ));
    }
    Ok(())
}
