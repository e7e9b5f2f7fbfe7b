//! Conversation session state machine
//!
//! Pure transitions in the Elm style: `(state, event) -> (state, effects)`.
//! The session controller executes the effects; nothing in here does I/O.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, CONVERSATION_ENDED_NOTICE};
pub use event::Event;
pub use state::{ConversationState, SessionState, UnknownState};
pub use transition::{transition, SubmitRejection, TransitionError, TransitionResult};
