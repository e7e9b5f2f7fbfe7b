//! Conversational session client
//!
//! Talks to a remote dialogue backend over HTTP, keeps the exchange as an
//! ordered transcript and enforces the conversation lifecycle
//! (active, awaiting a constrained reply, ended). The backend is the source
//! of truth for lifecycle state; the client only ever applies what the
//! backend declares.

pub mod backend;
pub mod format;
pub mod session;
pub mod state_machine;
pub mod transcript;

pub use backend::{
    BackendConfig, BackendError, BackendErrorKind, ConfigError, DialogueBackend, HttpBackend,
    LoggingBackend, Route, TurnReply, TurnRequest, WireMessage,
};
pub use session::{SessionController, SubmitOutcome};
pub use state_machine::{ConversationState, SubmitRejection};
pub use transcript::{Speaker, Transcript, Turn};
