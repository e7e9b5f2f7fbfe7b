//! Session controller
//!
//! Runs the pure state machine against a transcript and a backend. All state
//! changes happen under one short synchronous lock, so the `pending_request`
//! flag is set before the request leaves and a second rapid submission sees
//! it. The lock is never held across the network call.

use crate::backend::{BackendError, DialogueBackend, Route, TurnRequest, WireMessage};
use crate::state_machine::{
    transition, ConversationState, Effect, Event, SessionState, SubmitRejection, TransitionError,
};
use crate::transcript::{Transcript, Turn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What became of one call to [`SessionController::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Refused locally; nothing was sent and nothing was recorded
    Rejected(SubmitRejection),
    /// The backend replied and the reply was applied
    Replied { state: ConversationState },
    /// The exchange failed; a system turn describes it and the state is unchanged
    Failed(BackendError),
    /// The session was reset while the request was in flight; its outcome was dropped
    Discarded,
}

/// A request captured under the lock, sent after it is released
#[derive(Debug)]
struct Dispatch {
    generation: u64,
    route: Route,
    request: TurnRequest,
}

#[derive(Debug)]
struct Applied {
    state: SessionState,
    dispatch: Option<Dispatch>,
}

/// Releases the submission lock if `submit` is dropped mid-request (a caller
/// timeout or `select!`), recording the abandoned exchange as a failure.
struct InFlight<'a, B: DialogueBackend> {
    session: &'a SessionController<B>,
    generation: u64,
    settled: bool,
}

impl<B: DialogueBackend> InFlight<'_, B> {
    fn settle(mut self, event: Event) -> Result<Applied, TransitionError> {
        self.settled = true;
        self.session.process_event(event)
    }
}

impl<B: DialogueBackend> Drop for InFlight<'_, B> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let event = Event::BackendFailure {
            generation: self.generation,
            error: BackendError::transport(REQUEST_CANCELLED),
        };
        match self.session.process_event(event) {
            Ok(_) => tracing::warn!(
                session_id = %self.session.id,
                generation = self.generation,
                "Request abandoned before its reply arrived"
            ),
            Err(e) => tracing::debug!(
                session_id = %self.session.id,
                error = %e,
                "Abandoned request was already superseded"
            ),
        }
    }
}

const REQUEST_CANCELLED: &str = "Request cancelled before a reply arrived";

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    /// History last declared by the backend, echoed back on the next request
    history: Option<Vec<WireMessage>>,
}

/// Owner of one conversation's lifecycle and transcript
pub struct SessionController<B: DialogueBackend> {
    id: String,
    backend: B,
    inner: Mutex<Inner>,
    transcript: Arc<Transcript>,
}

impl<B: DialogueBackend> SessionController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            backend,
            inner: Mutex::new(Inner::default()),
            transcript: Arc::new(Transcript::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared handle to the transcript, for renderers
    pub fn transcript(&self) -> Arc<Transcript> {
        Arc::clone(&self.transcript)
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.transcript.snapshot()
    }

    pub fn state(&self) -> ConversationState {
        self.lock().state.conversation
    }

    pub fn generation(&self) -> u64 {
        self.lock().state.generation
    }

    pub fn can_submit(&self) -> bool {
        self.lock().state.can_submit()
    }

    pub fn is_ended(&self) -> bool {
        self.lock().state.conversation.is_terminal()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.pending_request
    }

    /// Submit one user turn and wait for its outcome to be applied.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let event = Event::UserSubmit {
            text: text.to_string(),
        };
        let Dispatch {
            generation,
            route,
            request,
        } = match self.process_event(event) {
            Ok(Applied {
                dispatch: Some(dispatch),
                ..
            }) => dispatch,
            Err(TransitionError::Rejected(reason)) => {
                tracing::debug!(session_id = %self.id, %reason, "Submission rejected");
                return SubmitOutcome::Rejected(reason);
            }
            other => {
                tracing::error!(
                    session_id = %self.id,
                    result = ?other,
                    "Submission accepted without a backend request"
                );
                return SubmitOutcome::Discarded;
            }
        };

        tracing::info!(
            session_id = %self.id,
            generation,
            route = %route,
            state = %request.state,
            "Dispatching turn"
        );

        let in_flight = InFlight {
            session: self,
            generation,
            settled: false,
        };

        let (event, failure) = match self.backend.send_turn(route, &request).await {
            Ok(reply) => (Event::BackendReply { generation, reply }, None),
            Err(error) => (
                Event::BackendFailure {
                    generation,
                    error: error.clone(),
                },
                Some(error),
            ),
        };

        match in_flight.settle(event) {
            Ok(applied) => match failure {
                Some(error) => SubmitOutcome::Failed(error),
                None => SubmitOutcome::Replied {
                    state: applied.state.conversation,
                },
            },
            Err(TransitionError::StaleGeneration { current, received }) => {
                tracing::info!(
                    session_id = %self.id,
                    current,
                    received,
                    "Discarding outcome of a request issued before reset"
                );
                SubmitOutcome::Discarded
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Backend outcome not applied");
                SubmitOutcome::Discarded
            }
        }
    }

    /// Start over: empty transcript, `active`, unlocked. Any in-flight reply is dropped when it lands.
    pub fn reset(&self) {
        match self.process_event(Event::Reset) {
            Ok(applied) => {
                tracing::info!(
                    session_id = %self.id,
                    generation = applied.state.generation,
                    "Session reset"
                );
            }
            Err(e) => tracing::error!(session_id = %self.id, error = %e, "Reset failed"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn process_event(&self, event: Event) -> Result<Applied, TransitionError> {
        let mut inner = self.lock();
        let kind = event.kind();

        let result = transition(&inner.state, event)?;
        let old_state = std::mem::replace(&mut inner.state, result.new_state);

        if old_state.conversation != inner.state.conversation {
            tracing::info!(
                session_id = %self.id,
                event = kind,
                from = %old_state.conversation,
                to = %inner.state.conversation,
                "Conversation state changed"
            );
        }

        let mut dispatch = None;
        for effect in result.effects {
            if let Some(prepared) = self.execute_effect(&mut inner, effect) {
                dispatch = Some(prepared);
            }
        }

        Ok(Applied {
            state: inner.state,
            dispatch,
        })
    }

    fn execute_effect(&self, inner: &mut Inner, effect: Effect) -> Option<Dispatch> {
        match effect {
            Effect::AppendTurn { speaker, text } => {
                if let Err(e) = self
                    .transcript
                    .append_for(inner.state.generation, speaker, text)
                {
                    tracing::warn!(session_id = %self.id, error = %e, "Dropped turn");
                }
                None
            }
            Effect::RequestBackend {
                route,
                message,
                state,
            } => {
                let messages = inner.history.clone().unwrap_or_else(|| {
                    self.transcript
                        .snapshot()
                        .iter()
                        .map(WireMessage::from)
                        .collect()
                });
                Some(Dispatch {
                    generation: inner.state.generation,
                    route,
                    request: TurnRequest {
                        message,
                        messages,
                        state,
                    },
                })
            }
            Effect::ReplaceHistory { messages } => {
                inner.history = Some(messages);
                None
            }
            Effect::ClearHistory => {
                inner.history = None;
                None
            }
            Effect::ResetTranscript { generation } => {
                self.transcript.reset_to(generation);
                None
            }
        }
    }
}
