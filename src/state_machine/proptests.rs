//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

#![allow(clippy::redundant_closure)]

use super::transition::*;
use super::*;
use crate::backend::{BackendError, Route, TurnReply};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_conversation_state() -> impl Strategy<Value = ConversationState> {
    prop_oneof![
        Just(ConversationState::Active),
        Just(ConversationState::AwaitingConstrainedReply),
        Just(ConversationState::Ended),
    ]
}

fn arb_session_state() -> impl Strategy<Value = SessionState> {
    (arb_conversation_state(), any::<bool>(), 0u64..10).prop_map(
        |(conversation, pending_request, generation)| SessionState {
            conversation,
            // A terminal session never has a request in flight
            pending_request: pending_request && !conversation.is_terminal(),
            generation,
        },
    )
}

fn arb_reply() -> impl Strategy<Value = TurnReply> {
    (
        "[a-zA-Z0-9 ?!.]{0,40}",
        proptest::option::of(arb_conversation_state()),
        any::<bool>(),
    )
        .prop_map(|(message, state, ended)| TurnReply {
            message,
            messages: None,
            state,
            ended,
        })
}

fn arb_backend_error() -> impl Strategy<Value = BackendError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(|msg| BackendError::transport(msg)),
        "[a-z ]{1,20}".prop_map(|msg| BackendError::protocol(msg)),
        (400u16..600, "[a-z ]{1,20}").prop_map(|(status, msg)| BackendError::remote(status, msg)),
    ]
}

/// Events as they could arrive at a session, including late and duplicate replies
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => "[a-z ]{0,20}".prop_map(|text| Event::UserSubmit { text }),
        3 => (0u64..4, arb_reply()).prop_map(|(generation, reply)| Event::BackendReply { generation, reply }),
        2 => (0u64..4, arb_backend_error()).prop_map(|(generation, error)| Event::BackendFailure { generation, error }),
        1 => Just(Event::Reset),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn ended_rejects_every_submission(text in ".{0,40}", generation in 0u64..10) {
        let state = SessionState {
            conversation: ConversationState::Ended,
            pending_request: false,
            generation,
        };
        let result = transition(&state, Event::UserSubmit { text });
        prop_assert!(matches!(
            result,
            Err(TransitionError::Rejected(SubmitRejection::ConversationEnded))
        ));
    }

    #[test]
    fn pending_rejects_every_submission(
        conversation in prop_oneof![
            Just(ConversationState::Active),
            Just(ConversationState::AwaitingConstrainedReply),
        ],
        text in ".{0,40}",
    ) {
        let state = SessionState { conversation, pending_request: true, generation: 0 };
        let result = transition(&state, Event::UserSubmit { text });
        prop_assert!(matches!(
            result,
            Err(TransitionError::Rejected(SubmitRejection::RequestPending))
        ));
    }

    #[test]
    fn accepted_submission_dispatches_exactly_once(
        state in arb_session_state(),
        text in "[a-z]{1,20}",
    ) {
        if let Ok(result) = transition(&state, Event::UserSubmit { text }) {
            prop_assert!(result.new_state.pending_request);
            prop_assert_eq!(result.new_state.conversation, state.conversation);

            let dispatches: Vec<_> = result
                .effects
                .iter()
                .filter_map(|e| match e {
                    Effect::RequestBackend { route, .. } => Some(*route),
                    _ => None,
                })
                .collect();
            prop_assert_eq!(dispatches, vec![Route::for_state(state.conversation)]);
        }
    }

    #[test]
    fn stale_outcomes_never_apply(state in arb_session_state(), reply in arb_reply(), offset in 1u64..5) {
        let event = Event::BackendReply { generation: state.generation + offset, reply };
        let stale = matches!(
            transition(&state, event),
            Err(TransitionError::StaleGeneration { .. })
        );
        prop_assert!(stale);
    }

    #[test]
    fn outcomes_from_before_reset_never_apply(
        conversation in arb_conversation_state(),
        generation in 1u64..10,
        behind in 1u64..10,
        reply in arb_reply(),
        error in arb_backend_error(),
    ) {
        let state = SessionState {
            conversation,
            pending_request: !conversation.is_terminal(),
            generation,
        };
        let earlier = generation.saturating_sub(behind);

        for event in [
            Event::BackendReply { generation: earlier, reply },
            Event::BackendFailure { generation: earlier, error },
        ] {
            let stale = matches!(
                transition(&state, event),
                Err(TransitionError::StaleGeneration { current, received })
                    if current == generation && received == earlier
            );
            prop_assert!(stale);
        }
    }

    #[test]
    fn failure_never_changes_conversation_state(
        conversation in arb_conversation_state(),
        error in arb_backend_error(),
    ) {
        let state = SessionState {
            conversation,
            pending_request: !conversation.is_terminal(),
            generation: 1,
        };
        if let Ok(result) = transition(&state, Event::BackendFailure { generation: 1, error }) {
            prop_assert_eq!(result.new_state.conversation, conversation);
            prop_assert!(!result.new_state.pending_request);
        }
    }

    #[test]
    fn reset_always_yields_fresh_session(state in arb_session_state()) {
        let result = transition(&state, Event::Reset).unwrap();
        prop_assert_eq!(result.new_state, SessionState {
            conversation: ConversationState::Active,
            pending_request: false,
            generation: state.generation + 1,
        });
    }

    #[test]
    fn event_sequences_preserve_invariants(events in proptest::collection::vec(arb_event(), 1..40)) {
        let mut state = SessionState::default();

        for event in events {
            let is_reset = matches!(event, Event::Reset);
            let before = state;

            match transition(&state, event) {
                Ok(result) => state = result.new_state,
                // Rejected and stale events leave the session untouched
                Err(_) => continue,
            }

            // Generation only moves forward, and only on reset
            if is_reset {
                prop_assert_eq!(state.generation, before.generation + 1);
            } else {
                prop_assert_eq!(state.generation, before.generation);
            }

            // Nothing but reset leaves the terminal state
            if before.conversation.is_terminal() && !is_reset {
                prop_assert!(state.conversation.is_terminal());
            }

            // A terminal session is never locked
            if state.conversation.is_terminal() {
                prop_assert!(!state.pending_request);
            }
        }
    }
}
