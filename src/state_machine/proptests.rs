//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::transcript::{Sender, Transcript, TranscriptEntry};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Apply only the transcript effects, the way the runtime would.
fn apply(transcript: &mut Transcript, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::AppendEntries(entries) => transcript.extend(entries.iter().cloned()),
            Effect::ClearTranscript => transcript.clear(),
            _ => {}
        }
    }
}

fn send_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::SendMessage { .. }))
        .count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9?!][a-zA-Z0-9 ?!]{0,20}"
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        any::<bool>(),
        0u32..3,
        0u64..3,
        proptest::option::of("[a-z ]{1,20}"),
    )
        .prop_map(|(sending, pending_resets, clear_epoch, error)| SessionState {
            request: if sending {
                RequestState::Sending
            } else {
                RequestState::Idle
            },
            pending_resets,
            clear_epoch,
            error,
        })
}

/// Events a session can see, timestamps derived from their position
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => (arb_text(), 0i64..1000).prop_map(|(text, s)| Event::Submit { text, at: at(s) }),
        1 => (arb_blank(), 0i64..1000).prop_map(|(text, s)| Event::Submit { text, at: at(s) }),
        2 => ("[a-z]{1,10}", 0i64..1000).prop_map(|(text, s)| Event::ReplyReceived { text, at: at(s) }),
        1 => "[a-z ]{1,10}".prop_map(|message| Event::SendFailed { message }),
        1 => Just(Event::DismissError),
        1 => Just(Event::ResetConfirmed),
        1 => Just(Event::ResetSucceeded),
        1 => "[a-z ]{1,10}".prop_map(|message| Event::ResetFailed { message }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Every accepted transition that changes state tells observers about it
    #[test]
    fn state_changes_are_published(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            if result.new_state != state {
                prop_assert!(result.effects.contains(&Effect::PublishState));
            }
        }
    }

    /// A clear in flight never blocks a submit; only a send in flight does
    #[test]
    fn pending_reset_does_not_guard_submit(state in arb_state(), text in arb_text()) {
        let result = transition(&state, Event::Submit { text, at: at(0) });
        prop_assert_eq!(result.is_ok(), !state.is_sending());
    }

    /// Blank input never mutates state or transcript
    #[test]
    fn blank_submit_is_rejected(state in arb_state(), text in arb_blank()) {
        let result = transition(&state, Event::Submit { text, at: at(0) });
        prop_assert!(result.is_err());
    }

    /// While sending, every submit is refused
    #[test]
    fn single_flight(texts in proptest::collection::vec(arb_text(), 1..10)) {
        let state = SessionState { request: RequestState::Sending, ..SessionState::idle() };
        for text in texts {
            prop_assert_eq!(
                transition(&state, Event::Submit { text, at: at(0) }).unwrap_err(),
                TransitionError::Busy
            );
        }
    }

    /// Any completion event returns the request state to Idle
    #[test]
    fn completion_returns_to_idle(reply in any::<bool>()) {
        let state = SessionState { request: RequestState::Sending, ..SessionState::idle() };
        let event = if reply {
            Event::ReplyReceived { text: "ok".to_string(), at: at(1) }
        } else {
            Event::SendFailed { message: "boom".to_string() }
        };
        let result = transition(&state, event).unwrap();
        prop_assert_eq!(result.new_state.request, RequestState::Idle);
        prop_assert_eq!(result.new_state.error.is_some(), !reply);
        prop_assert!(result.new_state.input_enabled());
    }

    /// Failed reset leaves the transcript untouched, successful reset empties it
    #[test]
    fn reset_is_atomic(
        texts in proptest::collection::vec("[a-z]{1,8}", 0..6),
        succeed in any::<bool>(),
    ) {
        let mut transcript = Transcript::new();
        for (i, text) in texts.iter().enumerate() {
            transcript.push(TranscriptEntry::user(text.as_str(), at(i64::try_from(i).unwrap())));
        }
        let before = transcript.clone();

        let requested = transition(&SessionState::idle(), Event::ResetConfirmed).unwrap();
        apply(&mut transcript, &requested.effects);
        prop_assert_eq!(&transcript, &before);

        let outcome = if succeed {
            Event::ResetSucceeded
        } else {
            Event::ResetFailed { message: "HTTP 500".to_string() }
        };
        let done = transition(&requested.new_state, outcome).unwrap();
        apply(&mut transcript, &done.effects);

        if succeed {
            prop_assert!(transcript.is_empty());
        } else {
            prop_assert_eq!(&transcript, &before);
        }
        prop_assert!(done.new_state.input_enabled());
    }

    /// Driving random event sequences: at most one send in flight, a reply
    /// lands right after its user entry (or on a transcript a clear just
    /// emptied), and each accepted submit adds exactly one user entry.
    #[test]
    fn event_sequences_keep_turns_ordered(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = SessionState::idle();
        let mut transcript = Transcript::new();
        let mut in_flight = 0usize;

        for event in events {
            let is_submit = matches!(event, Event::Submit { .. });
            let is_reply = matches!(event, Event::ReplyReceived { .. });
            let before_len = transcript.len();
            let before_last = transcript.last().map(TranscriptEntry::sender);
            let Ok(result) = transition(&state, event) else { continue };

            in_flight += send_count(&result.effects);
            if matches!(result.new_state.request, RequestState::Idle) {
                in_flight = 0;
            }
            prop_assert!(in_flight <= 1);

            apply(&mut transcript, &result.effects);
            if is_submit {
                prop_assert_eq!(transcript.len(), before_len + 1);
                prop_assert_eq!(transcript.last().map(TranscriptEntry::sender), Some(Sender::User));
            }
            if is_reply {
                prop_assert!(matches!(before_last, None | Some(Sender::User)));
            }
            state = result.new_state;
        }
    }
}
