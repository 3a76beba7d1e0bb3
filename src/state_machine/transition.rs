//! Pure state transition function
//!
//! A turn runs `Idle -> Validating -> Sending -> {Completed | Failed} -> Idle`.
//! Validation happens inside the `Submit` arm, so only `Idle` and `Sending`
//! are ever stored.

use super::state::{CLEAR_FAILED_MESSAGE, SEND_FAILED_MESSAGE};
use super::{Effect, Event, RequestState, SessionState, TurnOutcome};
use crate::diagnostics::Severity;
use crate::transcript::TranscriptEntry;
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
}

/// Reasons an event is refused. A refused event never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A message is already being sent")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    Unexpected(String),
}

/// Pure transition function
///
/// Given the same inputs, always produces the same outputs, with no I/O.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.request, event) {
        // ============================================================
        // Submit
        // ============================================================
        (RequestState::Sending, Event::Submit { .. }) => Err(TransitionError::Busy),

        (RequestState::Idle, Event::Submit { text, at }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            let new_state = SessionState {
                request: RequestState::Sending,
                error: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(TranscriptEntry::user(text, at)))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::SendMessage {
                    text: text.to_string(),
                }))
        }

        // ============================================================
        // Turn completion
        // ============================================================
        (RequestState::Sending, Event::ReplyReceived { text, at }) => {
            let new_state = SessionState {
                request: RequestState::Idle,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(TranscriptEntry::assistant(text, at)))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::TurnFinished(TurnOutcome::Completed)))
        }

        // The user entry stays; no rollback.
        (RequestState::Sending, Event::SendFailed { message }) => {
            let new_state = SessionState {
                request: RequestState::Idle,
                error: Some(SEND_FAILED_MESSAGE.to_string()),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::diagnose(
                    Severity::Error,
                    format!("Error sending message: {message}"),
                ))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::TurnFinished(TurnOutcome::Failed)))
        }

        (RequestState::Idle, event @ (Event::ReplyReceived { .. } | Event::SendFailed { .. })) => {
            Err(TransitionError::Unexpected(format!(
                "{} while no message is in flight",
                event.name()
            )))
        }

        // ============================================================
        // Reset
        // ============================================================

        // Confirmation is the only precondition; a send in flight keeps going
        (_, Event::ResetConfirmed) => {
            let new_state = SessionState {
                pending_resets: state.pending_resets + 1,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::ClearRemote))
        }

        // A reply still in flight lands on the emptied transcript.
        (_, Event::ResetSucceeded) if state.is_resetting() => {
            let new_state = SessionState {
                pending_resets: state.pending_resets - 1,
                clear_epoch: state.clear_epoch + 1,
                error: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearTranscript)
                .with_effect(Effect::PublishState))
        }

        // Local transcript is kept as-is.
        (_, Event::ResetFailed { message }) if state.is_resetting() => {
            let new_state = SessionState {
                pending_resets: state.pending_resets - 1,
                error: Some(CLEAR_FAILED_MESSAGE.to_string()),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::diagnose(
                    Severity::Error,
                    format!("Error clearing chat: {message}"),
                ))
                .with_effect(Effect::PublishState))
        }

        (_, event @ (Event::ResetSucceeded | Event::ResetFailed { .. })) => {
            Err(TransitionError::Unexpected(format!(
                "{} while no reset is in flight",
                event.name()
            )))
        }

        // ============================================================
        // History and banner
        // ============================================================
        (_, Event::LoadHistory) => Ok(TransitionResult::new(state.clone()).with_effect(
            Effect::FetchHistory {
                epoch: state.clear_epoch,
            },
        )),

        // Fetched before a clear went through: the service no longer has it
        (_, Event::HistoryLoaded { entries, epoch }) if epoch != state.clear_epoch => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::diagnose(
                Severity::Debug,
                format!(
                    "Dropped {} history entries loaded before the chat was cleared",
                    entries.len()
                ),
            )))
        }

        (_, Event::HistoryLoaded { entries, .. }) => {
            let result = TransitionResult::new(state.clone());
            if entries.is_empty() {
                Ok(result)
            } else {
                Ok(result.with_effect(Effect::AppendEntries(entries)))
            }
        }

        (_, Event::DismissError) => {
            if state.error.is_none() {
                return Ok(TransitionResult::new(state.clone()));
            }
            let new_state = SessionState {
                error: None,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishState))
        }
    }
}
