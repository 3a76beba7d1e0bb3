//! Session state machine
//!
//! Pure transitions: `(state, event) -> (state, effects)`. The runtime owns
//! the transcript and executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, TurnOutcome};
pub use event::Event;
pub use state::{RequestState, SessionState, CLEAR_FAILED_MESSAGE, SEND_FAILED_MESSAGE};
pub use transition::{transition, TransitionError, TransitionResult};
