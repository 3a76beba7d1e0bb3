//! Session state types

use serde::{Deserialize, Serialize};

/// Banner shown after a failed send
pub const SEND_FAILED_MESSAGE: &str = "Failed to get response. Please try again.";

/// Banner shown after a failed clear
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear chat. Please try again.";

/// Whether a chat turn is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Ready for user input
    #[default]
    Idle,
    /// A message was accepted and its reply is outstanding
    Sending,
}

/// Everything the transition function needs to decide. The transcript itself
/// lives in the runtime and only changes through effects.
///
/// `request` is the only guard on user actions; the reset counters are
/// bookkeeping for completion events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub request: RequestState,
    /// Remote clears still awaiting their outcome
    #[serde(default)]
    pub pending_resets: u32,
    /// Bumped on every successful clear; history fetched under an older
    /// epoch is dropped
    #[serde(default)]
    pub clear_epoch: u64,
    /// Error banner currently displayed
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_sending(&self) -> bool {
        self.request == RequestState::Sending
    }

    pub fn is_resetting(&self) -> bool {
        self.pending_resets > 0
    }

    /// The input surface accepts new messages
    pub fn input_enabled(&self) -> bool {
        !self.is_sending()
    }
}
