//! Events that can occur in a session

use crate::transcript::TranscriptEntry;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
        /// When the user pressed send
        at: DateTime<Utc>,
    },
    DismissError,
    /// Clear was requested and confirmed at the boundary
    ResetConfirmed,
    LoadHistory,

    // Transport events
    ReplyReceived {
        text: String,
        at: DateTime<Utc>,
    },
    SendFailed {
        message: String,
    },
    HistoryLoaded {
        entries: Vec<TranscriptEntry>,
        /// Clear epoch the fetch was started under
        epoch: u64,
    },
    ResetSucceeded,
    ResetFailed {
        message: String,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::DismissError => "dismiss_error",
            Event::ResetConfirmed => "reset_confirmed",
            Event::LoadHistory => "load_history",
            Event::ReplyReceived { .. } => "reply_received",
            Event::SendFailed { .. } => "send_failed",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::ResetSucceeded => "reset_succeeded",
            Event::ResetFailed { .. } => "reset_failed",
        }
    }
}
