//! Effects produced by state transitions

use crate::diagnostics::Severity;
use crate::transcript::TranscriptEntry;

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append entries at the tail of the transcript
    AppendEntries(Vec<TranscriptEntry>),

    /// Replace the transcript with an empty one
    ClearTranscript,

    /// Send a user message (spawns as background task)
    SendMessage { text: String },

    /// Clear the service-side session (spawns as background task)
    ClearRemote,

    /// Fetch prior turns (spawns as background task); the result is tagged
    /// with `epoch`
    FetchHistory { epoch: u64 },

    /// Publish the new state to observers
    PublishState,

    /// A turn reached a terminal state
    TurnFinished(TurnOutcome),

    /// Write to the diagnostic sink
    Diagnose { severity: Severity, message: String },
}

impl Effect {
    pub fn append(entry: TranscriptEntry) -> Self {
        Effect::AppendEntries(vec![entry])
    }

    pub fn diagnose(severity: Severity, message: impl Into<String>) -> Self {
        Effect::Diagnose {
            severity,
            message: message.into(),
        }
    }
}
