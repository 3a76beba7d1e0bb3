//! History reconciliation
//!
//! Expands service-side turns into transcript entries. A failed fetch is never
//! fatal: it is reported to the diagnostic sink and yields nothing.

use crate::diagnostics::{DiagnosticSink, Severity};
use crate::session_id::SessionId;
use crate::transcript::{Transcript, TranscriptEntry};
use crate::transport::{ChatTransport, HistoryRecord};

const COMPONENT: &str = "history";

/// Expand records into (user, assistant) pairs, keeping their order.
/// Both entries of a pair carry the record's timestamp.
pub fn expand_records(records: Vec<HistoryRecord>) -> Vec<TranscriptEntry> {
    records
        .into_iter()
        .flat_map(|record| {
            [
                TranscriptEntry::user(record.user_message, record.timestamp),
                TranscriptEntry::assistant(record.assistant_response, record.timestamp),
            ]
        })
        .collect()
}

/// Loads prior turns for a session
pub struct HistoryReconciler<T, D> {
    transport: T,
    diagnostics: D,
    limit: usize,
}

impl<T: ChatTransport, D: DiagnosticSink> HistoryReconciler<T, D> {
    pub fn new(transport: T, diagnostics: D, limit: usize) -> Self {
        Self {
            transport,
            diagnostics,
            limit,
        }
    }

    /// Fetch and expand. Transport failures yield an empty list.
    pub async fn fetch_entries(&self, session_id: &SessionId) -> Vec<TranscriptEntry> {
        match self.transport.fetch_history(session_id, self.limit).await {
            Ok(records) => {
                self.diagnostics.record(
                    Severity::Debug,
                    COMPONENT,
                    &format!("Loaded {} turn(s) for {session_id}", records.len()),
                );
                expand_records(records)
            }
            Err(e) => {
                self.diagnostics.record(
                    Severity::Warn,
                    COMPONENT,
                    &format!("Failed to load history for {session_id}: {e}"),
                );
                Vec::new()
            }
        }
    }

    /// Append the session's history at the tail of `transcript`.
    /// Returns the number of entries added.
    pub async fn load_into(&self, transcript: &mut Transcript, session_id: &SessionId) -> usize {
        let entries = self.fetch_entries(session_id).await;
        let added = entries.len();
        transcript.extend(entries);
        added
    }
}
