//! Runtime for executing a chat session
//!
//! One runtime task per session owns the transcript and the state machine
//! state. Boundary actions and transport completions arrive as events on a
//! single channel and are processed one at a time, so the single-flight check
//! always runs before any suspension point.

mod executor;


pub use executor::SessionRuntime;

use crate::diagnostics::DiagnosticSink;
use crate::history::HistoryReconciler;
use crate::session_id::SessionId;
use crate::state_machine::{Event, RequestState, SessionState, TurnOutcome};
use crate::transcript::{Transcript, TranscriptEntry};
use crate::transport::ChatTransport;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

/// Incremental notifications for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    EntryAppended(TranscriptEntry),
    TranscriptCleared,
    StateChanged {
        request: RequestState,
        resetting: bool,
        error: Option<String>,
    },
    TurnFinished(TurnOutcome),
    /// An action was refused (busy, empty input); nothing changed
    Rejected {
        reason: String,
    },
}

/// Snapshot of everything a presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub session_id: SessionId,
    pub entries: Vec<TranscriptEntry>,
    pub state: SessionState,
}

impl SessionView {
    fn new(session_id: SessionId, transcript: &Transcript, state: &SessionState) -> Self {
        Self {
            session_id,
            entries: transcript.entries().to_vec(),
            state: state.clone(),
        }
    }

    pub fn request(&self) -> RequestState {
        self.state.request
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Loading indicator on, input surface disabled
    pub fn is_busy(&self) -> bool {
        !self.state.input_enabled()
    }

    /// Nothing to show yet (welcome screen)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Session runtime has stopped")]
    Stopped,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    event_tx: mpsc::Sender<Event>,
    updates_tx: broadcast::Sender<SessionUpdate>,
    view_rx: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Send an event to the session
    pub async fn send_event(&self, event: Event) -> Result<(), RuntimeError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| RuntimeError::Stopped)
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send_event(Event::submit(text)).await
    }

    pub async fn load_history(&self) -> Result<(), RuntimeError> {
        self.send_event(Event::LoadHistory).await
    }

    pub async fn dismiss_error(&self) -> Result<(), RuntimeError> {
        self.send_event(Event::DismissError).await
    }

    /// Start the remote clear. Confirmation must already have been given.
    pub async fn reset_confirmed(&self) -> Result<(), RuntimeError> {
        self.send_event(Event::ResetConfirmed).await
    }

    /// Subscribe to session updates
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Wait until the published view satisfies `predicate`
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionView) -> bool,
        timeout: Duration,
    ) -> Option<SessionView> {
        let mut rx = self.view_rx.clone();
        // The watch guard borrows `rx`; clone out of it before `rx` drops
        let view = match tokio::time::timeout(timeout, rx.wait_for(predicate)).await {
            Ok(Ok(view)) => Some(view.clone()),
            _ => None,
        };
        view
    }
}

/// Start a runtime for `session_id` on the current tokio runtime
pub fn spawn_session<T, D>(
    session_id: SessionId,
    transport: Arc<T>,
    diagnostics: Arc<D>,
    history_limit: usize,
) -> SessionHandle
where
    T: ChatTransport + 'static,
    D: DiagnosticSink + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (updates_tx, _) = broadcast::channel(128);
    let state = SessionState::idle();
    let (view_tx, view_rx) = watch::channel(SessionView::new(
        session_id.clone(),
        &Transcript::new(),
        &state,
    ));

    let reconciler = HistoryReconciler::new(transport.clone(), diagnostics.clone(), history_limit);
    let runtime = SessionRuntime::new(
        session_id.clone(),
        state,
        transport,
        reconciler,
        diagnostics,
        event_rx,
        event_tx.downgrade(),
        updates_tx.clone(),
        view_tx,
    );

    let id = session_id.clone();
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %id, "Session runtime finished");
    });

    SessionHandle {
        session_id,
        event_tx,
        updates_tx,
        view_rx,
    }
}
