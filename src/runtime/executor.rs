//! Session runtime executor

use super::{SessionUpdate, SessionView};
use crate::diagnostics::{DiagnosticSink, Severity};
use crate::history::HistoryReconciler;
use crate::session_id::SessionId;
use crate::state_machine::{transition, Effect, Event, SessionState};
use crate::transcript::Transcript;
use crate::transport::ChatTransport;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

const COMPONENT: &str = "session";

/// Runtime for one session, generic over transport and diagnostics
pub struct SessionRuntime<T, D>
where
    T: ChatTransport + 'static,
    D: DiagnosticSink + 'static,
{
    session_id: SessionId,
    state: SessionState,
    transcript: Transcript,
    transport: Arc<T>,
    reconciler: Arc<HistoryReconciler<Arc<T>, Arc<D>>>,
    diagnostics: Arc<D>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so the runtime stops once every handle is gone; background
    /// tasks upgrade it for as long as they run.
    event_tx: mpsc::WeakSender<Event>,
    updates_tx: broadcast::Sender<SessionUpdate>,
    view_tx: watch::Sender<SessionView>,
}

impl<T, D> SessionRuntime<T, D>
where
    T: ChatTransport + 'static,
    D: DiagnosticSink + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        state: SessionState,
        transport: Arc<T>,
        reconciler: HistoryReconciler<Arc<T>, Arc<D>>,
        diagnostics: Arc<D>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::WeakSender<Event>,
        updates_tx: broadcast::Sender<SessionUpdate>,
        view_tx: watch::Sender<SessionView>,
    ) -> Self {
        Self {
            session_id,
            state,
            transcript: Transcript::new(),
            transport,
            reconciler: Arc::new(reconciler),
            diagnostics,
            event_rx,
            event_tx,
            updates_tx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        // Events are handled strictly one at a time
        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }

        tracing::info!(session_id = %self.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let event_name = event.name();
        let result = match transition(&self.state, event) {
            Ok(r) => r,
            Err(e) => {
                // Refusals are user-facing (e.g. "already sending") but leave state alone
                self.diagnostics.record(
                    Severity::Debug,
                    COMPONENT,
                    &format!("Rejected {event_name}: {e}"),
                );
                let _ = self.updates_tx.send(SessionUpdate::Rejected {
                    reason: e.to_string(),
                });
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }

        self.view_tx.send_replace(SessionView::new(
            self.session_id.clone(),
            &self.transcript,
            &self.state,
        ));
    }

    /// Execute an effect. Transport effects spawn a background task that
    /// reports back through the event channel.
    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendEntries(entries) => {
                for entry in entries {
                    self.transcript.push(entry.clone());
                    let _ = self.updates_tx.send(SessionUpdate::EntryAppended(entry));
                }
            }

            Effect::ClearTranscript => {
                self.transcript.clear();
                let _ = self.updates_tx.send(SessionUpdate::TranscriptCleared);
            }

            Effect::PublishState => {
                let _ = self.updates_tx.send(SessionUpdate::StateChanged {
                    request: self.state.request,
                    resetting: self.state.is_resetting(),
                    error: self.state.error.clone(),
                });
            }

            Effect::TurnFinished(outcome) => {
                let _ = self.updates_tx.send(SessionUpdate::TurnFinished(outcome));
            }

            Effect::Diagnose { severity, message } => {
                self.diagnostics.record(severity, COMPONENT, &message);
            }

            Effect::SendMessage { text } => {
                let transport = self.transport.clone();
                let session_id = self.session_id.clone();
                self.spawn_transport_task(async move {
                    tracing::info!(session_id = %session_id, "Sending message (background)");
                    match transport.send_message(&text, &session_id).await {
                        Ok(reply) => Event::ReplyReceived {
                            text: reply.response,
                            at: Utc::now(),
                        },
                        Err(e) => Event::SendFailed { message: e.to_string() },
                    }
                });
            }

            Effect::ClearRemote => {
                let transport = self.transport.clone();
                let session_id = self.session_id.clone();
                self.spawn_transport_task(async move {
                    match transport.clear_session(&session_id).await {
                        Ok(_) => Event::ResetSucceeded,
                        Err(e) => Event::ResetFailed { message: e.to_string() },
                    }
                });
            }

            Effect::FetchHistory { epoch } => {
                let reconciler = self.reconciler.clone();
                let session_id = self.session_id.clone();
                self.spawn_transport_task(async move {
                    let entries = reconciler.fetch_entries(&session_id).await;
                    Event::HistoryLoaded { entries, epoch }
                });
            }
        }
    }

    fn spawn_transport_task<F>(&self, task: F)
    where
        F: std::future::Future<Output = Event> + Send + 'static,
    {
        let Some(event_tx) = self.event_tx.upgrade() else {
            // Every handle is gone; nobody is left to see the outcome.
            return;
        };
        tokio::spawn(async move {
            let event = task.await;
            let _ = event_tx.send(event).await;
        });
    }
}
