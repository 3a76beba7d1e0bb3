//! Chat client
//!
//! Owns the current session and turns the boundary actions a presentation
//! layer offers (send, clear, new session, health) into session events.

mod confirm;

pub use confirm::{AutoConfirm, ConfirmAction, Confirmation};

use crate::diagnostics::DiagnosticSink;
use crate::runtime::{spawn_session, RuntimeError, SessionHandle};
use crate::session_id::SessionId;
use crate::transport::{ChatTransport, HealthStatus, TransportError};
use std::sync::Arc;

pub struct ChatClient<T, D> {
    transport: Arc<T>,
    diagnostics: Arc<D>,
    history_limit: usize,
    session: SessionHandle,
    resumed: bool,
}

impl<T, D> ChatClient<T, D>
where
    T: ChatTransport + 'static,
    D: DiagnosticSink + 'static,
{
    /// Start with a freshly generated session
    pub async fn start(
        transport: Arc<T>,
        diagnostics: Arc<D>,
        history_limit: usize,
    ) -> Result<Self, RuntimeError> {
        let session_id = SessionId::generate();
        let session = Self::open(session_id, &transport, &diagnostics, history_limit).await?;
        Ok(Self {
            transport,
            diagnostics,
            history_limit,
            session,
            resumed: false,
        })
    }

    /// Attach to `session_id` and load whatever the service remembers for it
    pub async fn resume(
        session_id: SessionId,
        transport: Arc<T>,
        diagnostics: Arc<D>,
        history_limit: usize,
    ) -> Result<Self, RuntimeError> {
        let session = Self::open(session_id, &transport, &diagnostics, history_limit).await?;
        Ok(Self {
            transport,
            diagnostics,
            history_limit,
            session,
            resumed: true,
        })
    }

    async fn open(
        session_id: SessionId,
        transport: &Arc<T>,
        diagnostics: &Arc<D>,
        history_limit: usize,
    ) -> Result<SessionHandle, RuntimeError> {
        tracing::info!(session_id = %session_id, "Opening session");
        let handle = spawn_session(
            session_id,
            transport.clone(),
            diagnostics.clone(),
            history_limit,
        );
        handle.load_history().await?;
        Ok(handle)
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn session_id(&self) -> &SessionId {
        self.session.session_id()
    }

    /// Whether the current session was attached by id rather than generated
    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.session.submit(text).await
    }

    pub async fn dismiss_error(&self) -> Result<(), RuntimeError> {
        self.session.dismiss_error().await
    }

    /// Ask for confirmation, then clear the session. Returns whether the
    /// clear was started.
    pub async fn request_clear(&self, confirm: &dyn Confirmation) -> Result<bool, RuntimeError> {
        if !confirm.confirm(ConfirmAction::ClearChat).await {
            return Ok(false);
        }
        self.session.reset_confirmed().await?;
        Ok(true)
    }

    /// Ask for confirmation, then switch to a new session id. The previous
    /// session is left untouched on the service.
    pub async fn request_new_session(
        &mut self,
        confirm: &dyn Confirmation,
    ) -> Result<bool, RuntimeError> {
        if !confirm.confirm(ConfirmAction::NewSession).await {
            return Ok(false);
        }
        // The old runtime stops once its last in-flight call reports back
        self.session = Self::open(
            SessionId::generate(),
            &self.transport,
            &self.diagnostics,
            self.history_limit,
        )
        .await?;
        self.resumed = false;
        Ok(true)
    }

    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        self.transport.health_check().await
    }
}
