//! Chat service transport
//!
//! A common interface over the four remote operations, so the runtime can be
//! driven by the HTTP client in production and by mocks in tests.

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::{parse_timestamp, ChatReply, ClearAck, HealthStatus, HistoryRecord};

use crate::session_id::SessionId;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Default number of history records requested
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Remote operations against the chat service. Implementations never retry.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message and wait for the complete reply
    async fn send_message(
        &self,
        text: &str,
        session_id: &SessionId,
    ) -> Result<ChatReply, TransportError>;

    /// Fetch up to `limit` stored turns, oldest first
    async fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, TransportError>;

    /// Drop the service-side context for a session
    async fn clear_session(&self, session_id: &SessionId) -> Result<ClearAck, TransportError>;

    /// Liveness probe
    async fn health_check(&self) -> Result<HealthStatus, TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send_message(
        &self,
        text: &str,
        session_id: &SessionId,
    ) -> Result<ChatReply, TransportError> {
        (**self).send_message(text, session_id).await
    }

    async fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, TransportError> {
        (**self).fetch_history(session_id, limit).await
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<ClearAck, TransportError> {
        (**self).clear_session(session_id).await
    }

    async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        (**self).health_check().await
    }
}

/// Logging wrapper for a transport
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: ChatTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    fn log<R>(
        operation: &str,
        session_id: Option<&SessionId>,
        started: Instant,
        result: &Result<R, TransportError>,
    ) {
        let duration_ms = started.elapsed().as_millis();
        let session_id = session_id.map_or("-", SessionId::as_str);
        match result {
            Ok(_) => {
                tracing::info!(
                    operation,
                    session_id,
                    duration_ms = %duration_ms,
                    "Chat service call completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation,
                    session_id,
                    duration_ms = %duration_ms,
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Chat service call failed"
                );
            }
        }
    }
}

#[async_trait]
impl<T: ChatTransport> ChatTransport for LoggingTransport<T> {
    async fn send_message(
        &self,
        text: &str,
        session_id: &SessionId,
    ) -> Result<ChatReply, TransportError> {
        let started = Instant::now();
        let result = self.inner.send_message(text, session_id).await;
        Self::log("send_message", Some(session_id), started, &result);
        result
    }

    async fn fetch_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, TransportError> {
        let started = Instant::now();
        let result = self.inner.fetch_history(session_id, limit).await;
        Self::log("fetch_history", Some(session_id), started, &result);
        result
    }

    async fn clear_session(&self, session_id: &SessionId) -> Result<ClearAck, TransportError> {
        let started = Instant::now();
        let result = self.inner.clear_session(session_id).await;
        Self::log("clear_session", Some(session_id), started, &result);
        result
    }

    async fn health_check(&self) -> Result<HealthStatus, TransportError> {
        let started = Instant::now();
        let result = self.inner.health_check().await;
        Self::log("health_check", None, started, &result);
        result
    }
}
