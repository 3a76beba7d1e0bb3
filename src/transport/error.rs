//! Transport error types

use thiserror::Error;

/// Failure reaching or interpreting the chat service
///
/// Callers only distinguish success from failure. `kind` and `status` are
/// carried for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }
}

/// Where the failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS, timeouts
    Network,
    /// Service answered with a non-2xx status
    Status,
    /// Body did not match the expected shape
    Decode,
}

impl TransportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Status => "status",
            Self::Decode => "decode",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            TransportError::decode(format!("Malformed response: {e}"))
        } else if let Some(status) = e.status() {
            TransportError::status(status.as_u16(), e.to_string())
        } else {
            TransportError::network(e.to_string())
        }
    }
}
