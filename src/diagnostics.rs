//! Diagnostic sink
//!
//! The session core reports non-user-facing problems (a failed history load,
//! a rejected submit) here instead of writing to any particular output.

use std::sync::{Arc, Mutex};

/// Severity of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, severity: Severity, component: &'static str, message: &str);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn record(&self, severity: Severity, component: &'static str, message: &str) {
        (**self).record(severity, component, message);
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, severity: Severity, component: &'static str, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(component, "{message}"),
            Severity::Info => tracing::info!(component, "{message}"),
            Severity::Warn => tracing::warn!(component, "{message}"),
            Severity::Error => tracing::error!(component, "{message}"),
        }
    }
}

/// A captured diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub component: &'static str,
    pub message: String,
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Records at or above `severity`
    pub fn at_least(&self, severity: Severity) -> Vec<DiagnosticRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.severity >= severity)
            .collect()
    }
}

impl DiagnosticSink for RecordingSink {
    fn record(&self, severity: Severity, component: &'static str, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(DiagnosticRecord {
                severity,
                component,
                message: message.to_string(),
            });
        }
    }
}
