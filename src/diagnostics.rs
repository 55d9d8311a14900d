//! Diagnostic sink
//!
//! Data connections report open/close events and failures through a
//! [`DiagnosticSink`]. The sink is opaque to this crate; nothing it does can
//! fail a transfer.

use std::sync::Arc;

use log::info;

/// Receives per-session diagnostic messages.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, session_id: &str, message: &str);
}

/// Shared handle passed to every connection.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Default sink: forwards every record to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, session_id: &str, message: &str) {
        info!("[{}] {}", session_id, message);
    }
}

impl LogSink {
    pub fn shared() -> SharedSink {
        Arc::new(LogSink)
    }
}
