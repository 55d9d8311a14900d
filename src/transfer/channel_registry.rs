//! Module `channel_registry`
//!
//! Keeps the data connection negotiated by each session until a transfer
//! command claims it. A session has at most one pending data connection:
//! negotiating a new one closes whatever was there before.

use log::{info, warn};
use std::collections::HashMap;

use crate::transfer::connection::DataConnection;
use crate::transfer::modes::TransferMode;

/// A negotiated data connection waiting for its transfer.
pub struct ChannelEntry {
    mode: TransferMode,
    connection: Box<dyn DataConnection>,
}

impl ChannelEntry {
    pub fn new(mode: TransferMode, connection: Box<dyn DataConnection>) -> Self {
        Self { mode, connection }
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn into_connection(self) -> Box<dyn DataConnection> {
        self.connection
    }

    /// Closes the connection, logging rather than propagating failures.
    pub async fn cleanup(mut self, session_id: &str) {
        if let Err(e) = self.connection.close().await {
            warn!(
                "Failed to close {} data connection for session {}: {}",
                self.mode, session_id, e
            );
        }
    }
}

/// Registry that maps session identifiers to their negotiated data connection.
#[derive(Default)]
pub struct ChannelRegistry {
    registry: HashMap<String, ChannelEntry>,
}

impl ChannelRegistry {
    /// Inserts the entry for a session, closing any entry it replaces.
    pub async fn insert(&mut self, session_id: &str, entry: ChannelEntry) {
        if let Some(previous) = self.registry.insert(session_id.to_string(), entry) {
            info!(
                "Replacing existing {} data connection for session {}",
                previous.mode(),
                session_id
            );
            previous.cleanup(session_id).await;
        }
    }

    /// Removes and returns the entry so a transfer can drive it.
    pub fn take(&mut self, session_id: &str) -> Option<ChannelEntry> {
        self.registry.remove(session_id)
    }

    pub fn get(&self, session_id: &str) -> Option<&ChannelEntry> {
        self.registry.get(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.registry.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Closes and removes the entry for a session, if any.
    pub async fn cleanup(&mut self, session_id: &str) {
        if let Some(entry) = self.registry.remove(session_id) {
            entry.cleanup(session_id).await;
            info!("Cleaned up data connection for session {}", session_id);
        }
    }

    /// Closes every pending data connection.
    pub async fn cleanup_all(&mut self) {
        for (session_id, entry) in self.registry.drain() {
            entry.cleanup(&session_id).await;
        }
    }
}
