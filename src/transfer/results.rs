//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

/// Result of setting up passive mode: the endpoint to advertise to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassiveModeResult {
    pub host: String,
    pub port: u16,
}

/// Result of setting up active mode (PORT command)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveModeResult {
    pub host: String,
    pub port: u16,
}
