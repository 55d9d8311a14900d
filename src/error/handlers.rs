//! Error handlers
//!
//! Maps data connection errors onto FTP reply codes.

use crate::error::types::DataConnectionError;
use log::{error, warn};

/// Log a data connection error. Setup failures mean the negotiation itself
/// failed; anything later is an aborted transfer.
pub fn handle_error(session_id: &str, err: &DataConnectionError) {
    if err.is_setup_error() {
        error!("[{}] Data connection setup failed: {}", session_id, err);
    } else {
        warn!("[{}] Data connection error: {}", session_id, err);
    }
}

/// Convert error to FTP response code
pub fn error_to_ftp_code(err: &DataConnectionError) -> u16 {
    match err {
        DataConnectionError::AddressResolution { .. } => 501,
        DataConnectionError::Dial { .. } => 425,
        DataConnectionError::Listen { .. } => 425,
        DataConnectionError::AcceptTimeout { .. } => 425,
        DataConnectionError::Accept { .. } => 425,
        DataConnectionError::Tls(_) => 431,
        DataConnectionError::Closed => 426,
        DataConnectionError::Io(_) => 426,
    }
}
