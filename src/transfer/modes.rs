//! FTP Transfer modes

use std::fmt;

/// How a data connection was negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// PORT: the server dials the client
    Active,
    /// PASV: the client dials the server
    Passive,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Active => write!(f, "active"),
            TransferMode::Passive => write!(f, "passive"),
        }
    }
}
