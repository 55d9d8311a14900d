//! Data connections for the RAX FTP server.
//!
//! A session opens one data connection per transfer, either by dialing the
//! client (active mode) or by listening for it (passive mode, optionally
//! TLS). Both sit behind [`DataConnection`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod transfer;
pub mod utils;

pub use crate::config::DataChannelConfig;
pub use diagnostics::{DiagnosticSink, LogSink, SharedSink};
pub use error::{DataConnectionError, Result};
pub use transfer::{ActiveConnection, DataConnection, PassiveConnection};
