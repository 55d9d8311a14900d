//! Error handling
//!
//! Defines the data connection error type and its mapping to FTP replies.

pub mod handlers;
pub mod types;

pub use handlers::{error_to_ftp_code, handle_error};
pub use types::*;
