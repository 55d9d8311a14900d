//! Error types
//!
//! Errors produced while opening, accepting or using a data connection.
//!
//! Every variant is `Clone`: an accept failure is cached by the readiness
//! gate and handed back to each later caller, so I/O sources are shared
//! through an `Arc`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataConnectionError>;

#[derive(Debug, Clone, Error)]
pub enum DataConnectionError {
    /// Host/port could not be turned into a socket address.
    #[error("Cannot resolve {endpoint}: {reason}")]
    AddressResolution { endpoint: String, reason: String },

    /// Active mode: the remote endpoint refused or did not answer in time.
    #[error("Failed to connect to {endpoint}: {source}")]
    Dial {
        endpoint: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// Passive mode: the listening socket could not be bound.
    #[error("Failed to listen on {endpoint}: {source}")]
    Listen {
        endpoint: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// Passive mode: nobody connected before the accept deadline.
    #[error("No data connection on port {port} within {timeout:?}")]
    AcceptTimeout { port: u16, timeout: Duration },

    /// Passive mode: accept or TLS handshake failed.
    #[error("Failed to accept data connection on port {port}: {source}")]
    Accept {
        port: u16,
        #[source]
        source: Arc<io::Error>,
    },

    /// The certificate or key for the data channel could not be loaded.
    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Data connection is closed")]
    Closed,

    #[error("Data transfer failed: {0}")]
    Io(#[source] Arc<io::Error>),
}

impl DataConnectionError {
    pub fn resolution(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::AddressResolution {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn dial(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self::Dial {
            endpoint: endpoint.into(),
            source: Arc::new(source),
        }
    }

    pub fn listen(endpoint: impl Into<String>, source: io::Error) -> Self {
        Self::Listen {
            endpoint: endpoint.into(),
            source: Arc::new(source),
        }
    }

    pub fn accept(port: u16, source: io::Error) -> Self {
        Self::Accept {
            port,
            source: Arc::new(source),
        }
    }

    /// True for failures that happened before a connection object existed.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::AddressResolution { .. } | Self::Dial { .. } | Self::Listen { .. } | Self::Tls(_)
        )
    }

    /// Converts into an `io::Error` for the `AsyncRead`/`AsyncWrite` surface.
    pub fn into_io(self) -> io::Error {
        let kind = match &self {
            Self::AcceptTimeout { .. } => io::ErrorKind::TimedOut,
            Self::Closed => io::ErrorKind::NotConnected,
            Self::Io(e) | Self::Accept { source: e, .. } | Self::Dial { source: e, .. } => e.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, self)
    }
}

impl From<io::Error> for DataConnectionError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}
