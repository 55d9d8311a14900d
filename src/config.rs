//! Configuration for data connections
//!
//! Timeouts and TLS material used when opening active and passive data
//! connections. Loaded from an optional `datachannel.toml` with environment
//! overrides, mirroring how the control server reads `config.toml`.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;
use crate::transfer::tls::{self, TlsAcceptor};

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Deserialize, Clone)]
pub struct DataChannelConfig {
    /// Local address passive listeners bind to.
    /// Environment: RAX_FTP_DATA_BIND_ADDRESS
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Upper bound on an active-mode dial.
    /// Environment: RAX_FTP_DATA_DIAL_TIMEOUT_MS
    #[serde(default = "default_timeout_ms")]
    pub dial_timeout_ms: u64,

    /// Upper bound on waiting for a passive-mode peer, handshake included.
    /// Environment: RAX_FTP_DATA_ACCEPT_TIMEOUT_MS
    #[serde(default = "default_timeout_ms")]
    pub accept_timeout_ms: u64,

    /// PEM certificate chain for FTPS data connections.
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    /// PEM private key matching `tls_cert_path`.
    #[serde(default)]
    pub tls_key_path: Option<String>,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for DataChannelConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dial_timeout_ms: DEFAULT_TIMEOUT_MS,
            accept_timeout_ms: DEFAULT_TIMEOUT_MS,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl DataChannelConfig {
    /// Load configuration from datachannel.toml (if present) with environment overrides
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        Self::load_from("datachannel")
    }

    /// Load configuration from the given file stem; a missing file is not an error
    pub fn load_from(path: &str) -> std::result::Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_FTP_DATA"))
            .build()?;

        let config: DataChannelConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Config with both timeouts set to `timeout`, handy for short-lived sessions
    pub fn with_timeouts(timeout: Duration) -> Self {
        let timeout_ms = u64::try_from(timeout.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        Self {
            dial_timeout_ms: timeout_ms,
            accept_timeout_ms: timeout_ms,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.dial_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "dial_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.accept_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "accept_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.tls_cert_path.is_some() != self.tls_key_path.is_some() {
            return Err(config::ConfigError::Message(
                "tls_cert_path and tls_key_path must be set together".into(),
            ));
        }

        Ok(())
    }

    /// Get dial timeout as Duration
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    /// Get accept timeout as Duration
    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }

    /// Build the TLS acceptor for passive connections, if TLS is configured
    pub fn tls_acceptor(&self) -> Result<Option<TlsAcceptor>> {
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => {
                let server_config = tls::load_server_config(cert, key)?;
                Ok(Some(tls::acceptor(server_config)))
            }
            _ => Ok(None),
        }
    }
}
