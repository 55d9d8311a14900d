//! TLS helpers for FTPS data connections.
//!
//! - Loads a PEM certificate chain and private key into a rustls
//!   `ServerConfig` pinned to the ring provider.
//! - Wraps a config in the acceptor used by passive listeners.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

use crate::error::{DataConnectionError, Result};

pub use tokio_rustls::TlsAcceptor;

/// Build a server config from an in-memory certificate chain and key.
pub fn server_config(
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<Arc<ServerConfig>> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| DataConnectionError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| DataConnectionError::Tls(e.to_string()))?;
    Ok(Arc::new(config))
}

/// Read a PEM certificate chain and private key from disk.
pub fn load_server_config(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<Arc<ServerConfig>> {
    let cert_path = cert_path.as_ref();
    let key_path = key_path.as_ref();

    let mut cert_reader = BufReader::new(File::open(cert_path).map_err(|e| {
        DataConnectionError::Tls(format!("cannot open {}: {}", cert_path.display(), e))
    })?);
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| DataConnectionError::Tls(format!("bad certificate PEM: {}", e)))?;
    if certs.is_empty() {
        return Err(DataConnectionError::Tls(format!(
            "no certificates found in {}",
            cert_path.display()
        )));
    }

    let mut key_reader = BufReader::new(File::open(key_path).map_err(|e| {
        DataConnectionError::Tls(format!("cannot open {}: {}", key_path.display(), e))
    })?);
    let key = rustls_pemfile::private_key(&mut key_reader)
        .map_err(|e| DataConnectionError::Tls(format!("bad key PEM: {}", e)))?
        .ok_or_else(|| {
            DataConnectionError::Tls(format!("no private key found in {}", key_path.display()))
        })?;

    server_config(certs, key)
}

pub fn acceptor(config: Arc<ServerConfig>) -> TlsAcceptor {
    TlsAcceptor::from(config)
}
