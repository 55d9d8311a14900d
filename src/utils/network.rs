//! Network utilities
//!
//! Address formatting and resolution shared by both connection modes.

use std::net::SocketAddr;

use tokio::net::lookup_host;

use crate::error::{DataConnectionError, Result};

/// Format `host:port`, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Resolve a host and port to the first matching socket address.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let endpoint = join_host_port(host, port);
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let mut addrs = lookup_host((host, port))
        .await
        .map_err(|e| DataConnectionError::resolution(&endpoint, e))?;

    addrs
        .next()
        .ok_or_else(|| DataConnectionError::resolution(&endpoint, "no addresses found"))
}
