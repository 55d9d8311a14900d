//! Transfer operations
//!
//! Opens data connections on behalf of the session layer and registers them
//! in the [`ChannelRegistry`] until a transfer command claims them.

use std::net::Ipv4Addr;

use log::info;

use crate::config::DataChannelConfig;
use crate::diagnostics::SharedSink;
use crate::error::{DataConnectionError, Result, handle_error};
use crate::transfer::active::ActiveConnection;
use crate::transfer::channel_registry::{ChannelEntry, ChannelRegistry};
use crate::transfer::connection::DataConnection;
use crate::transfer::modes::TransferMode;
use crate::transfer::passive::PassiveConnection;
use crate::transfer::results::{ActiveModeResult, PassiveModeResult};
use crate::transfer::tls::TlsAcceptor;

/// Sets up passive mode: binds an ephemeral port on the configured address
/// and registers the pending connection for `session_id`.
///
/// Returns the endpoint to advertise; the peer may connect any time before
/// the accept deadline.
pub async fn setup_passive_mode(
    channel_registry: &mut ChannelRegistry,
    session_id: &str,
    config: &DataChannelConfig,
    sink: SharedSink,
    tls: Option<TlsAcceptor>,
) -> Result<PassiveModeResult> {
    let connection = PassiveConnection::listen(
        &config.bind_address,
        0,
        session_id,
        sink,
        tls,
        config.accept_timeout(),
    )
    .await
    .inspect_err(|e| handle_error(session_id, e))?;

    let result = PassiveModeResult {
        host: connection.host().to_string(),
        port: connection.port(),
    };

    channel_registry
        .insert(
            session_id,
            ChannelEntry::new(TransferMode::Passive, Box::new(connection)),
        )
        .await;

    info!(
        "Session {} listening for passive data connection on {}:{}",
        session_id, result.host, result.port
    );

    Ok(result)
}

/// Sets up active mode (PORT command): dials the client's endpoint and
/// registers the connection for `session_id`.
pub async fn setup_active_mode(
    channel_registry: &mut ChannelRegistry,
    session_id: &str,
    host: &str,
    port: u16,
    config: &DataChannelConfig,
    sink: SharedSink,
) -> Result<ActiveModeResult> {
    let connection =
        ActiveConnection::connect(host, port, session_id, sink, config.dial_timeout())
            .await
            .inspect_err(|e| handle_error(session_id, e))?;

    let result = ActiveModeResult {
        host: connection.host().to_string(),
        port: connection.port(),
    };

    channel_registry
        .insert(
            session_id,
            ChannelEntry::new(TransferMode::Active, Box::new(connection)),
        )
        .await;

    info!(
        "Session {} connected active data connection to {}:{}",
        session_id, result.host, result.port
    );

    Ok(result)
}

/// Formats the 227 reply advertising an IPv4 passive endpoint.
pub fn pasv_reply(host: &str, port: u16) -> Result<String> {
    let ip: Ipv4Addr = host
        .parse()
        .map_err(|_| DataConnectionError::resolution(host, "PASV needs an IPv4 address"))?;
    let [h1, h2, h3, h4] = ip.octets();
    let [p1, p2] = port.to_be_bytes();
    Ok(format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).\r\n",
        h1, h2, h3, h4, p1, p2
    ))
}

/// Formats the 229 reply advertising a passive port (EPSV).
pub fn epsv_reply(port: u16) -> String {
    format!("229 Entering Extended Passive Mode (|||{}|)\r\n", port)
}

/// Parses a PORT argument `h1,h2,h3,h4,p1,p2` into host and port.
pub fn parse_port_argument(argument: &str) -> Result<(String, u16)> {
    let malformed = |reason: &str| DataConnectionError::resolution(argument.trim(), reason);

    let fields = argument
        .trim()
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| malformed("each field must be a number from 0 to 255"))?;

    let [h1, h2, h3, h4, p1, p2] = fields[..] else {
        return Err(malformed("expected six comma-separated fields"));
    };

    let port = u16::from_be_bytes([p1, p2]);
    if port == 0 {
        return Err(malformed("port 0 is not dialable"));
    }

    Ok((Ipv4Addr::new(h1, h2, h3, h4).to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasv_reply_encodes_host_and_port() {
        let reply = pasv_reply("127.0.0.1", 50001).unwrap();
        assert_eq!(reply, "227 Entering Passive Mode (127,0,0,1,195,81).\r\n");
    }

    #[test]
    fn pasv_reply_rejects_non_ipv4_hosts() {
        assert!(pasv_reply("::1", 2121).is_err());
        assert!(pasv_reply("localhost", 2121).is_err());
    }

    #[test]
    fn epsv_reply_carries_port_only() {
        assert_eq!(
            epsv_reply(40000),
            "229 Entering Extended Passive Mode (|||40000|)\r\n"
        );
    }

    #[test]
    fn parses_port_argument() {
        let (host, port) = parse_port_argument("192,168,1,20,7,138").unwrap();
        assert_eq!(host, "192.168.1.20");
        assert_eq!(port, 7 * 256 + 138);
    }

    #[test]
    fn rejects_malformed_port_arguments() {
        assert!(parse_port_argument("192,168,1,20,7").is_err());
        assert!(parse_port_argument("192,168,1,20,7,138,1").is_err());
        assert!(parse_port_argument("192,168,1,300,7,138").is_err());
        assert!(parse_port_argument("a,b,c,d,e,f").is_err());
        assert!(parse_port_argument("127,0,0,1,0,0").is_err());
    }
}
