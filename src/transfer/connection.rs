//! The data connection contract shared by active and passive modes.
//!
//! `ActiveConnection` and `PassiveConnection` also implement `AsyncRead` and
//! `AsyncWrite`, so with `AsyncReadExt`/`AsyncWriteExt` in scope a plain
//! `conn.read(..)` is ambiguous. Call the trait method explicitly:
//!
//! ```ignore
//! use tokio::io::AsyncReadExt;
//! use rax_ftp_datachannel::DataConnection;
//!
//! let n = DataConnection::read(&mut conn, &mut buf).await?;
//! ```

use async_trait::async_trait;

use crate::error::Result;

/// A byte-stream data connection, independent of how it was established.
///
/// The session layer reads `host`/`port` to advertise or log the endpoint,
/// drives the transfer with `read`/`write`, and calls `close` once when the
/// transfer ends or is aborted.
#[async_trait]
pub trait DataConnection: Send {
    /// Host recorded at construction.
    fn host(&self) -> &str;

    /// Port actually in use. For passive connections this is the port the OS
    /// bound, even when port 0 was requested.
    fn port(&self) -> u16;

    /// Reads into `buf`; `Ok(0)` means the peer closed its side.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Writes from `buf` and flushes it to the peer.
    async fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Releases the connection. Idempotent, and `Ok(())` for a connection
    /// that was never established.
    async fn close(&mut self) -> Result<()>;
}
