//! Module `active`
//!
//! Active mode (PORT): the server dials out to an endpoint supplied by the
//! client. The dial happens during construction, so an `ActiveConnection`
//! always holds an established stream.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::diagnostics::SharedSink;
use crate::error::{DataConnectionError, Result};
use crate::transfer::connection::DataConnection;
use crate::utils::network::{join_host_port, resolve};

pub struct ActiveConnection {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
    session_id: String,
    sink: SharedSink,
    closed: bool,
}

impl ActiveConnection {
    /// Resolves `host:port` and dials it, giving up after `dial_timeout`.
    ///
    /// # Errors
    ///
    /// * `AddressResolution` - the host/port is malformed or does not resolve
    /// * `Dial` - the connection was refused or timed out
    pub async fn connect(
        host: &str,
        port: u16,
        session_id: &str,
        sink: SharedSink,
        dial_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = join_host_port(host, port);
        sink.record(
            session_id,
            &format!("Opening active data connection to {}", endpoint),
        );

        if port == 0 {
            let err = DataConnectionError::resolution(&endpoint, "port 0 is not dialable");
            sink.record(session_id, &err.to_string());
            return Err(err);
        }

        let addr = resolve(host, port)
            .await
            .inspect_err(|e| sink.record(session_id, &e.to_string()))?;

        let stream = match timeout(dial_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                let err = DataConnectionError::dial(&endpoint, e);
                sink.record(session_id, &err.to_string());
                return Err(err);
            }
            Err(_) => {
                let err = DataConnectionError::dial(
                    &endpoint,
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no answer within {:?}", dial_timeout),
                    ),
                );
                sink.record(session_id, &err.to_string());
                return Err(err);
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY on data connection to {}: {}", endpoint, e);
        }

        sink.record(
            session_id,
            &format!("Opened active data connection to {}", endpoint),
        );

        Ok(Self {
            host: host.to_string(),
            port,
            stream: Some(stream),
            session_id: session_id.to_string(),
            sink,
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(DataConnectionError::Closed)
    }
}

#[async_trait]
impl DataConnection for ActiveConnection {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.stream_mut()?.read(buf).await?)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        let n = stream.write(buf).await?;
        stream.flush().await?;
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = match self.stream.take() {
            Some(mut stream) => shutdown_quietly(&mut stream).await,
            None => Ok(()),
        };
        self.sink.record(
            &self.session_id,
            &format!(
                "Closed active data connection to {}",
                join_host_port(&self.host, self.port)
            ),
        );
        result
    }
}

/// Shuts down the write side; a peer that already went away is not an error.
pub(crate) async fn shutdown_quietly<S>(stream: &mut S) -> Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    match stream.shutdown().await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotConnected => {
            debug!("Data connection peer already disconnected");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

impl AsyncRead for ActiveConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let stream = self.get_mut().stream_mut().map_err(DataConnectionError::into_io)?;
        Pin::new(stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for ActiveConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let stream = self.get_mut().stream_mut().map_err(DataConnectionError::into_io)?;
        Pin::new(stream).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_flush(cx),
            None => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut().stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}
