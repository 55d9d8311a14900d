//! Module `passive`
//!
//! Passive mode (PASV): the server binds a listening port, reports it to the
//! client over the control channel, and accepts exactly one inbound data
//! connection in the background.
//!
//! Construction returns as soon as the port is bound, so the session layer
//! can advertise `host():port()` before the peer dials in. The first `read`
//! or `write` waits on the readiness gate until the accept task has either
//! produced a stream or failed. A failure is terminal and every later call
//! gets the same error.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::diagnostics::SharedSink;
use crate::error::{DataConnectionError, Result};
use crate::transfer::active::shutdown_quietly;
use crate::transfer::connection::DataConnection;
use crate::transfer::gate::{self, GateResolver, GateStatus, ReadinessGate};
use crate::transfer::stream::DataStream;
use crate::transfer::tls::TlsAcceptor;
use crate::utils::network::{join_host_port, resolve};

pub struct PassiveConnection {
    host: String,
    requested_port: u16,
    bound_port: u16,
    tls: bool,
    gate: ReadinessGate<DataStream>,
    accept_task: JoinHandle<()>,
    session_id: String,
    sink: SharedSink,
    closed: bool,
}

impl PassiveConnection {
    /// Binds `host:port` (port 0 lets the OS choose) and starts accepting a
    /// single peer in the background. With `tls` set, the accepted stream
    /// completes a TLS handshake before it reaches the gate.
    ///
    /// The accept and the handshake share one `accept_timeout` deadline.
    ///
    /// # Errors
    ///
    /// * `AddressResolution` - the bind host does not resolve
    /// * `Listen` - the port could not be bound
    pub async fn listen(
        host: &str,
        port: u16,
        session_id: &str,
        sink: SharedSink,
        tls: Option<TlsAcceptor>,
        accept_timeout: Duration,
    ) -> Result<Self> {
        let bind_host = if host.is_empty() { "0.0.0.0" } else { host };
        let endpoint = join_host_port(bind_host, port);

        let addr = resolve(bind_host, port)
            .await
            .inspect_err(|e| sink.record(session_id, &e.to_string()))?;

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            let err = DataConnectionError::listen(&endpoint, e);
            sink.record(session_id, &err.to_string());
            err
        })?;

        let bound_port = listener
            .local_addr()
            .map_err(|e| DataConnectionError::listen(&endpoint, e))?
            .port();

        let is_tls = tls.is_some();
        let (resolver, gate) = gate::channel();
        let accept_task = tokio::spawn(accept_one(
            listener,
            tls,
            accept_timeout,
            resolver,
            bound_port,
            session_id.to_string(),
            sink.clone(),
        ));

        sink.record(
            session_id,
            &format!(
                "Opened passive data connection on {}{}",
                join_host_port(bind_host, bound_port),
                if is_tls { " (TLS)" } else { "" }
            ),
        );

        Ok(Self {
            host: host.to_string(),
            requested_port: port,
            bound_port,
            tls: is_tls,
            gate,
            accept_task,
            session_id: session_id.to_string(),
            sink,
            closed: false,
        })
    }

    pub fn requested_port(&self) -> u16 {
        self.requested_port
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Current gate status; never waits.
    pub fn status(&mut self) -> GateStatus {
        self.gate.try_settle();
        self.gate.status()
    }

    /// Waits for the accept task to finish and returns the stream.
    async fn await_ready(&mut self) -> Result<&mut DataStream> {
        if self.closed {
            return Err(DataConnectionError::Closed);
        }
        self.gate.ready().await
    }

    fn poll_await_ready(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<&mut DataStream>> {
        if self.closed {
            return Poll::Ready(Err(DataConnectionError::Closed.into_io()));
        }
        let outcome = ready!(self.gate.poll_ready(cx));
        Poll::Ready(outcome.map_err(DataConnectionError::into_io))
    }
}

/// Body of the background accept task. Resolves the gate exactly once and
/// drops the listener, so the port stops listening after one attempt.
async fn accept_one(
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    accept_timeout: Duration,
    resolver: GateResolver<DataStream>,
    port: u16,
    session_id: String,
    sink: SharedSink,
) {
    let outcome = match timeout(accept_timeout, accept_stream(&listener, tls.as_ref(), port)).await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(DataConnectionError::AcceptTimeout {
            port,
            timeout: accept_timeout,
        }),
    };
    drop(listener);

    match &outcome {
        Ok(stream) => debug!(
            "[{}] Passive data connection on port {} ready (tls: {})",
            session_id,
            port,
            stream.is_tls()
        ),
        Err(e) => sink.record(&session_id, &e.to_string()),
    }

    if let Err(Ok(_late_stream)) = resolver.resolve(outcome) {
        info!(
            "[{}] Discarding data connection on port {} accepted after close",
            session_id, port
        );
    }
}

async fn accept_stream(
    listener: &TcpListener,
    tls: Option<&TlsAcceptor>,
    port: u16,
) -> Result<DataStream> {
    let (tcp, peer) = listener
        .accept()
        .await
        .map_err(|e| DataConnectionError::accept(port, e))?;
    debug!("Accepted data connection from {} on port {}", peer, port);

    if let Err(e) = tcp.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY on data connection from {}: {}", peer, e);
    }

    match tls {
        Some(acceptor) => {
            let stream = acceptor
                .accept(tcp)
                .await
                .map_err(|e| DataConnectionError::accept(port, e))?;
            Ok(DataStream::Tls(Box::new(stream)))
        }
        None => Ok(DataStream::Plain(tcp)),
    }
}

#[async_trait]
impl DataConnection for PassiveConnection {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.bound_port
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let stream = self.await_ready().await?;
        Ok(stream.read(buf).await?)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let stream = self.await_ready().await?;
        let n = stream.write(buf).await?;
        stream.flush().await?;
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.accept_task.abort();

        // The gate hands over a stream already delivered; one sent later goes
        // back to the accept task and is dropped there.
        let result = match self.gate.close() {
            Some(mut stream) => shutdown_quietly(&mut stream).await,
            None => Ok(()),
        };

        self.sink.record(
            &self.session_id,
            &format!("Closed passive data connection on port {}", self.bound_port),
        );
        result
    }
}

impl Drop for PassiveConnection {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

impl AsyncRead for PassiveConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let stream = ready!(self.get_mut().poll_await_ready(cx))?;
        Pin::new(stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for PassiveConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let stream = ready!(self.get_mut().poll_await_ready(cx))?;
        Pin::new(stream).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let stream = ready!(self.get_mut().poll_await_ready(cx))?;
        Pin::new(stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match this.gate.stream_mut() {
            Some(stream) => Pin::new(stream).poll_shutdown(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}
