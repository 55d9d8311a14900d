//! Module `gate`
//!
//! One-shot readiness gate between a background accept task and the
//! foreground reads and writes of a passive data connection.
//!
//! The accept task owns the [`GateResolver`] and sends exactly one outcome.
//! The connection owns the [`ReadinessGate`], which caches that outcome the
//! first time it is observed. Delivery goes through a `tokio::sync::oneshot`
//! channel, so a stream or error seen by a reader is always fully written by
//! the task before the send.

use std::future::{Future, poll_fn};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::{DataConnectionError, Result};

/// Observable lifecycle of a gate, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Pending,
    Ready,
    Failed,
}

enum GateState<S> {
    Pending(oneshot::Receiver<Result<S>>),
    Ready(S),
    Failed(DataConnectionError),
}

impl<S> GateState<S> {
    fn settle(outcome: std::result::Result<Result<S>, oneshot::error::RecvError>) -> Self {
        match outcome {
            Ok(Ok(stream)) => GateState::Ready(stream),
            Ok(Err(err)) => GateState::Failed(err),
            // Resolver dropped without an outcome: the accept task was aborted.
            Err(_) => GateState::Failed(DataConnectionError::Closed),
        }
    }
}

/// Reader side of the gate.
pub struct ReadinessGate<S> {
    state: GateState<S>,
}

/// Writer side of the gate. Consumed by [`GateResolver::resolve`], so the
/// gate can transition at most once.
pub struct GateResolver<S> {
    sender: oneshot::Sender<Result<S>>,
}

/// Creates a connected resolver/gate pair in the pending state.
pub fn channel<S>() -> (GateResolver<S>, ReadinessGate<S>) {
    let (sender, receiver) = oneshot::channel();
    (
        GateResolver { sender },
        ReadinessGate {
            state: GateState::Pending(receiver),
        },
    )
}

impl<S> GateResolver<S> {
    /// Publishes the outcome. If the gate is already gone the outcome is
    /// handed back so the caller can dispose of it.
    pub fn resolve(self, outcome: Result<S>) -> std::result::Result<(), Result<S>> {
        self.sender.send(outcome)
    }
}

impl<S> ReadinessGate<S> {
    pub fn status(&self) -> GateStatus {
        match self.state {
            GateState::Pending(_) => GateStatus::Pending,
            GateState::Ready(_) => GateStatus::Ready,
            GateState::Failed(_) => GateStatus::Failed,
        }
    }

    /// Picks up an outcome that has already been sent, without waiting.
    /// Returns true once the gate is resolved.
    pub fn try_settle(&mut self) -> bool {
        if let GateState::Pending(receiver) = &mut self.state {
            self.state = match receiver.try_recv() {
                Ok(outcome) => GateState::settle(Ok(outcome)),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Closed) => GateState::Failed(DataConnectionError::Closed),
            };
        }
        true
    }

    /// Waits for the outcome to arrive.
    pub fn poll_settled(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        if let GateState::Pending(receiver) = &mut self.state {
            let outcome = ready!(Pin::new(receiver).poll(cx));
            self.state = GateState::settle(outcome);
        }
        Poll::Ready(())
    }

    /// Poll-based form of [`ReadinessGate::ready`] for `AsyncRead`/`AsyncWrite`.
    pub fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<&mut S>> {
        ready!(self.poll_settled(cx));
        Poll::Ready(self.settled())
    }

    /// Waits for the gate to resolve, then returns the stream or a clone of
    /// the cached error. Every call after resolution returns immediately with
    /// the same outcome.
    pub async fn ready(&mut self) -> Result<&mut S> {
        poll_fn(|cx| self.poll_settled(cx)).await;
        self.settled()
    }

    /// The stream, if the gate resolved to one. Never waits.
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        match &mut self.state {
            GateState::Ready(stream) => Some(stream),
            _ => None,
        }
    }

    /// Shuts the gate for good and hands back the stream, if one was
    /// delivered. A resolver that sends afterwards gets its outcome back and
    /// disposes of it. Every later call fails with `Closed`.
    pub fn close(&mut self) -> Option<S> {
        let previous = std::mem::replace(
            &mut self.state,
            GateState::Failed(DataConnectionError::Closed),
        );
        match previous {
            GateState::Ready(stream) => Some(stream),
            GateState::Failed(_) => None,
            GateState::Pending(mut receiver) => {
                receiver.close();
                match receiver.try_recv() {
                    Ok(Ok(stream)) => Some(stream),
                    _ => None,
                }
            }
        }
    }

    fn settled(&mut self) -> Result<&mut S> {
        match &mut self.state {
            GateState::Ready(stream) => Ok(stream),
            GateState::Failed(err) => Err(err.clone()),
            GateState::Pending(_) => Err(DataConnectionError::Closed),
        }
    }
}
