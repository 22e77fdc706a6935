// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy: session-scoped failures surfaced on an upstream, and the
//! small set of conditions fatal enough to abort engine construction.

use std::fmt;
use std::io;
use thiserror::Error;

/// Session-scoped failure kinds, delivered via `UpstreamSink::error`.
///
/// Never retried by the engine itself — retrying would risk duplicate side
/// effects, so the client decides whether to re-enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `enqueue` when the queue was already at `profile.queue_limit`.
    QueueFull,
    /// Session reached its deadline before or during dispatch.
    DeadlineExceeded,
    /// Slave held the session but went silent past `heartbeat_timeout`.
    WorkerUnresponsive,
    /// Slave exited non-zero or disconnected mid-session.
    WorkerCrashed,
    /// Engine stopped while the session was pending or in flight.
    EngineShutdown,
    /// Slave replied with an `Error` frame.
    InvocationFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::QueueFull => "queue_full",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::WorkerUnresponsive => "worker_unresponsive",
            Self::WorkerCrashed => "worker_crashed",
            Self::EngineShutdown => "engine_shutdown",
            Self::InvocationFailed => "invocation_failed",
        };
        write!(f, "{}", label)
    }
}

/// Fatal-to-construction errors — never session-scoped.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unable to bind listening endpoint: {0}")]
    BindFailed(#[source] io::Error),

    #[error("isolate factory is not available")]
    IsolateUnavailable,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
