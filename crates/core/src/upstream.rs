// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client-facing sink for a session's response payload.

use crate::error::ErrorKind;
use async_trait::async_trait;

/// A bidirectional sink the engine drives as a slave's reply frames arrive.
///
/// Exactly one of `close` or `error` is called for a given session, and
/// never more than once (invariant: "upstream completion" in the spec).
/// Implementations must be safe for concurrent `write`/`error`/`close` —
/// the engine does not serialize calls against an upstream itself, trusting
/// the provider's contract.
#[async_trait]
pub trait UpstreamSink: Send + Sync {
    /// Deliver one chunk of response payload, in enqueue order.
    async fn write(&self, chunk: Vec<u8>);

    /// Terminate the session with a typed failure.
    async fn error(&self, kind: ErrorKind, message: String);

    /// Terminate the session successfully.
    async fn close(&self);
}

#[cfg(test)]
#[path = "upstream_tests.rs"]
mod tests;
