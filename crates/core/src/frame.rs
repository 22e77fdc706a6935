// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slave wire envelope. Message semantics only — exact binary framing
//! is delegated to [`crate::codec::FrameCodec`].

use crate::session_id::SessionId;
use crate::slave_id::SlaveId;
use serde::{Deserialize, Serialize};

/// Frames exchanged between the engine and one slave over its duplex channel.
///
/// The engine sends `Invoke`/`Chunk`/`Choke`/`Terminate`; the slave sends
/// `Handshake`/`Ready`/`Heartbeat`/`Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    /// First frame on a freshly accepted connection, binding it to a pool entry.
    Handshake { slave: SlaveId },
    /// Sent once the slave has finished initializing and can accept work.
    Ready,
    /// Liveness ping; updates the slave's `last_activity`.
    Heartbeat,
    /// Engine → slave: begin executing `event_type` for `session`.
    Invoke { session: SessionId, event_type: String },
    /// One chunk of payload, flowing in either direction.
    Chunk { session: SessionId, bytes: Vec<u8> },
    /// Slave → engine: the invocation failed.
    Error {
        session: SessionId,
        code: String,
        message: String,
    },
    /// Engine → slave: close out `session` (the spec's "close").
    Choke { session: SessionId },
    /// Engine → slave: shut down.
    Terminate,
}

impl Frame {
    /// The session this frame concerns, if any (handshake/heartbeat/terminate
    /// are slave- or connection-scoped, not session-scoped).
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Frame::Invoke { session, .. }
            | Frame::Chunk { session, .. }
            | Frame::Error { session, .. }
            | Frame::Choke { session } => Some(*session),
            Frame::Handshake { .. } | Frame::Ready | Frame::Heartbeat | Frame::Terminate => None,
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
