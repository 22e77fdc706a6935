// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A session: one in-flight invocation of an [`Event`](crate::event::Event).

use crate::event::Event;
use crate::session_id::SessionId;
use crate::slave_id::SlaveId;
use crate::upstream::UpstreamSink;
use std::sync::Arc;
use std::time::Instant;

/// One request moving through the engine, from `enqueue` to upstream completion.
///
/// A `Session` is created once, at enqueue time, and then handed between the
/// queue and whichever slave ends up running it — it never needs to be
/// shared across threads behind a lock, since ownership moves with it.
pub struct Session {
    pub id: SessionId,
    pub event: Event,
    pub upstream: Arc<dyn UpstreamSink>,
    /// Clock reading at enqueue time; used to evaluate `event.policy().deadline`.
    pub enqueued_at: Instant,
    /// Optional routing hint, carried through from the `enqueue` call that
    /// named a specific destination (e.g. a resumed or pinned invocation).
    pub tag: Option<String>,
    /// Slave currently running this session, once dispatched.
    pub assigned_slave: Option<SlaveId>,
}

impl Session {
    pub fn new(
        id: SessionId,
        event: Event,
        upstream: Arc<dyn UpstreamSink>,
        enqueued_at: Instant,
    ) -> Self {
        Self {
            id,
            event,
            upstream,
            enqueued_at,
            tag: None,
            assigned_slave: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether this session's deadline or timeout, if any, has passed as of `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.event.policy().is_expired(self.enqueued_at, now)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
