// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling policy attached to every event.

use std::time::{Duration, Instant};

/// Governs how a session is scheduled once enqueued.
///
/// `Default` gives "no timeout, no deadline, not urgent" — the same meaning
/// the source expresses with zero-valued floats, carried here as `None`
/// rather than a magic sentinel. `deadline` is an absolute point on the
/// engine's own monotonic clock (typically `clock.now() + Duration`),
/// rather than a wall-clock timestamp, so it composes with `Clock` for
/// deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    /// Bypasses FIFO ordering, occupying a prefix of the queue.
    pub urgent: bool,
    /// Max wall-clock time a session may wait in the queue before being
    /// dropped with `deadline_exceeded`. Distinct from `deadline`: a
    /// relative bound set at enqueue time.
    pub timeout: Option<Duration>,
    /// Absolute expiry. A session whose deadline has passed is never
    /// assigned to a slave.
    pub deadline: Option<Instant>,
}

impl Policy {
    pub fn urgent() -> Self {
        Self {
            urgent: true,
            ..Self::default()
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// True if `now` is at or past this policy's deadline, or if `timeout`
    /// has elapsed since `enqueued_at`.
    pub fn is_expired(&self, enqueued_at: Instant, now: Instant) -> bool {
        if matches!(self.deadline, Some(deadline) if now >= deadline) {
            return true;
        }
        matches!(self.timeout, Some(timeout) if now.saturating_duration_since(enqueued_at) >= timeout)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
