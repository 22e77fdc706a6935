// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tuning knobs for one engine: pool sizing, queueing, and timeouts.

use std::time::Duration;

/// Engine behavior parameters, separate from [`crate::manifest::Manifest`] so
/// the same application binary can run under different profiles (e.g. a
/// cautious production profile and a permissive local one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Maximum number of slave processes the engine keeps alive at once.
    pub pool_limit: usize,
    /// Maximum number of sessions dispatched to one slave concurrently.
    pub concurrency: usize,
    /// Maximum number of sessions held in the pending queue before `enqueue`
    /// starts rejecting with `queue_full`.
    pub queue_limit: usize,
    /// How long an idle slave (no assigned sessions) is kept before it is culled.
    pub idle_timeout: Duration,
    /// How long a slave may go without a heartbeat before it is declared unresponsive.
    pub heartbeat_timeout: Duration,
    /// How long a freshly spawned slave has to send its handshake and `Ready`.
    pub startup_timeout: Duration,
    /// How long a slave has to exit after `Terminate` before it is force-killed.
    pub termination_timeout: Duration,
    /// Maximum number of frames the reactor drains from one slave per wakeup.
    pub io_bulk_size: usize,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            pool_limit: 1,
            concurrency: 1,
            queue_limit: 100,
            idle_timeout: Duration::from_secs(60),
            heartbeat_timeout: Duration::from_secs(30),
            startup_timeout: Duration::from_secs(10),
            termination_timeout: Duration::from_secs(5),
            io_bulk_size: 100,
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
