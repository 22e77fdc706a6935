// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One slave's lifecycle state, as tracked by the reactor thread.

use std::collections::HashMap;
use std::time::Instant;
use swarm_core::{Session, SessionId, SlaveId};
use swarm_isolate::IsolateHandle;
use tokio::sync::mpsc;

/// Why a slave left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadReason {
    /// Never completed a handshake before `heartbeat_timeout` elapsed.
    LaunchFailed,
    /// Handshook but never sent `Ready` in time, or sent a malformed frame.
    HandshakeFailed,
    /// Disconnected, or its write side failed, while holding in-flight sessions.
    Crashed,
    /// Held in-flight sessions but stopped heartbeating.
    Unresponsive,
    /// Drained cleanly: every in-flight session completed before exit.
    Normal,
    /// Ignored `Terminate` past `termination_timeout` and was killed.
    ForceKilled,
}

/// Where a slave sits in its lifecycle.
///
/// `spawning -> handshaking -> active -> draining -> (removed from the pool)`.
/// Death is not a state the slave lingers in: reaping removes it from
/// [`crate::pool::SlavePool`] immediately, recording only the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveState {
    Spawning,
    Handshaking,
    Active,
    Draining,
}

/// A live connection's write half, as seen by the reactor.
///
/// `outbox` is a bounded channel drained by the connection task; a full
/// outbox means the slave is backed up and dispatch should skip it rather
/// than block the reactor loop.
pub struct ConnHandle {
    pub outbox: mpsc::Sender<swarm_core::Frame>,
}

/// One slave in the pool.
pub struct Slave {
    pub id: SlaveId,
    pub state: SlaveState,
    pub spawned_at: Instant,
    pub last_activity: Instant,
    pub in_flight: HashMap<SessionId, Session>,
    pub isolate: IsolateHandle,
    pub conn: Option<ConnHandle>,
}

impl Slave {
    pub fn spawning(isolate: IsolateHandle, now: Instant) -> Self {
        Self {
            id: isolate.id,
            state: SlaveState::Spawning,
            spawned_at: now,
            last_activity: now,
            in_flight: HashMap::new(),
            isolate,
            conn: None,
        }
    }

    pub fn note_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// Whether this slave can accept another session without exceeding
    /// `concurrency`.
    pub fn has_capacity(&self, concurrency: usize) -> bool {
        self.state == SlaveState::Active && self.in_flight.len() < concurrency
    }

    pub fn is_idle(&self) -> bool {
        self.state == SlaveState::Active && self.in_flight.is_empty()
    }
}

#[cfg(test)]
#[path = "slave_tests.rs"]
mod tests;
