// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pending-session queue: the only structure written from outside the
//! reactor thread, guarded by a single lock.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Instant;
use swarm_core::Session;

/// Result of [`SessionQueue::pop_ready`]: the next dispatchable session, if
/// any, plus every expired session skipped past to find it.
#[derive(Default)]
pub struct PopOutcome {
    pub ready: Option<Session>,
    pub expired: Vec<Session>,
}

/// FIFO of sessions waiting for a slave, with an urgent prefix.
///
/// `push` and `len` are called from `enqueue` on any caller's thread;
/// `pop_ready` and `drain` are called only from the reactor thread. The
/// lock is held only for pointer manipulation, never across an `.await`.
#[derive(Default)]
pub struct SessionQueue {
    inner: Mutex<VecDeque<Session>>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `session`. Urgent sessions are inserted after the last urgent
    /// session already queued, ahead of every non-urgent one; non-urgent
    /// sessions go to the back.
    pub fn push(&self, session: Session) {
        let mut guard = self.inner.lock();
        if session.event.policy().urgent {
            let split = guard
                .iter()
                .take_while(|queued| queued.event.policy().urgent)
                .count();
            guard.insert(split, session);
        } else {
            guard.push_back(session);
        }
    }

    /// Restore a session to the very front of the queue, ahead of any
    /// urgent prefix. Used when a session was already popped for dispatch
    /// but the chosen slave's outbox turned out to be full, so it must not
    /// lose its place to sessions enqueued after it.
    pub fn requeue(&self, session: Session) {
        self.inner.lock().push_front(session);
    }

    /// Pop the first session whose deadline has not passed, dropping any
    /// expired sessions found ahead of it. Returns both so the caller can
    /// error the expired ones on their upstream outside the lock.
    pub fn pop_ready(&self, now: Instant) -> PopOutcome {
        let mut guard = self.inner.lock();
        let mut expired = Vec::new();
        loop {
            match guard.front() {
                None => return PopOutcome { ready: None, expired },
                Some(front) if front.is_expired(now) => {
                    if let Some(session) = guard.pop_front() {
                        expired.push(session);
                    }
                }
                Some(_) => {
                    let ready = guard.pop_front();
                    return PopOutcome { ready, expired };
                }
            }
        }
    }

    /// Remove every expired session at the front of the queue, regardless
    /// of whether anything is available to dispatch to. Without this, a
    /// session past its deadline would sit forever if no slave ever became
    /// idle to trigger [`Self::pop_ready`].
    pub fn prune_expired(&self, now: Instant) -> Vec<Session> {
        let mut guard = self.inner.lock();
        let mut expired = Vec::new();
        while matches!(guard.front(), Some(front) if front.is_expired(now)) {
            if let Some(session) = guard.pop_front() {
                expired.push(session);
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every pending session, for shutdown.
    pub fn drain(&self) -> Vec<Session> {
        self.inner.lock().drain(..).collect()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
