// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure dispatch logic: matches pending sessions to idle slaves, and
//! decides how many more slaves to request.
//!
//! Deliberately free functions over borrowed state rather than a stateful
//! type — there is nothing for a balancer to own beyond the queue and pool
//! it is handed.

use crate::pool::SlavePool;
use crate::queue::SessionQueue;
use std::time::Instant;
use swarm_core::{Frame, Profile, Session};

/// What one balancing pass decided.
#[derive(Default)]
pub struct BalanceOutcome {
    /// Sessions popped past their deadline while searching for work to
    /// dispatch; the caller errors these on their upstream.
    pub expired: Vec<Session>,
    /// How many additional slaves should be spawned to work through the
    /// sessions still queued.
    pub to_spawn: usize,
}

/// One pass of the balancer: dispatch everything that can be dispatched
/// right now, then report how much more capacity is needed.
///
/// 1. If the queue is empty, nothing to do.
/// 2. For every slave with spare concurrency, pop and dispatch sessions
///    until either the slave is full or the queue yields no ready session.
/// 3. If sessions remain and the pool is under `profile.pool_limit`,
///    report how many more slaves to spawn.
///
/// A session is marked `assigned_slave` in the same step it is hand to
/// [`SlavePool::try_dispatch`]; if the slave's outbox is full the session is
/// restored to the front of the queue via [`SessionQueue::requeue`] — not
/// pushed back through the ordinary urgent-aware `push` — so it keeps its
/// place ahead of sessions enqueued after it, and that slave is skipped.
pub fn balance(queue: &SessionQueue, pool: &mut SlavePool, profile: &Profile, now: Instant) -> BalanceOutcome {
    let mut outcome = BalanceOutcome::default();
    // Deadline pruning happens unconditionally: a session past its deadline
    // must never wait on a slave becoming idle to be noticed.
    outcome.expired.extend(queue.prune_expired(now));

    for slave_id in pool.idle_ids(profile.concurrency) {
        if queue.is_empty() {
            break;
        }
        loop {
            let has_room = pool.by_id(&slave_id).is_some_and(|slave| slave.has_capacity(profile.concurrency));
            if !has_room {
                break;
            }
            let popped = queue.pop_ready(now);
            outcome.expired.extend(popped.expired);
            let Some(mut session) = popped.ready else {
                break;
            };
            let frame = Frame::Invoke {
                session: session.id,
                event_type: session.event.kind().to_string(),
            };
            if pool.try_dispatch(slave_id, frame) {
                session.assigned_slave = Some(slave_id);
                if let Some(slave) = pool.by_id_mut(&slave_id) {
                    slave.in_flight.insert(session.id, session);
                }
            } else {
                queue.requeue(session);
                break;
            }
        }
    }

    let remaining = queue.len();
    if remaining > 0 {
        outcome.to_spawn = pool.room_for(remaining);
    }
    outcome
}

#[cfg(test)]
#[path = "balancer_tests.rs"]
mod tests;
