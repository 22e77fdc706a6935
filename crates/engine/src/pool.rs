// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The set of slaves one engine keeps alive, owned exclusively by the
//! reactor thread.

use crate::slave::{DeadReason, Slave, SlaveState};
use std::collections::HashMap;
use swarm_core::{Frame, PoolSnapshot, SlaveId};

/// Bounded collection of [`Slave`]s for one application.
///
/// Every mutating method takes `&mut self`: unlike [`crate::queue::SessionQueue`],
/// the pool is never shared across threads, so it needs no lock of its own.
pub struct SlavePool {
    limit: usize,
    slaves: HashMap<SlaveId, Slave>,
    dead_since_start: u64,
}

impl SlavePool {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            slaves: HashMap::new(),
            dead_since_start: 0,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }

    /// How many more slaves could be spawned right now, capped by both
    /// `want` and the remaining room under `pool_limit`.
    pub fn room_for(&self, want: usize) -> usize {
        self.limit.saturating_sub(self.slaves.len()).min(want)
    }

    pub fn insert_spawning(&mut self, slave: Slave) {
        self.slaves.insert(slave.id, slave);
    }

    pub fn by_id(&self, id: &SlaveId) -> Option<&Slave> {
        self.slaves.get(id)
    }

    pub fn by_id_mut(&mut self, id: &SlaveId) -> Option<&mut Slave> {
        self.slaves.get_mut(id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slave> {
        self.slaves.values_mut()
    }

    /// Ids of slaves with spare concurrency, in no particular order: the
    /// spec leaves idle-slave selection order unspecified.
    pub fn idle_ids(&self, concurrency: usize) -> Vec<SlaveId> {
        self.slaves
            .values()
            .filter(|slave| slave.has_capacity(concurrency))
            .map(|slave| slave.id)
            .collect()
    }

    /// Send `frame` to `slave`'s outbox without blocking. Returns `false`
    /// if the slave is unknown, unpaired, or its outbox is full.
    pub fn try_dispatch(&self, slave: SlaveId, frame: Frame) -> bool {
        self.slaves
            .get(&slave)
            .and_then(|slave| slave.conn.as_ref())
            .is_some_and(|conn| conn.outbox.try_send(frame).is_ok())
    }

    pub fn mark_handshaking(&mut self, id: SlaveId) -> bool {
        self.set_state(id, SlaveState::Handshaking)
    }

    pub fn mark_active(&mut self, id: SlaveId) -> bool {
        self.set_state(id, SlaveState::Active)
    }

    pub fn mark_draining(&mut self, id: SlaveId) -> bool {
        self.set_state(id, SlaveState::Draining)
    }

    fn set_state(&mut self, id: SlaveId, state: SlaveState) -> bool {
        match self.slaves.get_mut(&id) {
            Some(slave) => {
                slave.state = state;
                true
            }
            None => false,
        }
    }

    /// Remove `id` from the pool, returning it so the caller can reap its
    /// isolate handle and error any sessions still in flight.
    pub fn reap(&mut self, id: SlaveId, _reason: DeadReason) -> Option<Slave> {
        let slave = self.slaves.remove(&id)?;
        self.dead_since_start += 1;
        Some(slave)
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let mut snapshot = PoolSnapshot {
            dead_since_start: self.dead_since_start,
            ..PoolSnapshot::default()
        };
        for slave in self.slaves.values() {
            match slave.state {
                SlaveState::Spawning | SlaveState::Handshaking => snapshot.spawning += 1,
                SlaveState::Active => snapshot.active += 1,
                SlaveState::Draining => snapshot.draining += 1,
            }
        }
        snapshot
    }

    pub fn in_flight_total(&self) -> usize {
        self.slaves.values().map(|slave| slave.in_flight.len()).sum()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
