// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_snapshot_is_all_zero() {
    let snapshot = Snapshot::default();
    assert_eq!(snapshot.queue_depth, 0);
    assert_eq!(snapshot.pool, PoolSnapshot::default());
    assert_eq!(snapshot.sessions, SessionsSnapshot::default());
    assert_eq!(snapshot.uptime_ms, 0);
}

#[test]
fn fields_roundtrip_through_construction() {
    let snapshot = Snapshot {
        queue_depth: 3,
        pool: PoolSnapshot {
            active: 1,
            draining: 0,
            spawning: 1,
            dead_since_start: 2,
        },
        sessions: SessionsSnapshot {
            served: 40,
            pending: 3,
            in_flight: 1,
        },
        uptime_ms: 12_000,
    };

    assert_eq!(snapshot.pool.active, 1);
    assert_eq!(snapshot.sessions.served, 40);
    assert_eq!(snapshot.uptime_ms, 12_000);
}
