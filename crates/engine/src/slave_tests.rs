// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;
use std::time::Duration;
use swarm_core::test_support::RecordingSink;
use swarm_core::{Event, Manifest, Profile};
use swarm_isolate::{FakeGateway, IsolateGateway};
use tempfile::tempdir;
use tokio::net::UnixListener;

/// A `Slave` needs an `IsolateHandle` for a stable id; these tests only
/// exercise state transitions, so a `FakeGateway` dialed against a real
/// (but otherwise unused) listener is the cheapest way to get one.
async fn fake_handle() -> IsolateHandle {
    let dir = tempdir().expect("tempdir");
    let socket = dir.path().join("slave.sock");
    let listener = UnixListener::bind(&socket).expect("bind");
    let gateway = FakeGateway::new();
    let manifest = Manifest::new("app", socket, "unused");
    let (accepted, handle) = tokio::join!(listener.accept(), gateway.spawn(&manifest, &Profile::default()));
    accepted.expect("accept");
    handle.expect("spawn")
}

#[tokio::test]
async fn new_slave_starts_spawning_with_no_in_flight_sessions() {
    let now = Instant::now();
    let slave = Slave::spawning(fake_handle().await, now);
    assert_eq!(slave.state, SlaveState::Spawning);
    assert!(slave.in_flight.is_empty());
    assert!(slave.conn.is_none());
}

#[tokio::test]
async fn active_slave_with_room_has_capacity() {
    let now = Instant::now();
    let mut slave = Slave::spawning(fake_handle().await, now);
    slave.state = SlaveState::Active;
    assert!(slave.has_capacity(1));
    assert!(slave.is_idle());
}

#[tokio::test]
async fn slave_at_concurrency_limit_has_no_capacity() {
    let now = Instant::now();
    let mut slave = Slave::spawning(fake_handle().await, now);
    slave.state = SlaveState::Active;
    slave.in_flight.insert(
        SessionId(1),
        Session::new(SessionId(1), Event::new("render"), Arc::new(RecordingSink::new()), now),
    );
    assert!(!slave.has_capacity(1));
    assert!(!slave.is_idle());
}

#[tokio::test]
async fn note_activity_advances_last_activity() {
    let now = Instant::now();
    let mut slave = Slave::spawning(fake_handle().await, now);
    let later = now + Duration::from_secs(1);
    slave.note_activity(later);
    assert_eq!(slave.last_activity, later);
}
