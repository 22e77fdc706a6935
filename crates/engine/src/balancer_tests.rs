// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::slave::{ConnHandle, DeadReason, Slave, SlaveState};
use std::sync::Arc;
use std::time::Duration;
use swarm_core::test_support::RecordingSink;
use swarm_core::{Event, Manifest, Policy, Profile, SessionId};
use swarm_isolate::{FakeGateway, IsolateGateway};
use tempfile::tempdir;
use tokio::net::UnixListener;
use tokio::sync::mpsc;

fn session(id: u64, policy: Policy, now: Instant) -> Session {
    Session::new(
        SessionId(id),
        Event::with_policy("render", policy),
        Arc::new(RecordingSink::new()),
        now,
    )
}

async fn active_slave(now: Instant) -> (Slave, mpsc::Receiver<Frame>) {
    let dir = tempdir().expect("tempdir");
    let socket = dir.path().join("slave.sock");
    let listener = UnixListener::bind(&socket).expect("bind");
    let gateway = FakeGateway::new();
    let manifest = Manifest::new("app", socket, "unused");
    let (accepted, handle) = tokio::join!(listener.accept(), gateway.spawn(&manifest, &Profile::default()));
    accepted.expect("accept");
    let mut slave = Slave::spawning(handle.expect("spawn"), now);
    slave.state = SlaveState::Active;
    let (tx, rx) = mpsc::channel(8);
    slave.conn = Some(ConnHandle { outbox: tx });
    (slave, rx)
}

#[tokio::test]
async fn dispatches_a_single_session_to_the_only_idle_slave() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    queue.push(session(1, Policy::default(), now));

    let mut pool = SlavePool::new(1);
    let (slave, mut rx) = active_slave(now).await;
    let slave_id = slave.id;
    pool.insert_spawning(slave);

    let profile = Profile::default();
    let outcome = balance(&queue, &mut pool, &profile, now);

    assert!(outcome.expired.is_empty());
    assert_eq!(outcome.to_spawn, 0);
    assert!(queue.is_empty());
    assert!(pool.by_id(&slave_id).expect("slave").in_flight.contains_key(&SessionId(1)));
    let frame = rx.try_recv().expect("invoke frame");
    assert!(matches!(frame, Frame::Invoke { session, .. } if session == SessionId(1)));
}

#[tokio::test]
async fn urgent_sessions_dispatch_before_older_non_urgent_ones() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    queue.push(session(1, Policy::default(), now));
    queue.push(session(2, Policy::urgent(), now));

    let mut pool = SlavePool::new(1);
    let (slave, mut rx) = active_slave(now).await;
    pool.insert_spawning(slave);

    let profile = Profile {
        concurrency: 2,
        ..Profile::default()
    };
    balance(&queue, &mut pool, &profile, now);

    let first = rx.try_recv().expect("first frame");
    let second = rx.try_recv().expect("second frame");
    assert!(matches!(first, Frame::Invoke { session, .. } if session == SessionId(2)));
    assert!(matches!(second, Frame::Invoke { session, .. } if session == SessionId(1)));
}

#[tokio::test]
async fn requests_more_slaves_when_sessions_remain_under_the_pool_limit() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    queue.push(session(1, Policy::default(), now));
    queue.push(session(2, Policy::default(), now));

    let mut pool = SlavePool::new(2);
    let profile = Profile::default();
    let outcome = balance(&queue, &mut pool, &profile, now);

    assert_eq!(outcome.to_spawn, 2);
    assert_eq!(queue.len(), 2);
}

#[tokio::test]
async fn expired_sessions_encountered_while_dispatching_are_reported_and_skipped() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    let expired = Policy::with_deadline(now - Duration::from_millis(1));
    queue.push(session(1, expired, now));
    queue.push(session(2, Policy::default(), now));

    let mut pool = SlavePool::new(1);
    let (slave, mut rx) = active_slave(now).await;
    pool.insert_spawning(slave);

    let outcome = balance(&queue, &mut pool, &Profile::default(), now);
    assert_eq!(outcome.expired.len(), 1);
    assert_eq!(outcome.expired[0].id, SessionId(1));
    let frame = rx.try_recv().expect("invoke frame");
    assert!(matches!(frame, Frame::Invoke { session, .. } if session == SessionId(2)));
}

#[tokio::test]
async fn a_full_outbox_requeues_the_session_instead_of_dropping_it() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    queue.push(session(1, Policy::default(), now));

    let mut pool = SlavePool::new(1);
    let (slave, rx) = active_slave(now).await;
    // Drop the receiver so `try_send` fails immediately, like a full outbox.
    drop(rx);
    let slave_id = slave.id;
    pool.insert_spawning(slave);

    balance(&queue, &mut pool, &Profile::default(), now);
    assert_eq!(queue.len(), 1);
    assert!(pool.by_id(&slave_id).expect("slave").in_flight.is_empty());
}

#[tokio::test]
async fn a_failed_dispatch_keeps_its_place_ahead_of_later_sessions() {
    let now = Instant::now();
    let queue = SessionQueue::new();
    queue.push(session(1, Policy::default(), now));
    queue.push(session(2, Policy::default(), now));

    // Only one idle slave this pass, and its outbox is full: session 1 fails
    // dispatch and must be restored to the front, ahead of session 2, which
    // was never even attempted.
    let mut pool = SlavePool::new(2);
    let (full_slave, rx_full) = active_slave(now).await;
    drop(rx_full);
    let full_id = full_slave.id;
    pool.insert_spawning(full_slave);

    balance(&queue, &mut pool, &Profile::default(), now);
    assert_eq!(queue.len(), 2);

    // A working slave takes over in the next pass. Session 1 must dispatch
    // before session 2, even though session 2 sat untouched in the queue.
    pool.reap(full_id, DeadReason::Normal);
    let (working_slave, mut rx) = active_slave(now).await;
    pool.insert_spawning(working_slave);

    balance(&queue, &mut pool, &Profile::default(), now);
    let frame = rx.try_recv().expect("invoke frame");
    assert!(matches!(frame, Frame::Invoke { session, .. } if session == SessionId(1)));
}
