// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::policy::Policy;
use crate::test_support::RecordingSink;
use std::time::Duration;

#[test]
fn with_tag_sets_the_routing_hint() {
    let session = Session::new(
        SessionId(1),
        Event::new("render"),
        Arc::new(RecordingSink::new()),
        Instant::now(),
    )
    .with_tag("pinned-worker");

    assert_eq!(session.tag.as_deref(), Some("pinned-worker"));
}

#[test]
fn new_session_has_no_assigned_slave() {
    let session = Session::new(
        SessionId(1),
        Event::new("render"),
        Arc::new(RecordingSink::new()),
        Instant::now(),
    );
    assert!(session.assigned_slave.is_none());
}

#[test]
fn is_expired_reflects_the_event_policy() {
    let now = Instant::now();
    let event = Event::with_policy("render", Policy::with_deadline(now + Duration::from_millis(10)));
    let session = Session::new(SessionId(1), event, Arc::new(RecordingSink::new()), now);

    assert!(!session.is_expired(now));
    assert!(session.is_expired(now + Duration::from_millis(10)));
}

#[test]
fn is_expired_honors_a_timeout_relative_to_enqueue_time() {
    let enqueued_at = Instant::now();
    let event = Event::with_policy("render", Policy::with_timeout(Duration::from_millis(10)));
    let session = Session::new(SessionId(1), event, Arc::new(RecordingSink::new()), enqueued_at);

    assert!(!session.is_expired(enqueued_at + Duration::from_millis(5)));
    assert!(session.is_expired(enqueued_at + Duration::from_millis(10)));
}
