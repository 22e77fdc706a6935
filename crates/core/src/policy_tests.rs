// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_means_no_timeout_no_deadline_not_urgent() {
    let policy = Policy::default();
    assert!(!policy.urgent);
    assert!(policy.timeout.is_none());
    assert!(policy.deadline.is_none());
}

#[test]
fn urgent_constructor_sets_only_urgent() {
    let policy = Policy::urgent();
    assert!(policy.urgent);
    assert!(policy.timeout.is_none());
}

#[test]
fn no_deadline_never_expires() {
    let now = Instant::now();
    let policy = Policy::default();
    assert!(!policy.is_expired(now, now));
}

#[test]
fn expires_once_now_reaches_deadline() {
    let now = Instant::now();
    let policy = Policy::with_deadline(now + Duration::from_millis(10));
    assert!(!policy.is_expired(now, now));
    assert!(policy.is_expired(now, now + Duration::from_millis(10)));
    assert!(policy.is_expired(now, now + Duration::from_millis(20)));
}

#[test]
fn expires_once_timeout_elapses_since_enqueue() {
    let enqueued_at = Instant::now();
    let policy = Policy::with_timeout(Duration::from_millis(10));
    assert!(!policy.is_expired(enqueued_at, enqueued_at));
    assert!(!policy.is_expired(enqueued_at, enqueued_at + Duration::from_millis(9)));
    assert!(policy.is_expired(enqueued_at, enqueued_at + Duration::from_millis(10)));
    assert!(policy.is_expired(enqueued_at, enqueued_at + Duration::from_millis(20)));
}

#[test]
fn timeout_is_relative_to_enqueued_at_not_to_policy_creation() {
    let enqueued_at = Instant::now() + Duration::from_millis(100);
    let policy = Policy::with_timeout(Duration::from_millis(10));
    assert!(!policy.is_expired(enqueued_at, enqueued_at + Duration::from_millis(5)));
    assert!(policy.is_expired(enqueued_at, enqueued_at + Duration::from_millis(15)));
}
