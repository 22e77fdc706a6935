// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_event_has_default_policy() {
    let event = Event::new("render");
    assert_eq!(event.kind(), "render");
    assert_eq!(event.policy(), Policy::default());
}

#[test]
fn with_policy_carries_it_through() {
    let policy = Policy::urgent();
    let event = Event::with_policy("render", policy);
    assert!(event.policy().urgent);
}
