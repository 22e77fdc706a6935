// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::conn::ConnId;
use std::time::Duration;

#[test]
fn insert_and_remove_round_trip() {
    let mut table = HandshakeTable::new();
    let conn = ConnId::next();
    table.insert(conn, Instant::now());
    assert!(table.contains(&conn));
    assert_eq!(table.len(), 1);
    assert!(table.remove(&conn));
    assert!(!table.contains(&conn));
}

#[test]
fn expired_reports_only_connections_older_than_max_age() {
    let mut table = HandshakeTable::new();
    let now = Instant::now();
    let old_conn = ConnId::next();
    let fresh_conn = ConnId::next();
    table.insert(old_conn, now);
    table.insert(fresh_conn, now + Duration::from_secs(9));

    let later = now + Duration::from_secs(10);
    let expired = table.expired(later, Duration::from_secs(10));
    assert_eq!(expired, vec![old_conn]);
}

#[test]
fn remove_of_unknown_conn_is_a_no_op() {
    let mut table = HandshakeTable::new();
    assert!(!table.remove(&ConnId::next()));
}
