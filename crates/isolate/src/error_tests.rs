// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn spawn_failed_message_names_the_executable() {
    let err = IsolateError::SpawnFailed {
        executable: "/usr/bin/does-not-exist".into(),
        source: io::Error::other("no such file or directory"),
    };
    assert!(err.to_string().contains("/usr/bin/does-not-exist"));
}
