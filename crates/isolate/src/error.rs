// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors returned while spawning a slave's isolate.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsolateError {
    #[error("failed to spawn {executable}: {source}")]
    SpawnFailed {
        executable: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
