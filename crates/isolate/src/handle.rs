// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A handle to one spawned slave's isolate, opaque outside this crate.

use parking_lot::Mutex;
use swarm_core::SlaveId;
use tokio::process::Child;
use tokio::task::AbortHandle;

/// Out-of-band signal delivered to a slave's isolate, outside the wire protocol.
///
/// This is the engine's last resort after a graceful `Frame::Terminate`
/// goes unanswered past `termination_timeout` — not the normal shutdown path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Best-effort graceful stop.
    Terminate,
    /// Unconditional, immediate stop.
    Kill,
}

/// How a slave's isolate ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn killed() -> Self {
        Self {
            success: false,
            code: None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

pub(crate) enum Backing {
    Process(Mutex<Child>),
    Task(Mutex<Option<AbortHandle>>),
}

/// Handle returned by `IsolateGateway::spawn`, consumed by `reap` and
/// referenced by `signal`. Constructible only from within this crate —
/// callers treat it as opaque.
pub struct IsolateHandle {
    pub id: SlaveId,
    pub(crate) backing: Backing,
}

impl IsolateHandle {
    pub(crate) fn process(id: SlaveId, child: Child) -> Self {
        Self {
            id,
            backing: Backing::Process(Mutex::new(child)),
        }
    }

    pub(crate) fn task(id: SlaveId, abort: AbortHandle) -> Self {
        Self {
            id,
            backing: Backing::Task(Mutex::new(Some(abort))),
        }
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
