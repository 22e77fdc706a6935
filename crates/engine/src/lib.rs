// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! swarm-engine: the scheduler-supervisor for one application.
//!
//! Owns the pending-session queue, the pool of slaves it spawns through an
//! [`swarm_isolate::IsolateGateway`], and the reactor thread that multiplexes
//! every slave connection and dispatches work between them.

mod balancer;
mod conn;
mod control;
mod engine;
mod handshake;
mod pool;
mod queue;
mod reactor;
mod slave;

pub use control::{ControlMsg, EngineHandle, StopMode};
pub use engine::Engine;
pub use slave::{DeadReason, SlaveState};
