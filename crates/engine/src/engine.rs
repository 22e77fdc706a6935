// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public facade: construct an engine, start its reactor, get back a
//! cross-thread handle.

use crate::control::EngineHandle;
use crate::reactor::ReactorLoop;
use std::sync::Arc;
use swarm_core::session_id::SessionIdGen;
use swarm_core::{Clock, EngineError, Manifest, Profile, SystemClock};
use swarm_isolate::IsolateGateway;
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Notify};

/// One application's engine: an acceptor bound at construction time, plus
/// everything needed to run its reactor once [`Engine::start`] is called.
pub struct Engine<C: Clock = SystemClock> {
    manifest: Manifest,
    profile: Profile,
    isolate: Arc<dyn IsolateGateway>,
    clock: C,
    acceptor: UnixListener,
}

impl Engine<SystemClock> {
    /// Bind `manifest.listen` and prepare an engine with the system clock.
    ///
    /// Binding is the one part of construction fatal enough to abort
    /// outright — every other failure mode in this crate is session-scoped.
    pub fn new(manifest: Manifest, profile: Profile, isolate: Arc<dyn IsolateGateway>) -> Result<Self, EngineError> {
        Self::with_clock(manifest, profile, isolate, SystemClock)
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(manifest: Manifest, profile: Profile, isolate: Arc<dyn IsolateGateway>, clock: C) -> Result<Self, EngineError> {
        let _ = std::fs::remove_file(&manifest.listen);
        let acceptor = UnixListener::bind(&manifest.listen).map_err(EngineError::BindFailed)?;
        Ok(Self {
            manifest,
            profile,
            isolate,
            clock,
            acceptor,
        })
    }

    /// Launch the reactor on a dedicated OS thread and return a handle to it.
    ///
    /// The reactor runs on a single-threaded Tokio runtime bound to that
    /// thread: the entire pool/queue/handshake state this engine owns lives
    /// on one stack, never shared across an OS thread boundary except
    /// through the queue's own lock and the channels the handle holds.
    // Thread/runtime creation failure here means the host is out of OS
    // resources; there is no session-scoped fallback to return instead.
    #[allow(clippy::expect_used)]
    pub fn start(self) -> EngineHandle
    where
        C: Send + 'static,
    {
        let queue = Arc::new(crate::queue::SessionQueue::new());
        let notify = Arc::new(Notify::new());
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let session_ids = Arc::new(SessionIdGen::new());
        let handle = EngineHandle::new(
            Arc::clone(&queue),
            Arc::clone(&notify),
            control_tx,
            Arc::clone(&session_ids),
            self.profile.queue_limit,
        );

        let manifest = self.manifest;
        let profile = self.profile;
        let isolate = self.isolate;
        let clock = self.clock;
        let acceptor = self.acceptor;

        std::thread::Builder::new()
            .name(format!("swarm-engine:{}", manifest.app_name))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("building the reactor's single-threaded runtime");
                let reactor = ReactorLoop::new(manifest, profile, isolate, clock, acceptor, queue, notify, control_rx);
                runtime.block_on(reactor.run());
            })
            .expect("spawning the reactor thread");

        handle
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
