// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the engine and however a slave process actually runs.

use crate::error::IsolateError;
use crate::handle::{ExitStatus, IsolateHandle, Signal};
use async_trait::async_trait;
use swarm_core::{Manifest, Profile};

/// Resolves one application's manifest into a running slave isolate.
///
/// `Engine::new` is handed an already-resolved `Arc<dyn IsolateGateway>`;
/// looking one up by category (the source's `repository_t`) is a caller-side
/// concern this trait has no opinion on.
#[async_trait]
pub trait IsolateGateway: Send + Sync {
    /// Start a new slave for `manifest`, under `profile`'s timeouts.
    async fn spawn(
        &self,
        manifest: &Manifest,
        profile: &Profile,
    ) -> Result<IsolateHandle, IsolateError>;

    /// Deliver an out-of-band signal to an already-spawned isolate.
    fn signal(&self, handle: &IsolateHandle, signal: Signal);

    /// Wait for the isolate to exit, consuming the handle.
    async fn reap(&self, handle: IsolateHandle) -> ExitStatus;
}
