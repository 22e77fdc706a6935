// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default `IsolateGateway`: one OS process per slave.

use crate::error::IsolateError;
use crate::gateway::IsolateGateway;
use crate::handle::{Backing, ExitStatus, IsolateHandle, Signal};
use async_trait::async_trait;
use swarm_core::{Manifest, Profile, SlaveId};
use tokio::process::Command;

/// Environment variable carrying the acceptor's listening socket path,
/// injected into every spawned slave.
pub const SLAVE_ENDPOINT_VAR: &str = "SWARM_SLAVE_ENDPOINT";

/// Spawns `manifest.executable` as a child process via `tokio::process::Command`.
#[derive(Debug, Default)]
pub struct SubprocessGateway;

impl SubprocessGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IsolateGateway for SubprocessGateway {
    async fn spawn(
        &self,
        manifest: &Manifest,
        _profile: &Profile,
    ) -> Result<IsolateHandle, IsolateError> {
        let id = SlaveId::generate();
        let span = tracing::info_span!("spawn_slave", slave = %id, app = %manifest.app_name);
        let _guard = span.enter();

        let mut cmd = Command::new(&manifest.executable);
        cmd.args(&manifest.args);
        cmd.envs(manifest.env.iter().cloned());
        cmd.env(SLAVE_ENDPOINT_VAR, &manifest.listen);
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| IsolateError::SpawnFailed {
            executable: manifest.executable.display().to_string(),
            source,
        })?;

        tracing::debug!(slave = %id, pid = child.id(), "slave process spawned");
        Ok(IsolateHandle::process(id, child))
    }

    fn signal(&self, handle: &IsolateHandle, signal: Signal) {
        let Backing::Process(child) = &handle.backing else {
            return;
        };
        // tokio's portable `Child` API only exposes a hard kill; `Terminate`
        // is accepted for symmetry with the trait but resolves the same way.
        let _ = signal;
        if let Err(err) = child.lock().start_kill() {
            tracing::warn!(slave = %handle.id, %err, "failed to signal slave");
        }
    }

    async fn reap(&self, handle: IsolateHandle) -> ExitStatus {
        let IsolateHandle { id, backing } = handle;
        match backing {
            Backing::Process(mutex) => {
                let mut child = mutex.into_inner();
                match child.wait().await {
                    Ok(status) => status.into(),
                    Err(err) => {
                        tracing::warn!(slave = %id, %err, "failed to reap slave");
                        ExitStatus::killed()
                    }
                }
            }
            Backing::Task(mutex) => {
                if let Some(abort) = mutex.into_inner() {
                    abort.abort();
                }
                ExitStatus::killed()
            }
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
