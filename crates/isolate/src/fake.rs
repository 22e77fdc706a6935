// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake isolate gateway for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::error::IsolateError;
use crate::gateway::IsolateGateway;
use crate::handle::{Backing, ExitStatus, IsolateHandle, Signal};
use async_trait::async_trait;
use bytes::BytesMut;
use parking_lot::Mutex;
use std::sync::Arc;
use swarm_core::{Frame, FrameCodec, Manifest, Profile, SlaveId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder};

/// Recorded call to `FakeGateway`.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    Spawn { app_name: String },
    Signal { slave: SlaveId, signal: Signal },
    Reap { slave: SlaveId },
}

/// `IsolateGateway` that, instead of exec'ing a real binary, dials the
/// acceptor's listening socket itself and plays a cooperative slave: it
/// completes the handshake, then echoes back a `Chunk` + `Choke` for every
/// `Invoke` it receives.
///
/// Lets engine tests exercise the real acceptor/handshake/frame path without
/// spawning a process.
#[derive(Clone)]
pub struct FakeGateway {
    state: Arc<Mutex<State>>,
}

struct State {
    calls: Vec<GatewayCall>,
    spawn_error: Option<IsolateError>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                spawn_error: None,
            })),
        }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.clone()
    }

    /// Fail the next `spawn` call with `error` instead of dialing.
    pub fn set_spawn_error(&self, error: IsolateError) {
        self.state.lock().spawn_error = Some(error);
    }
}

#[async_trait]
impl IsolateGateway for FakeGateway {
    async fn spawn(
        &self,
        manifest: &Manifest,
        _profile: &Profile,
    ) -> Result<IsolateHandle, IsolateError> {
        {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::Spawn {
                app_name: manifest.app_name.clone(),
            });
            if let Some(error) = state.spawn_error.take() {
                return Err(error);
            }
        }

        let id = SlaveId::generate();
        let stream = UnixStream::connect(&manifest.listen)
            .await
            .map_err(|source| IsolateError::SpawnFailed {
                executable: manifest.listen.display().to_string(),
                source,
            })?;

        let task = tokio::spawn(run_fake_slave(stream, id));
        Ok(IsolateHandle::task(id, task.abort_handle()))
    }

    fn signal(&self, handle: &IsolateHandle, signal: Signal) {
        self.state.lock().calls.push(GatewayCall::Signal {
            slave: handle.id,
            signal,
        });
        if let Backing::Task(abort) = &handle.backing {
            if let Some(abort) = abort.lock().take() {
                abort.abort();
            }
        }
    }

    async fn reap(&self, handle: IsolateHandle) -> ExitStatus {
        self.state.lock().calls.push(GatewayCall::Reap {
            slave: handle.id,
        });
        if let Backing::Task(abort) = &handle.backing {
            if let Some(abort) = abort.lock().take() {
                abort.abort();
            }
        }
        ExitStatus::killed()
    }
}

/// Drives one fake slave connection: handshake, then echo `Invoke` as a
/// single `Chunk` followed by `Choke`, until `Terminate` or disconnect.
async fn run_fake_slave(mut stream: UnixStream, id: SlaveId) {
    let mut codec = FrameCodec::new();
    let mut out = BytesMut::new();
    let mut input = BytesMut::with_capacity(4096);

    if codec
        .encode(Frame::Handshake { slave: id }, &mut out)
        .and_then(|()| codec.encode(Frame::Ready, &mut out))
        .is_err()
    {
        return;
    }
    if stream.write_all(&out).await.is_err() {
        return;
    }
    out.clear();

    loop {
        match stream.read_buf(&mut input).await {
            Ok(0) => return,
            Ok(_) => {}
            Err(_) => return,
        }

        loop {
            match codec.decode(&mut input) {
                Ok(Some(Frame::Invoke { session, event_type })) => {
                    let chunk = Frame::Chunk {
                        session,
                        bytes: event_type.into_bytes(),
                    };
                    if codec
                        .encode(chunk, &mut out)
                        .and_then(|()| codec.encode(Frame::Choke { session }, &mut out))
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(Some(Frame::Terminate)) => return,
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => return,
            }
        }

        if !out.is_empty() && stream.write_all(&out).await.is_err() {
            return;
        }
        out.clear();
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
