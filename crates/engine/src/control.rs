// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cross-thread control plane: a handle callers use to enqueue work,
//! query state, and stop an engine whose reactor runs on its own thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use swarm_core::{Event, ErrorKind, Session, SessionId, Snapshot, UpstreamSink};
use tokio::sync::{mpsc, oneshot};

use crate::queue::SessionQueue;

/// How `stop()` should behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Let in-flight sessions finish, then drain and kill slaves.
    Graceful,
    /// Terminate every slave immediately, erroring in-flight sessions.
    Immediate,
}

/// A message posted to the reactor thread from [`EngineHandle`].
pub enum ControlMsg {
    Info(oneshot::Sender<Snapshot>),
    Stop(StopMode, oneshot::Sender<()>),
}

/// Cross-thread, `Clone`-able handle to a running engine.
///
/// `enqueue` writes directly to the shared [`SessionQueue`] and wakes the
/// reactor; `info`/`stop` go through the control channel so their handling
/// happens on the reactor thread, which is the only place pool state lives.
#[derive(Clone)]
pub struct EngineHandle {
    queue: Arc<SessionQueue>,
    notify: Arc<tokio::sync::Notify>,
    control: mpsc::UnboundedSender<ControlMsg>,
    session_ids: Arc<swarm_core::session_id::SessionIdGen>,
    queue_limit: usize,
    stopped: Arc<AtomicBool>,
}

impl EngineHandle {
    pub(crate) fn new(
        queue: Arc<SessionQueue>,
        notify: Arc<tokio::sync::Notify>,
        control: mpsc::UnboundedSender<ControlMsg>,
        session_ids: Arc<swarm_core::session_id::SessionIdGen>,
        queue_limit: usize,
    ) -> Self {
        Self {
            queue,
            notify,
            control,
            session_ids,
            queue_limit,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enqueue `event`, delivering its response through `upstream`.
    ///
    /// Rejects with `queue_full` rather than blocking when the queue is
    /// already at `profile.queue_limit`; the caller decides whether to
    /// retry.
    pub async fn enqueue(&self, event: Event, upstream: Arc<dyn UpstreamSink>) -> Result<SessionId, ErrorKind> {
        self.enqueue_tagged(event, upstream, None).await
    }

    /// Like [`Self::enqueue`], but pins the session to a routing tag.
    pub async fn enqueue_tagged(
        &self,
        event: Event,
        upstream: Arc<dyn UpstreamSink>,
        tag: Option<String>,
    ) -> Result<SessionId, ErrorKind> {
        if self.queue.len() >= self.queue_limit {
            upstream.error(ErrorKind::QueueFull, "queue is at capacity".into()).await;
            return Err(ErrorKind::QueueFull);
        }

        let id = self.session_ids.next();
        let mut session = Session::new(id, event, upstream, std::time::Instant::now());
        if let Some(tag) = tag {
            session = session.with_tag(tag);
        }
        self.queue.push(session);
        self.notify.notify_one();
        Ok(id)
    }

    /// Take a consistent snapshot of the engine's current state.
    pub async fn info(&self) -> Option<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.control.send(ControlMsg::Info(tx)).ok()?;
        rx.await.ok()
    }

    /// Stop the engine. Idempotent: only the first call posts a shutdown;
    /// later calls return immediately without posting a second one.
    pub async fn stop(&self, mode: StopMode) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let (tx, rx) = oneshot::channel();
        if self.control.send(ControlMsg::Stop(mode, tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
