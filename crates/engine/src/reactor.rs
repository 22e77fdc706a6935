// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reactor: one event loop, on one dedicated thread, that owns every
//! slave and drives every socket for one engine.
//!
//! Nothing here is behind an `Arc<Mutex<_>>` except [`SessionQueue`] itself
//! (held by reference, not owned). Everything else — the pool, the
//! handshake table, the connection index — lives on this function's stack
//! for as long as the engine runs, which is what lets the balancer and
//! slave-state-machine code take plain `&mut` references instead of
//! locking.

use crate::balancer;
use crate::conn::{self, ConnId, InboundEvent};
use crate::control::{ControlMsg, StopMode};
use crate::handshake::HandshakeTable;
use crate::pool::SlavePool;
use crate::queue::SessionQueue;
use crate::slave::{DeadReason, Slave, SlaveState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use swarm_core::{Clock, ErrorKind, Frame, Manifest, Profile, SessionsSnapshot, Snapshot};
use swarm_isolate::{IsolateGateway, Signal};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, oneshot, Notify};

pub struct ReactorLoop<C: Clock> {
    manifest: Manifest,
    profile: Profile,
    isolate: Arc<dyn IsolateGateway>,
    clock: C,
    acceptor: UnixListener,
    queue: Arc<SessionQueue>,
    notify: Arc<Notify>,
    control_rx: mpsc::UnboundedReceiver<ControlMsg>,
    pool: SlavePool,
    handshake: HandshakeTable,
    pending_outboxes: HashMap<ConnId, mpsc::Sender<Frame>>,
    conn_index: HashMap<ConnId, swarm_core::SlaveId>,
    events_tx: mpsc::Sender<InboundEvent>,
    events_rx: mpsc::Receiver<InboundEvent>,
    corrupt_streak: HashMap<ConnId, usize>,
    sessions_served: u64,
    start_time: Instant,
    stopping: bool,
    stop_responder: Option<oneshot::Sender<()>>,
    should_exit: bool,
}

impl<C: Clock> ReactorLoop<C> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        manifest: Manifest,
        profile: Profile,
        isolate: Arc<dyn IsolateGateway>,
        clock: C,
        acceptor: UnixListener,
        queue: Arc<SessionQueue>,
        notify: Arc<Notify>,
        control_rx: mpsc::UnboundedReceiver<ControlMsg>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(conn::CHANNEL_CAPACITY);
        let pool_limit = profile.pool_limit;
        Self {
            manifest,
            profile,
            isolate,
            start_time: clock.now(),
            clock,
            acceptor,
            queue,
            notify,
            control_rx,
            pool: SlavePool::new(pool_limit),
            handshake: HandshakeTable::new(),
            pending_outboxes: HashMap::new(),
            conn_index: HashMap::new(),
            events_tx,
            events_rx,
            corrupt_streak: HashMap::new(),
            sessions_served: 0,
            stopping: false,
            stop_responder: None,
            should_exit: false,
        }
    }

    pub async fn run(mut self) {
        let mut gc_timer = tokio::time::interval(self.profile.idle_timeout.max(std::time::Duration::from_millis(1)) / 2);
        let mut termination_deadline: Option<tokio::time::Instant> = None;

        loop {
            let sleep_until_deadline = async {
                match termination_deadline {
                    Some(when) => tokio::time::sleep_until(when).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                accepted = self.acceptor.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => self.on_accept(stream),
                        Err(err) => tracing::warn!(%err, "accept failed"),
                    }
                }
                control = self.control_rx.recv() => {
                    match control {
                        Some(ControlMsg::Info(respond)) => {
                            let _ = respond.send(self.snapshot());
                        }
                        Some(ControlMsg::Stop(mode, respond)) => {
                            self.begin_stop(mode, respond, &mut termination_deadline).await;
                        }
                        None => self.should_exit = true,
                    }
                }
                event = self.events_rx.recv() => {
                    if let Some(event) = event {
                        self.on_inbound(event).await;
                    }
                }
                _ = self.notify.notified() => {}
                _ = gc_timer.tick() => {
                    self.gc_sweep().await;
                }
                _ = sleep_until_deadline => {
                    self.force_kill_all_remaining().await;
                    termination_deadline = None;
                }
            }

            self.run_balancer().await;
            self.check_stop_completion();
            if self.should_exit {
                break;
            }
        }
    }

    fn on_accept(&mut self, stream: tokio::net::UnixStream) {
        let conn = ConnId::next();
        let outbox = conn::spawn(conn, stream, self.events_tx.clone());
        self.handshake.insert(conn, self.clock.now());
        self.pending_outboxes.insert(conn, outbox);
    }

    async fn on_inbound(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Frame { conn, frame } => self.on_frame(conn, frame).await,
            InboundEvent::Corrupted { conn, error } => self.on_corrupted(conn, error).await,
            InboundEvent::Closed { conn } => self.on_closed(conn).await,
        }
    }

    async fn on_frame(&mut self, conn: ConnId, frame: Frame) {
        let now = self.clock.now();
        self.corrupt_streak.remove(&conn);
        match frame {
            Frame::Handshake { slave } => self.on_handshake(conn, slave, now),
            Frame::Ready => self.on_ready(conn, now),
            Frame::Heartbeat => self.on_heartbeat(conn, now),
            Frame::Chunk { session, bytes } => self.on_chunk(conn, session, bytes, now).await,
            Frame::Error { session, message, .. } => self.on_error_frame(conn, session, message, now).await,
            Frame::Choke { session } => self.on_choke(conn, session, now).await,
            Frame::Invoke { .. } | Frame::Terminate => {
                tracing::debug!(?conn, "ignoring frame the engine never receives from a slave");
            }
        }
    }

    fn on_handshake(&mut self, conn: ConnId, slave_id: swarm_core::SlaveId, now: Instant) {
        let Some(outbox) = self.pending_outboxes.remove(&conn) else {
            tracing::warn!(?conn, %slave_id, "duplicate or unexpected handshake");
            return;
        };
        self.handshake.remove(&conn);

        match self.pool.by_id_mut(&slave_id) {
            Some(slave) if slave.state == SlaveState::Spawning => {
                slave.conn = Some(crate::slave::ConnHandle { outbox });
                slave.note_activity(now);
                self.pool.mark_handshaking(slave_id);
                self.conn_index.insert(conn, slave_id);
            }
            _ => {
                tracing::warn!(?conn, %slave_id, "handshake for an unknown or already-paired slave");
            }
        }
    }

    fn on_ready(&mut self, conn: ConnId, now: Instant) {
        let Some(&slave_id) = self.conn_index.get(&conn) else {
            return;
        };
        if let Some(slave) = self.pool.by_id_mut(&slave_id) {
            if slave.state == SlaveState::Handshaking {
                slave.note_activity(now);
                self.pool.mark_active(slave_id);
            }
        }
    }

    fn on_heartbeat(&mut self, conn: ConnId, now: Instant) {
        if let Some(&slave_id) = self.conn_index.get(&conn) {
            if let Some(slave) = self.pool.by_id_mut(&slave_id) {
                slave.note_activity(now);
            }
        }
    }

    async fn on_chunk(&mut self, conn: ConnId, session: swarm_core::SessionId, bytes: Vec<u8>, now: Instant) {
        let Some(upstream) = self.note_activity_and_peek_upstream(conn, session, now) else {
            return;
        };
        upstream.write(bytes).await;
    }

    async fn on_error_frame(&mut self, conn: ConnId, session: swarm_core::SessionId, message: String, now: Instant) {
        let Some((slave_id, sess)) = self.take_in_flight(conn, session, now) else {
            return;
        };
        sess.upstream.error(ErrorKind::InvocationFailed, message).await;
        self.sessions_served += 1;
        self.drain_if_empty(slave_id).await;
    }

    async fn on_choke(&mut self, conn: ConnId, session: swarm_core::SessionId, now: Instant) {
        let Some((slave_id, sess)) = self.take_in_flight(conn, session, now) else {
            return;
        };
        sess.upstream.close().await;
        self.sessions_served += 1;
        self.drain_if_empty(slave_id).await;
    }

    fn note_activity_and_peek_upstream(&mut self, conn: ConnId, session: swarm_core::SessionId, now: Instant) -> Option<Arc<dyn swarm_core::UpstreamSink>> {
        let slave_id = *self.conn_index.get(&conn)?;
        let slave = self.pool.by_id_mut(&slave_id)?;
        slave.note_activity(now);
        slave.in_flight.get(&session).map(|s| Arc::clone(&s.upstream))
    }

    fn take_in_flight(&mut self, conn: ConnId, session: swarm_core::SessionId, now: Instant) -> Option<(swarm_core::SlaveId, swarm_core::Session)> {
        let slave_id = *self.conn_index.get(&conn)?;
        let slave = self.pool.by_id_mut(&slave_id)?;
        slave.note_activity(now);
        slave.in_flight.remove(&session).map(|s| (slave_id, s))
    }

    /// If `slave_id` is draining and has nothing left in flight, it is done.
    async fn drain_if_empty(&mut self, slave_id: swarm_core::SlaveId) {
        let should_reap = matches!(
            self.pool.by_id(&slave_id),
            Some(slave) if slave.state == SlaveState::Draining && slave.in_flight.is_empty()
        );
        if should_reap {
            self.reap_slave(slave_id, DeadReason::Normal).await;
        }
    }

    async fn on_corrupted(&mut self, conn: ConnId, error: swarm_core::CodecError) {
        tracing::warn!(?conn, %error, "dropping corrupted frame");
        let streak = self.corrupt_streak.entry(conn).or_insert(0);
        *streak += 1;
        if *streak < self.profile.io_bulk_size {
            return;
        }
        self.corrupt_streak.remove(&conn);
        if let Some(&slave_id) = self.conn_index.get(&conn) {
            self.reap_slave(slave_id, DeadReason::Crashed).await;
        } else {
            self.handshake.remove(&conn);
            self.pending_outboxes.remove(&conn);
        }
    }

    async fn on_closed(&mut self, conn: ConnId) {
        self.corrupt_streak.remove(&conn);
        if let Some(slave_id) = self.conn_index.remove(&conn) {
            let reason = match self.pool.by_id(&slave_id) {
                Some(slave) if slave.state == SlaveState::Draining && slave.in_flight.is_empty() => DeadReason::Normal,
                _ => DeadReason::Crashed,
            };
            self.reap_slave(slave_id, reason).await;
        } else {
            // A connection closed before completing its handshake. The
            // underlying slave, if any, is left for the gc sweep's
            // spawning-timeout check — we have no way to link this
            // connection back to a specific slave without a handshake.
            self.handshake.remove(&conn);
            self.pending_outboxes.remove(&conn);
        }
    }

    async fn run_balancer(&mut self) {
        if self.stopping {
            return;
        }
        let now = self.clock.now();
        let outcome = balancer::balance(&self.queue, &mut self.pool, &self.profile, now);
        for session in outcome.expired {
            session.upstream.error(ErrorKind::DeadlineExceeded, "deadline exceeded".into()).await;
            self.sessions_served += 1;
        }
        for _ in 0..outcome.to_spawn {
            match self.isolate.spawn(&self.manifest, &self.profile).await {
                Ok(handle) => self.pool.insert_spawning(Slave::spawning(handle, self.clock.now())),
                Err(err) => tracing::warn!(%err, "failed to spawn slave"),
            }
        }
    }

    async fn gc_sweep(&mut self) {
        let now = self.clock.now();

        for conn in self.handshake.expired(now, self.profile.heartbeat_timeout) {
            self.handshake.remove(&conn);
            self.pending_outboxes.remove(&conn);
        }

        let mut to_reap = Vec::new();
        for slave in self.pool.iter_mut() {
            let reason = match slave.state {
                SlaveState::Spawning if now.saturating_duration_since(slave.spawned_at) >= self.profile.heartbeat_timeout => {
                    Some(DeadReason::LaunchFailed)
                }
                SlaveState::Handshaking if now.saturating_duration_since(slave.spawned_at) >= self.profile.startup_timeout => {
                    Some(DeadReason::HandshakeFailed)
                }
                SlaveState::Active if !slave.in_flight.is_empty() && now.saturating_duration_since(slave.last_activity) >= self.profile.heartbeat_timeout => {
                    Some(DeadReason::Unresponsive)
                }
                SlaveState::Active if slave.in_flight.is_empty() && now.saturating_duration_since(slave.last_activity) >= self.profile.idle_timeout => {
                    slave.state = SlaveState::Draining;
                    Some(DeadReason::Normal)
                }
                SlaveState::Draining if now.saturating_duration_since(slave.last_activity) >= self.profile.termination_timeout => {
                    Some(DeadReason::ForceKilled)
                }
                _ => None,
            };
            if let Some(reason) = reason {
                to_reap.push((slave.id, reason));
            }
        }
        for (id, reason) in to_reap {
            self.reap_slave(id, reason).await;
        }
    }

    async fn begin_stop(&mut self, mode: StopMode, respond: oneshot::Sender<()>, termination_deadline: &mut Option<tokio::time::Instant>) {
        self.stopping = true;
        self.stop_responder = Some(respond);

        for session in self.queue.drain() {
            session.upstream.error(ErrorKind::EngineShutdown, "engine is stopping".into()).await;
            self.sessions_served += 1;
        }

        match mode {
            StopMode::Immediate => {
                self.force_kill_all_remaining().await;
            }
            StopMode::Graceful => {
                let ids: Vec<_> = self.pool.iter_mut().filter(|s| s.state == SlaveState::Active).map(|s| s.id).collect();
                let mut idle_now = Vec::new();
                for id in ids {
                    self.pool.mark_draining(id);
                    if let Some(slave) = self.pool.by_id(&id) {
                        if let Some(conn) = &slave.conn {
                            let _ = conn.outbox.try_send(Frame::Terminate);
                        }
                        if slave.in_flight.is_empty() {
                            idle_now.push(id);
                        }
                    }
                }
                // Idle slaves have nothing left to drain; reap them right
                // away instead of waiting out the full termination grace
                // period they have no use for.
                for id in idle_now {
                    self.reap_slave(id, DeadReason::Normal).await;
                }
                if !self.pool.is_empty() {
                    *termination_deadline = Some(tokio::time::Instant::now() + self.profile.termination_timeout);
                }
            }
        }
    }

    async fn force_kill_all_remaining(&mut self) {
        let ids: Vec<_> = self.pool.iter_mut().map(|s| s.id).collect();
        for id in ids {
            self.reap_slave(id, DeadReason::ForceKilled).await;
        }
    }

    fn check_stop_completion(&mut self) {
        if self.stopping && self.pool.is_empty() {
            if let Some(respond) = self.stop_responder.take() {
                let _ = respond.send(());
            }
            self.should_exit = true;
        }
    }

    async fn reap_slave(&mut self, id: swarm_core::SlaveId, reason: DeadReason) {
        self.conn_index.retain(|_, &mut v| v != id);
        let Some(slave) = self.pool.reap(id, reason) else {
            return;
        };

        if let Some(conn) = &slave.conn {
            let _ = conn.outbox.try_send(Frame::Terminate);
        }
        self.isolate.signal(&slave.isolate, Signal::Terminate);
        let exit = self.isolate.reap(slave.isolate).await;
        tracing::info!(slave = %id, ?reason, success = exit.success, "slave reaped");

        if !slave.in_flight.is_empty() {
            let kind = self.error_kind_for(reason);
            for (_, session) in slave.in_flight {
                session.upstream.error(kind, format!("slave reaped: {reason:?}")).await;
                self.sessions_served += 1;
            }
        }
    }

    fn error_kind_for(&self, reason: DeadReason) -> ErrorKind {
        match reason {
            DeadReason::Unresponsive => ErrorKind::WorkerUnresponsive,
            DeadReason::Crashed => ErrorKind::WorkerCrashed,
            DeadReason::ForceKilled if self.stopping => ErrorKind::EngineShutdown,
            DeadReason::ForceKilled => ErrorKind::WorkerUnresponsive,
            DeadReason::LaunchFailed | DeadReason::HandshakeFailed | DeadReason::Normal => ErrorKind::WorkerCrashed,
        }
    }

    fn snapshot(&self) -> Snapshot {
        let pool = self.pool.snapshot();
        Snapshot {
            queue_depth: self.queue.len(),
            pool,
            sessions: SessionsSnapshot {
                served: self.sessions_served,
                pending: self.queue.len(),
                in_flight: self.pool.in_flight_total(),
            },
            uptime_ms: self.clock.now().saturating_duration_since(self.start_time).as_millis() as u64,
        }
    }
}

#[cfg(test)]
#[path = "reactor_tests.rs"]
mod tests;
