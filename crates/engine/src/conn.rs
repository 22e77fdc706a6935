// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection I/O pump: one task per accepted Unix socket, forwarding
//! decoded frames to the reactor and writing whatever the reactor hands it.
//!
//! Keeping frame I/O in its own task (rather than polling every socket
//! inline in the reactor's `select!`) is what lets the reactor hold pool
//! and queue state directly on its stack with no `Arc<Mutex<_>>`: a
//! connection task owns only its half of two channels, never the slave
//! state itself.

use bytes::BytesMut;
use std::sync::atomic::{AtomicU64, Ordering};
use swarm_core::{CodecError, Frame, FrameCodec};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, Encoder};

/// Identifies one accepted connection for as long as it lives, independent
/// of whether it has been paired with a [`swarm_core::SlaveId`] yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

impl ConnId {
    pub fn next() -> Self {
        Self(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a connection task reports back to the reactor.
pub enum InboundEvent {
    Frame { conn: ConnId, frame: Frame },
    /// The peer sent a frame the codec could not decode.
    Corrupted { conn: ConnId, error: CodecError },
    /// The connection ended, gracefully or otherwise.
    Closed { conn: ConnId },
}

/// Bounded size of both the inbound-event channel (shared by all
/// connections) and each connection's own outbox. A full outbox causes
/// dispatch to skip that slave rather than block the reactor.
pub const CHANNEL_CAPACITY: usize = 64;

/// Spawn the read/write pump for one accepted connection.
///
/// Returns the sender half the reactor uses to hand this connection
/// outbound frames; reads are pushed onto `events` as they decode.
pub fn spawn(conn: ConnId, stream: UnixStream, events: mpsc::Sender<InboundEvent>) -> mpsc::Sender<Frame> {
    let (outbox_tx, outbox_rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(pump(conn, stream, events, outbox_rx));
    outbox_tx
}

async fn pump(conn: ConnId, mut stream: UnixStream, events: mpsc::Sender<InboundEvent>, mut outbox: mpsc::Receiver<Frame>) {
    let mut codec = FrameCodec::new();
    let mut read_buf = BytesMut::with_capacity(4096);
    let mut write_buf = BytesMut::new();

    loop {
        tokio::select! {
            read_result = stream.read_buf(&mut read_buf) => {
                match read_result {
                    Ok(0) => {
                        let _ = events.send(InboundEvent::Closed { conn }).await;
                        return;
                    }
                    Ok(_) => {
                        loop {
                            match codec.decode(&mut read_buf) {
                                Ok(Some(frame)) => {
                                    if events.send(InboundEvent::Frame { conn, frame }).await.is_err() {
                                        return;
                                    }
                                }
                                Ok(None) => break,
                                Err(error) => {
                                    let _ = events.send(InboundEvent::Corrupted { conn, error }).await;
                                    break;
                                }
                            }
                        }
                    }
                    Err(_) => {
                        let _ = events.send(InboundEvent::Closed { conn }).await;
                        return;
                    }
                }
            }
            outbound = outbox.recv() => {
                let Some(frame) = outbound else {
                    return;
                };
                if codec.encode(frame, &mut write_buf).is_err() {
                    continue;
                }
                if stream.write_all(&write_buf).await.is_err() {
                    let _ = events.send(InboundEvent::Closed { conn }).await;
                    return;
                }
                write_buf.clear();
            }
        }
    }
}

#[cfg(test)]
#[path = "conn_tests.rs"]
mod tests;
