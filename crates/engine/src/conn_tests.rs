// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bytes::BytesMut;
use swarm_core::SessionId;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder};

#[tokio::test]
async fn decodes_a_frame_written_by_the_peer() {
    let (local, peer) = UnixStream::pair().expect("pair");
    let (events_tx, mut events_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let conn = ConnId::next();
    let _outbox = spawn(conn, local, events_tx);

    let mut peer = peer;
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    codec.encode(Frame::Heartbeat, &mut buf).expect("encode");
    peer.write_all(&buf).await.expect("write");

    match events_rx.recv().await.expect("event") {
        InboundEvent::Frame { conn: seen, frame: Frame::Heartbeat } => assert_eq!(seen, conn),
        _ => panic!("expected a decoded heartbeat frame"),
    }
}

#[tokio::test]
async fn frames_sent_to_the_outbox_reach_the_peer() {
    let (local, mut peer) = UnixStream::pair().expect("pair");
    let (events_tx, _events_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let conn = ConnId::next();
    let outbox = spawn(conn, local, events_tx);

    outbox
        .send(Frame::Choke { session: SessionId(7) })
        .await
        .expect("send");

    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::with_capacity(64);
    peer.read_buf(&mut buf).await.expect("read");
    let frame = codec.decode(&mut buf).expect("decode").expect("frame present");
    assert!(matches!(frame, Frame::Choke { session } if session == SessionId(7)));
}

#[tokio::test]
async fn dropping_the_peer_reports_the_connection_as_closed() {
    let (local, peer) = UnixStream::pair().expect("pair");
    let (events_tx, mut events_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let conn = ConnId::next();
    let _outbox = spawn(conn, local, events_tx);

    drop(peer);

    match events_rx.recv().await.expect("event") {
        InboundEvent::Closed { conn: seen } => assert_eq!(seen, conn),
        _ => panic!("expected a closed event"),
    }
}
