// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session_id::SessionId;

#[test]
fn roundtrips_a_frame_through_encode_and_decode() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    let frame = Frame::Invoke {
        session: SessionId(7),
        event_type: "render".into(),
    };

    codec.encode(frame.clone(), &mut buf).expect("encode");
    let decoded = codec.decode(&mut buf).expect("decode").expect("a frame");
    assert_eq!(frame, decoded);
    assert!(buf.is_empty());
}

#[test]
fn decode_returns_none_on_partial_frame() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    codec
        .encode(Frame::Heartbeat, &mut buf)
        .expect("encode");
    let mut partial = buf.split_to(buf.len() - 1);

    assert!(codec.decode(&mut partial).expect("decode").is_none());
}

#[test]
fn decode_rejects_corrupted_payload() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    let mut inner = LengthDelimitedCodec::new();
    inner
        .encode(Bytes::from_static(b"not json"), &mut buf)
        .expect("frame the garbage");

    let err = codec.decode(&mut buf).expect_err("malformed payload");
    assert!(matches!(err, CodecError::Malformed(_)));
}

#[test]
fn two_frames_back_to_back_decode_in_order() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::new();
    codec.encode(Frame::Ready, &mut buf).expect("encode");
    codec.encode(Frame::Terminate, &mut buf).expect("encode");

    assert_eq!(
        codec.decode(&mut buf).expect("decode").expect("first"),
        Frame::Ready
    );
    assert_eq!(
        codec.decode(&mut buf).expect("decode").expect("second"),
        Frame::Terminate
    );
}
