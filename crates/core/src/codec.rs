// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default wire codec for [`Frame`](crate::frame::Frame).
//!
//! The engine's contract is on message semantics, not byte layout (see
//! `Frame`); `FrameCodec` is simply the one concrete `Decoder`/`Encoder`
//! pair it ships with, built out of a length-delimited frame over a
//! `serde_json`-encoded payload. Anything implementing the same
//! `tokio_util::codec` traits can stand in for it.

use crate::frame::Frame;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed length prefix: {0}")]
    Framing(#[from] std::io::Error),
    #[error("corrupted frame payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Length-delimited, JSON-encoded [`Frame`] codec.
#[derive(Debug, Default)]
pub struct FrameCodec {
    inner: LengthDelimitedCodec,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(&frame)?;
        let mut buf = BytesMut::with_capacity(payload.len());
        buf.put_slice(&payload);
        self.inner
            .encode(Bytes::from(buf), dst)
            .map_err(CodecError::from)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(mut payload) = self.inner.decode(src)? else {
            return Ok(None);
        };
        let bytes = payload.copy_to_bytes(payload.remaining());
        let frame = serde_json::from_slice(&bytes)?;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
