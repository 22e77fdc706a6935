// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test doubles shared across crates. Enabled by the `test-support` feature.

use crate::error::ErrorKind;
use crate::upstream::UpstreamSink;
use async_trait::async_trait;
use parking_lot::Mutex;

/// What happened to a session, as observed through its upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Chunk(Vec<u8>),
    Error(ErrorKind, String),
    Closed,
}

/// An `UpstreamSink` that records every call instead of delivering anywhere,
/// so tests can assert on exactly what a session received and in what order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.deliveries.lock().last(), Some(Delivery::Closed))
    }

    /// The error kind the session was terminated with, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.deliveries.lock().iter().find_map(|d| match d {
            Delivery::Error(kind, _) => Some(*kind),
            _ => None,
        })
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Chunk(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl UpstreamSink for RecordingSink {
    async fn write(&self, chunk: Vec<u8>) {
        self.deliveries.lock().push(Delivery::Chunk(chunk));
    }

    async fn error(&self, kind: ErrorKind, message: String) {
        self.deliveries.lock().push(Delivery::Error(kind, message));
    }

    async fn close(&self) {
        self.deliveries.lock().push(Delivery::Closed);
    }
}
