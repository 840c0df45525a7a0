/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Adapter write path and the in-process loopback adapter.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Raw frame as handed between adapter and codec.
pub type Frame = Arc<[u8]>;

pub const DEFAULT_LOOPBACK_CAPACITY: usize = 1024;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AdapterError {
    /// Nothing is reading from the adapter.
    NoReceiver,
    Closed,
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::NoReceiver => f.write_str("no receiver attached to adapter"),
            AdapterError::Closed => f.write_str("adapter is closed"),
        }
    }
}

impl Error for AdapterError {}

/// Write side of a network adapter.
pub trait FrameSink: Send + Sync {
    fn send_frame(&self, frame: &[u8]) -> Result<(), AdapterError>;
}

/// Adapter that delivers every written frame to all of its readers.
///
/// Backed by a bounded broadcast channel: readers that fall behind by more
/// than the capacity skip the oldest frames.
#[derive(Clone)]
pub struct LoopbackAdapter {
    sender: Sender<Frame>,
}

impl LoopbackAdapter {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Attaches a new reader that sees frames written from now on.
    pub fn subscribe(&self) -> Receiver<Frame> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LoopbackAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_LOOPBACK_CAPACITY)
    }
}

impl FrameSink for LoopbackAdapter {
    fn send_frame(&self, frame: &[u8]) -> Result<(), AdapterError> {
        self.sender
            .send(Frame::from(frame))
            .map(|_| ())
            .map_err(|_| AdapterError::NoReceiver)
    }
}
