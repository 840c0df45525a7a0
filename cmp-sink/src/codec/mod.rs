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

//! Frame codec seams between raw adapter frames and decoded messages.
//!
//! The arrival side consumes [`MessageDecoder`]; the outbound side drives one
//! stateful [`MessageEncoder`] per encoder-pool slot. [`json`] provides the
//! in-process codec used with the loopback adapter.

pub mod json;

use crate::message::{CmpMessage, DeviceId, StreamId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_MIN_FRAME_SIZE: usize = 64;
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1500;

/// Frame size limits of the adapter an encoder writes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DataContext {
    /// Shorter frames are padded up to this size.
    pub min_frame_size: usize,
    pub max_frame_size: usize,
}

impl Default for DataContext {
    fn default() -> Self {
        Self {
            min_frame_size: DEFAULT_MIN_FRAME_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    /// Frame bytes are not a valid frame of this codec.
    Malformed(String),
    UnsupportedVersion(u8),
    /// A single message does not fit into one frame.
    FrameTooLarge { size: usize, max: usize },
    Serialize(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Malformed(reason) => write!(f, "malformed frame: {reason}"),
            CodecError::UnsupportedVersion(version) => {
                write!(f, "unsupported frame version {version}")
            }
            CodecError::FrameTooLarge { size, max } => {
                write!(f, "frame of {size} bytes exceeds maximum of {max} bytes")
            }
            CodecError::Serialize(reason) => write!(f, "message serialization failed: {reason}"),
        }
    }
}

impl Error for CodecError {}

/// Turns one raw frame into the ordered list of messages it carries.
pub trait MessageDecoder: Send + Sync {
    fn decode(&self, frame: &[u8]) -> Result<Vec<CmpMessage>, CodecError>;
}

/// Stateful outbound encoder. Each instance stamps frames with its own device
/// and stream id and keeps its own sequence counter.
pub trait MessageEncoder: Send {
    fn set_device_id(&mut self, device_id: DeviceId);

    fn set_stream_id(&mut self, stream_id: StreamId);

    /// Encodes one message into one or more wire buffers.
    fn encode(
        &mut self,
        message: &CmpMessage,
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, CodecError>;

    /// Encodes `messages` in order. Codecs that can pack several messages
    /// per frame override this.
    fn encode_batch(
        &mut self,
        messages: &[CmpMessage],
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        let mut frames = Vec::new();
        for message in messages {
            frames.extend(self.encode(message, context)?);
        }
        Ok(frames)
    }
}
