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

//! Encode-and-write path for outbound messages.

use crate::adapter::{AdapterError, FrameSink};
use crate::codec::{DataContext, MessageEncoder};
use crate::data_plane::encoder_pool::{EncoderPool, EncoderPoolError};
use crate::message::CmpMessage;
use crate::observability::events;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "capture_sender";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SendError {
    Encode(EncoderPoolError),
    /// Writing frame `frame_index` of the encoded output failed; earlier
    /// frames were already written.
    Adapter {
        frame_index: usize,
        err: AdapterError,
    },
}

impl Display for SendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SendError::Encode(err) => write!(f, "{err}"),
            SendError::Adapter { frame_index, err } => {
                write!(f, "writing frame {frame_index} failed: {err}")
            }
        }
    }
}

impl Error for SendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SendError::Encode(err) => Some(err),
            SendError::Adapter { err, .. } => Some(err),
        }
    }
}

impl From<EncoderPoolError> for SendError {
    fn from(err: EncoderPoolError) -> Self {
        SendError::Encode(err)
    }
}

/// Couples an encoder pool with the adapter write path.
pub struct CaptureSender<E> {
    pool: Arc<EncoderPool<E>>,
    sink: Arc<dyn FrameSink>,
    context: DataContext,
}

impl<E: MessageEncoder> CaptureSender<E> {
    pub fn new(pool: Arc<EncoderPool<E>>, sink: Arc<dyn FrameSink>, context: DataContext) -> Self {
        Self {
            pool,
            sink,
            context,
        }
    }

    pub fn pool(&self) -> &Arc<EncoderPool<E>> {
        &self.pool
    }

    pub fn context(&self) -> &DataContext {
        &self.context
    }

    /// Encodes `message` on `slot` and writes every resulting frame.
    /// Returns the number of frames written.
    pub fn send(&self, slot: usize, message: &CmpMessage) -> Result<usize, SendError> {
        let frames = self
            .pool
            .encode(slot, message, &self.context)
            .map_err(|err| Self::encode_failed(slot, err))?;
        self.write_frames(slot, &frames)
    }

    /// Encodes `messages` on `slot`, packing them into as few frames as the
    /// codec allows, and writes every frame.
    pub fn send_batch(&self, slot: usize, messages: &[CmpMessage]) -> Result<usize, SendError> {
        if messages.is_empty() {
            return Ok(0);
        }
        let frames = self
            .pool
            .encode_batch(slot, messages, &self.context)
            .map_err(|err| Self::encode_failed(slot, err))?;
        self.write_frames(slot, &frames)
    }

    fn encode_failed(slot: usize, err: EncoderPoolError) -> SendError {
        warn!(
            event = events::ENCODE_FAILED,
            component = COMPONENT,
            slot,
            err = %err,
            "encoding outbound message failed"
        );
        SendError::Encode(err)
    }

    fn write_frames(&self, slot: usize, frames: &[Vec<u8>]) -> Result<usize, SendError> {
        for (frame_index, frame) in frames.iter().enumerate() {
            if let Err(err) = self.sink.send_frame(frame) {
                warn!(
                    event = events::FRAME_SEND_FAILED,
                    component = COMPONENT,
                    slot,
                    frame_index,
                    frame_len = frame.len(),
                    err = %err,
                    "writing frame to adapter failed"
                );
                return Err(SendError::Adapter { frame_index, err });
            }
        }
        debug!(
            event = events::FRAME_SEND_OK,
            component = COMPONENT,
            slot,
            frames = frames.len(),
            "frames written"
        );
        Ok(frames.len())
    }
}
