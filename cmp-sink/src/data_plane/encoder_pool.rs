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

//! Independently lockable outbound encode slots.
//!
//! Slot `n` sends as stream `n` of the local device. Each slot has its own
//! lock, so the heartbeat and ad-hoc senders only contend when they use the
//! same slot.

use crate::codec::{CodecError, DataContext, MessageEncoder};
use crate::message::{CmpMessage, DeviceId, StreamId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Upper bound on slots; one per possible stream id.
pub const MAX_ENCODER_SLOTS: usize = StreamId::MAX as usize + 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncoderPoolError {
    SlotOutOfRange { slot: usize, len: usize },
    Codec(CodecError),
}

impl Display for EncoderPoolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderPoolError::SlotOutOfRange { slot, len } => {
                write!(f, "encoder slot {slot} out of range for {len} slots")
            }
            EncoderPoolError::Codec(err) => write!(f, "encode failed: {err}"),
        }
    }
}

impl Error for EncoderPoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncoderPoolError::Codec(err) => Some(err),
            EncoderPoolError::SlotOutOfRange { .. } => None,
        }
    }
}

impl From<CodecError> for EncoderPoolError {
    fn from(err: CodecError) -> Self {
        EncoderPoolError::Codec(err)
    }
}

pub struct EncoderPool<E> {
    slots: Vec<Mutex<E>>,
}

impl<E: MessageEncoder> EncoderPool<E> {
    /// Builds `slot_count` encoders (capped at [`MAX_ENCODER_SLOTS`]) stamped
    /// with `device_id` and their slot index as stream id.
    pub fn new(device_id: DeviceId, slot_count: usize, mut factory: impl FnMut() -> E) -> Self {
        let slots = (0..slot_count.min(MAX_ENCODER_SLOTS))
            .map(|index| {
                let mut encoder = factory();
                encoder.set_device_id(device_id);
                // `index` is below MAX_ENCODER_SLOTS, so it fits a stream id.
                encoder.set_stream_id(index as StreamId);
                Mutex::new(encoder)
            })
            .collect();
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, slot: usize) -> Result<MutexGuard<'_, E>, EncoderPoolError> {
        self.slots
            .get(slot)
            .map(|encoder| encoder.lock().unwrap_or_else(PoisonError::into_inner))
            .ok_or(EncoderPoolError::SlotOutOfRange {
                slot,
                len: self.slots.len(),
            })
    }

    /// Encodes `message` on `slot`, holding only that slot's lock.
    pub fn encode(
        &self,
        slot: usize,
        message: &CmpMessage,
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, EncoderPoolError> {
        Ok(self.slot(slot)?.encode(message, context)?)
    }

    pub fn encode_batch(
        &self,
        slot: usize,
        messages: &[CmpMessage],
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, EncoderPoolError> {
        Ok(self.slot(slot)?.encode_batch(messages, context)?)
    }

    /// Restamps every slot with a new local device id.
    pub fn configure_device(&self, device_id: DeviceId) {
        for encoder in &self.slots {
            encoder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_device_id(device_id);
        }
    }
}
