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

//! Message handlers owned by capture modules and streams.

use crate::control_plane::handles::StreamHandle;
use crate::message::{CaptureModuleInfo, CmpMessage, Payload, PayloadKind};
use crate::observability::counters::{DropCounters, DropReason};
use crate::observability::{events, fields};
use crate::routing::handler::MessageHandler;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, Level};

const COMPONENT: &str = "stream_handler";

/// Downstream consumer of stream data, typically the signal/sample builder.
pub trait SampleSink: Send + Sync {
    /// Receives messages accepted by `stream`, in arrival order.
    fn on_samples(&self, stream: StreamHandle, messages: &[Arc<CmpMessage>]);
}

/// Handler of one stream. Forwards messages of the stream's payload kind.
pub(crate) struct StreamHandler {
    stream: StreamHandle,
    payload_kind: AtomicU8,
    downstream: Arc<dyn SampleSink>,
    counters: Arc<DropCounters>,
}

impl StreamHandler {
    pub(crate) fn new(
        stream: StreamHandle,
        payload_kind: PayloadKind,
        downstream: Arc<dyn SampleSink>,
        counters: Arc<DropCounters>,
    ) -> Self {
        Self {
            stream,
            payload_kind: AtomicU8::new(payload_kind.to_raw()),
            downstream,
            counters,
        }
    }

    pub(crate) fn payload_kind(&self) -> PayloadKind {
        PayloadKind::from_raw(self.payload_kind.load(Ordering::Acquire))
    }

    pub(crate) fn set_payload_kind(&self, payload_kind: PayloadKind) {
        self.payload_kind
            .store(payload_kind.to_raw(), Ordering::Release);
    }

    fn accepts(&self, message: &CmpMessage, batch_len: usize) -> bool {
        let expected = self.payload_kind();
        if message.payload_kind() == expected {
            return true;
        }

        self.counters
            .record_many(DropReason::PayloadMismatch, batch_len as u64);
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                event = events::STREAM_DROP_PAYLOAD_MISMATCH,
                component = COMPONENT,
                stream = %self.stream,
                route_key = fields::format_route_key(message).as_str(),
                payload_kind = %message.payload_kind(),
                expected = %expected,
                batch_len,
                reason = DropReason::PayloadMismatch.as_str(),
                "dropping message with foreign payload kind"
            );
        }
        false
    }
}

impl MessageHandler for StreamHandler {
    fn process_one(&self, message: &Arc<CmpMessage>) {
        if self.accepts(message, 1) {
            self.downstream
                .on_samples(self.stream, std::slice::from_ref(message));
        }
    }

    // Batches are homogeneous in kind, so the head decides for all of them.
    fn process_many(&self, messages: &[Arc<CmpMessage>]) {
        let Some(head) = messages.first() else {
            return;
        };
        if self.accepts(head, messages.len()) {
            self.downstream.on_samples(self.stream, messages);
        }
    }
}

/// Handler of one capture module. Keeps the last reported device info.
pub(crate) struct CaptureModuleHandler {
    info: Mutex<CaptureModuleInfo>,
}

impl CaptureModuleHandler {
    pub(crate) fn new(info: CaptureModuleInfo) -> Self {
        Self {
            info: Mutex::new(info),
        }
    }

    pub(crate) fn info(&self) -> CaptureModuleInfo {
        self.info
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_info(&self, info: CaptureModuleInfo) {
        *self.info.lock().unwrap_or_else(PoisonError::into_inner) = info;
    }
}

impl MessageHandler for CaptureModuleHandler {
    fn process_one(&self, message: &Arc<CmpMessage>) {
        if let Payload::CaptureModuleStatus(info) = &message.payload {
            self.set_info(info.clone());
        }
    }

    fn process_many(&self, messages: &[Arc<CmpMessage>]) {
        for message in messages {
            self.process_one(message);
        }
    }
}
