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

use cmp_sink::{AdapterError, CmpMessage, FrameSink, MessageHandler, SampleSink, StreamHandle};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One recorded handler invocation.
#[derive(Clone, Debug)]
pub enum HandlerCall {
    One(Arc<CmpMessage>),
    Many(Vec<Arc<CmpMessage>>),
}

impl HandlerCall {
    pub fn len(&self) -> usize {
        match self {
            HandlerCall::One(_) => 1,
            HandlerCall::Many(messages) => messages.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Route-table handler that records every call it receives.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<HandlerCall>>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<HandlerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Messages received so far, flattened in call order.
    pub fn messages(&self) -> Vec<Arc<CmpMessage>> {
        self.calls()
            .into_iter()
            .flat_map(|call| match call {
                HandlerCall::One(message) => vec![message],
                HandlerCall::Many(messages) => messages,
            })
            .collect()
    }
}

impl MessageHandler for RecordingHandler {
    fn process_one(&self, message: &Arc<CmpMessage>) {
        debug!(route_key = %message.route_key(), "recording handler received one");
        self.calls
            .lock()
            .unwrap()
            .push(HandlerCall::One(message.clone()));
    }

    fn process_many(&self, messages: &[Arc<CmpMessage>]) {
        debug!(batch_len = messages.len(), "recording handler received batch");
        self.calls
            .lock()
            .unwrap()
            .push(HandlerCall::Many(messages.to_vec()));
    }
}

/// Downstream sample sink that records deliveries per stream.
#[derive(Default)]
pub struct RecordingSampleSink {
    deliveries: Mutex<Vec<(StreamHandle, Vec<Arc<CmpMessage>>)>>,
}

impl RecordingSampleSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deliveries(&self) -> Vec<(StreamHandle, Vec<Arc<CmpMessage>>)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    /// Messages delivered to `stream`, in delivery order.
    pub fn messages_for(&self, stream: StreamHandle) -> Vec<Arc<CmpMessage>> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| *target == stream)
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }
}

impl SampleSink for RecordingSampleSink {
    fn on_samples(&self, stream: StreamHandle, messages: &[Arc<CmpMessage>]) {
        self.deliveries
            .lock()
            .unwrap()
            .push((stream, messages.to_vec()));
    }
}

/// Frame sink that keeps every written frame.
#[derive(Default)]
pub struct CollectingFrameSink {
    frames: Mutex<Vec<Vec<u8>>>,
}

impl CollectingFrameSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl FrameSink for CollectingFrameSink {
    fn send_frame(&self, frame: &[u8]) -> Result<(), AdapterError> {
        self.frames.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}
