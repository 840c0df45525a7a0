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

use cmp_sink::{
    CmpMessage, DataContext, DataSink, DispatchMode, JsonFrameDecoder, JsonFrameEncoder,
    MessageEncoder, SinkOptions,
};
use integration_test_utils::{init_logging, RecordingSampleSink};
use std::sync::Arc;

pub(crate) fn make_sink(options: SinkOptions) -> (Arc<DataSink>, Arc<RecordingSampleSink>) {
    init_logging();
    let samples = RecordingSampleSink::new();
    let sink = Arc::new(DataSink::new(JsonFrameDecoder, samples.clone(), options));
    (sink, samples)
}

/// Encodes `messages` as one wire frame and feeds it to `sink`.
#[allow(dead_code)]
pub(crate) fn deliver_frame(sink: &DataSink, messages: &[CmpMessage]) -> DispatchMode {
    let mut encoder = JsonFrameEncoder::new(0, 0);
    let frames = encoder
        .encode_batch(messages, &DataContext::default())
        .expect("test frame should encode");
    assert_eq!(frames.len(), 1, "test frame should fit into one wire frame");
    sink.on_frame(&frames[0])
}
