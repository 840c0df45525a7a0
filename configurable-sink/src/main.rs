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

mod config;

use crate::config::Config;
use clap::Parser;
use cmp_sink::{
    CaptureSender, CmpMessage, DataSink, EncoderPool, FrameConsumer, FrameReader, FrameSink,
    JsonFrameDecoder, JsonFrameEncoder, LoopbackAdapter, SampleSink, StatusHeartbeat,
    StreamHandle,
};
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

const SUMMARY_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command()]
struct SinkArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,
}

/// Logs every delivery instead of building signals from it.
struct LoggingSampleSink;

impl SampleSink for LoggingSampleSink {
    fn on_samples(&self, stream: StreamHandle, messages: &[Arc<CmpMessage>]) {
        debug!(%stream, messages = messages.len(), "samples delivered");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started configurable-sink");

    let args = SinkArgs::parse();
    let config = Config::from_file(&args.config).map_err(|err| {
        error!(path = args.config.as_str(), err = %err, "unable to load configuration");
        err
    })?;

    let sink = Arc::new(DataSink::new(
        JsonFrameDecoder,
        Arc::new(LoggingSampleSink),
        config.sink_options(),
    ));
    let adapter = Arc::new(LoopbackAdapter::new(config.adapter.channel_capacity));

    // The reader subscribes before the heartbeat sends its first frame.
    let consumer: Arc<dyn FrameConsumer> = sink.clone();
    let _reader = FrameReader::start(adapter.subscribe(), consumer)?;

    let local_status = Arc::new(config.local_status());
    let frame_sink: Arc<dyn FrameSink> = adapter.clone();
    let pool = Arc::new(EncoderPool::new(
        local_status.device_id(),
        config.adapter.encoder_slots,
        JsonFrameEncoder::default,
    ));
    let sender = Arc::new(CaptureSender::new(pool, frame_sink, config.data_context()));
    let _heartbeat = StatusHeartbeat::start(sender, local_status, config.heartbeat_options())?;

    loop {
        thread::sleep(SUMMARY_INTERVAL);
        for line in sink.status_store().summary_lines() {
            info!(summary = line.as_str(), "known device");
        }
        let drops = sink.drop_counters();
        info!(
            capture_modules = sink.topology().capture_module_count(),
            routes = sink.route_table().key_count(),
            dropped = drops.total(),
            "sink state"
        );
    }
}
