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

//! Receiving-side facade wiring decoder, demultiplexer, status store and
//! topology.

use crate::codec::MessageDecoder;
use crate::control_plane::handles::CaptureModuleHandle;
use crate::control_plane::object_handlers::SampleSink;
use crate::control_plane::topology::{TopologyError, TopologySynchronizer};
use crate::data_plane::demux::{ArrivalDemultiplexer, DispatchMode};
use crate::data_plane::frame_reader::FrameConsumer;
use crate::message::CmpMessage;
use crate::observability::counters::{DropCounters, DropCountersSnapshot, DropReason};
use crate::observability::events;
use crate::routing::route_table::{DeviceRouteTable, RouteTable};
use crate::status::status_store::{StatusChange, StatusHandler, StatusStore};
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "data_sink";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SinkOptions {
    /// Materialize a capture module as soon as an unknown device reports its
    /// capture-module status.
    pub auto_materialize: bool,
}

/// Stores status messages, then grows the matching capture module.
struct StatusBridge {
    store: Arc<StatusStore>,
    topology: Arc<TopologySynchronizer>,
    options: SinkOptions,
}

impl StatusBridge {
    fn follow(&self, change: StatusChange) {
        let Some(status) = self.store.device_status_by_id(change.device_id()) else {
            return;
        };
        if self.topology.find_capture_module(status.device_id).is_some() {
            let _ = self.topology.refresh_from_status(&status);
        } else if self.options.auto_materialize {
            if let Err(err) = self.topology.add_capture_module_from_status(&status) {
                warn!(
                    event = events::TOPOLOGY_CAPTURE_MODULE_ADD,
                    component = COMPONENT,
                    device_id = status.device_id,
                    err = %err,
                    "auto-materializing capture module failed"
                );
            }
        }
    }
}

impl StatusHandler for StatusBridge {
    fn process_status(&self, message: &Arc<CmpMessage>) {
        if let Some(change) = self.store.apply(message) {
            self.follow(change);
        }
    }
}

pub struct DataSink {
    counters: Arc<DropCounters>,
    route_table: Arc<RouteTable>,
    device_route_table: Arc<DeviceRouteTable>,
    status_store: Arc<StatusStore>,
    topology: Arc<TopologySynchronizer>,
    demux: ArrivalDemultiplexer,
    decoder: Box<dyn MessageDecoder>,
}

impl DataSink {
    pub fn new(
        decoder: impl MessageDecoder + 'static,
        sample_sink: Arc<dyn SampleSink>,
        options: SinkOptions,
    ) -> Self {
        let counters = Arc::new(DropCounters::new());
        let route_table = Arc::new(RouteTable::new("stream_routes", counters.clone()));
        let device_route_table = Arc::new(DeviceRouteTable::new("device_routes", counters.clone()));
        let status_store = Arc::new(StatusStore::new(counters.clone()));
        let topology = Arc::new(TopologySynchronizer::new(
            route_table.clone(),
            device_route_table.clone(),
            sample_sink,
            counters.clone(),
        ));
        let bridge = Arc::new(StatusBridge {
            store: status_store.clone(),
            topology: topology.clone(),
            options,
        });
        let demux = ArrivalDemultiplexer::new(
            route_table.clone(),
            device_route_table.clone(),
            bridge,
            counters.clone(),
        );

        Self {
            counters,
            route_table,
            device_route_table,
            status_store,
            topology,
            demux,
            decoder: Box::new(decoder),
        }
    }

    /// Decodes one raw frame and dispatches its messages. Undecodable frames
    /// are counted and logged.
    pub fn on_frame(&self, frame: &[u8]) -> DispatchMode {
        match self.decoder.decode(frame) {
            Ok(messages) => self.dispatch(messages),
            Err(err) => {
                self.counters.record(DropReason::DecodeFailed);
                warn!(
                    event = events::FRAME_DECODE_FAILED,
                    component = COMPONENT,
                    frame_len = frame.len(),
                    reason = DropReason::DecodeFailed.as_str(),
                    err = %err,
                    "dropping undecodable frame"
                );
                DispatchMode::Empty
            }
        }
    }

    /// Dispatches already decoded messages of one frame.
    pub fn dispatch(&self, messages: Vec<CmpMessage>) -> DispatchMode {
        debug!(
            event = events::FRAME_RECEIVE,
            component = COMPONENT,
            messages = messages.len(),
            "frame received"
        );
        let messages: Vec<Arc<CmpMessage>> = messages.into_iter().map(Arc::new).collect();
        self.demux.dispatch(&messages)
    }

    /// Materializes the capture module described by status entry `index`.
    pub fn add_capture_module_from_status(
        &self,
        index: usize,
    ) -> Result<CaptureModuleHandle, TopologyError> {
        let snapshot = self.status_store.snapshot();
        let status = snapshot
            .device(index)
            .ok_or(TopologyError::IndexOutOfRange {
                index,
                len: snapshot.devices().len(),
            })?;
        self.topology.add_capture_module_from_status(status)
    }

    pub fn add_capture_module_empty(&self) -> Result<CaptureModuleHandle, TopologyError> {
        self.topology.add_capture_module_empty()
    }

    pub fn remove_capture_module(&self, index: usize) -> Result<(), TopologyError> {
        self.topology.remove_capture_module(index)
    }

    /// Interface, stream and identifier operations.
    pub fn topology(&self) -> &Arc<TopologySynchronizer> {
        &self.topology
    }

    pub fn status_store(&self) -> &Arc<StatusStore> {
        &self.status_store
    }

    pub fn route_table(&self) -> &Arc<RouteTable> {
        &self.route_table
    }

    pub fn device_route_table(&self) -> &Arc<DeviceRouteTable> {
        &self.device_route_table
    }

    pub fn drop_counters(&self) -> DropCountersSnapshot {
        self.counters.snapshot()
    }
}

impl FrameConsumer for DataSink {
    fn on_frame(&self, frame: &[u8]) {
        let _ = DataSink::on_frame(self, frame);
    }

    fn on_lagged(&self, skipped: u64) {
        self.counters.record_many(DropReason::AdapterLagged, skipped);
    }
}
