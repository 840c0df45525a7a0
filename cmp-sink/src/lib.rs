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

//! # cmp-sink
//!
//! `cmp-sink` is the receiving core of a CMP capture data sink. Decoded messages
//! tagged with `(device, interface, stream)` are routed to the capture-module,
//! interface and stream objects that mirror the remote topology, while that
//! topology is edited concurrently.
//!
//! Typical usage is centered on [`DataSink`]: feed it raw frames (or decoded
//! messages), materialize capture modules from the status it aggregated and
//! edit the tree through [`TopologySynchronizer`].
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use cmp_sink::{
//!     CaptureModuleInfo, CmpMessage, DataSink, JsonFrameDecoder, Payload, RouteKey, SampleSink,
//!     SinkOptions, StreamHandle,
//! };
//!
//! #[derive(Default)]
//! struct CountingSamples(Mutex<usize>);
//!
//! impl SampleSink for CountingSamples {
//!     fn on_samples(&self, _stream: StreamHandle, messages: &[Arc<CmpMessage>]) {
//!         *self.0.lock().unwrap() += messages.len();
//!     }
//! }
//!
//! let samples = Arc::new(CountingSamples::default());
//! let sink = DataSink::new(JsonFrameDecoder, samples.clone(), SinkOptions::default());
//!
//! sink.dispatch(vec![CmpMessage::capture_module_status(3, CaptureModuleInfo::default())]);
//! let module = sink.add_capture_module_from_status(0).unwrap();
//! let (interface, _) = sink.topology().create_interface(module).unwrap();
//! // Selection index 1 is CAN.
//! assert!(sink.topology().set_interface_payload_kind(interface, 1).unwrap().is_applied());
//! let (_, stream_id) = sink.topology().create_stream(interface).unwrap();
//!
//! sink.dispatch(vec![CmpMessage::data(
//!     RouteKey::new(3, 0, stream_id),
//!     0,
//!     Payload::Can { can_id: 0x10, data: vec![1, 2] },
//! )]);
//! assert_eq!(*samples.0.lock().unwrap(), 1);
//! ```
//!
//! ## Identifier edits
//!
//! Device, interface and stream ids can change while messages arrive. A
//! rejected edit is returned as a value and leaves routing untouched:
//!
//! ```
//! use std::sync::Arc;
//! use cmp_sink::{
//!     CmpMessage, DataSink, EditError, EditOutcome, IdError, JsonFrameDecoder, SampleSink,
//!     SinkOptions, StreamHandle,
//! };
//!
//! struct Discard;
//! impl SampleSink for Discard {
//!     fn on_samples(&self, _stream: StreamHandle, _messages: &[Arc<CmpMessage>]) {}
//! }
//!
//! let sink = DataSink::new(JsonFrameDecoder, Arc::new(Discard), SinkOptions::default());
//! let module = sink.add_capture_module_empty().unwrap();
//! let (first, _) = sink.topology().create_interface(module).unwrap();
//! let (second, _) = sink.topology().create_interface(module).unwrap();
//!
//! assert_eq!(
//!     sink.topology().set_interface_id(second, 0).unwrap(),
//!     EditOutcome::Rejected(EditError::Id(IdError::DuplicateId(0)))
//! );
//! assert_eq!(sink.topology().set_interface_id(first, 7).unwrap(), EditOutcome::Applied);
//! ```
//!
//! ## Internal architecture map
//!
//! - Routing: route keys, the handler capability and keyed subscriber tables
//! - Control plane: topology tree, identifier allocation and property edits
//! - Status: remote status aggregation and the local status sent outbound
//! - Data plane: arrival demultiplexing, frame reading, encoder pool and heartbeat
//! - Codec/adapter: frame codec seams, JSON loopback codec and loopback adapter
//! - Runtime: worker thread and Tokio runtime boundaries
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events; every event carries an
//! `event` name from [`observability::events`] and a `component`. Silent drop
//! paths are additionally counted in [`DropCounters`].
//! Library code does not initialize a global subscriber. Binaries and tests
//! are responsible for one-time `tracing_subscriber` initialization.

pub mod adapter;
pub mod codec;
pub mod control_plane;
pub mod data_plane;
mod data_sink;
pub mod message;
#[doc(hidden)]
pub mod observability;
pub mod routing;
mod runtime;
pub mod status;

pub use adapter::{AdapterError, Frame, FrameSink, LoopbackAdapter, DEFAULT_LOOPBACK_CAPACITY};
pub use codec::json::{JsonFrameDecoder, JsonFrameEncoder};
pub use codec::{CodecError, DataContext, MessageDecoder, MessageEncoder};
pub use control_plane::edits::{EditError, EditOutcome, UpdateReport};
pub use control_plane::handles::{CaptureModuleHandle, InterfaceHandle, NodeHandle, StreamHandle};
pub use control_plane::id_allocator::{AllocatableId, IdAllocator, IdError};
pub use control_plane::object_handlers::SampleSink;
pub use control_plane::topology::{GrowthSummary, TopologyError, TopologySynchronizer};
pub use data_plane::demux::{ArrivalDemultiplexer, DispatchMode};
pub use data_plane::encoder_pool::{EncoderPool, EncoderPoolError};
pub use data_plane::frame_reader::{FrameConsumer, FrameReader};
pub use data_plane::heartbeat::{HeartbeatOptions, StatusHeartbeat};
pub use data_plane::sender::{CaptureSender, SendError};
pub use data_sink::{DataSink, SinkOptions};
pub use message::{
    CaptureModuleInfo, CmpMessage, DeviceId, InterfaceId, InterfaceInfo, MessageClass, Payload,
    PayloadKind, StreamId,
};
pub use observability::counters::{DropCounters, DropCountersSnapshot, DropReason};
pub use routing::handler::MessageHandler;
pub use routing::route_key::RouteKey;
pub use routing::route_table::{DeviceRouteTable, RouteTable, SubscriberTable};
pub use status::local_status::LocalCaptureStatus;
pub use status::snapshot::{DeviceStatus, InterfaceStatus};
pub use status::status_store::{StatusChange, StatusHandler, StatusSnapshot, StatusStore};
