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

//! Canonical structured event names used across `cmp-sink`.

// Route table events.
pub const ROUTE_SUBSCRIBE: &str = "route_subscribe";
pub const ROUTE_UNSUBSCRIBE: &str = "route_unsubscribe";
pub const ROUTE_UNSUBSCRIBE_MISSING: &str = "route_unsubscribe_missing";
pub const ROUTE_PUBLISH_NO_SUBSCRIBER: &str = "route_publish_no_subscriber";

// Arrival and decode events.
pub const FRAME_RECEIVE: &str = "frame_receive";
pub const FRAME_DECODE_FAILED: &str = "frame_decode_failed";
pub const ARRIVAL_DISPATCH_BATCH: &str = "arrival_dispatch_batch";
pub const ARRIVAL_DISPATCH_SINGLE: &str = "arrival_dispatch_single";
pub const ARRIVAL_DROP_UNSUPPORTED_CLASS: &str = "arrival_drop_unsupported_class";
pub const STREAM_DROP_PAYLOAD_MISMATCH: &str = "stream_drop_payload_mismatch";

// Status aggregation events.
pub const STATUS_DEVICE_ADDED: &str = "status_device_added";
pub const STATUS_DEVICE_UPDATED: &str = "status_device_updated";
pub const STATUS_INTERFACE_UPDATED: &str = "status_interface_updated";
pub const STATUS_DROP_ORDERING_DEPENDENCY: &str = "status_drop_ordering_dependency";
pub const STATUS_DROP_UNSUPPORTED_PAYLOAD: &str = "status_drop_unsupported_payload";
pub const STATUS_CLEARED: &str = "status_cleared";

// Topology lifecycle events.
pub const TOPOLOGY_CAPTURE_MODULE_ADD: &str = "topology_capture_module_add";
pub const TOPOLOGY_CAPTURE_MODULE_REMOVE: &str = "topology_capture_module_remove";
pub const TOPOLOGY_INTERFACE_ADD: &str = "topology_interface_add";
pub const TOPOLOGY_INTERFACE_REMOVE: &str = "topology_interface_remove";
pub const TOPOLOGY_STREAM_ADD: &str = "topology_stream_add";
pub const TOPOLOGY_STREAM_REMOVE: &str = "topology_stream_remove";
pub const TOPOLOGY_REFRESH: &str = "topology_refresh";
pub const TOPOLOGY_ID_MIGRATED: &str = "topology_id_migrated";
pub const TOPOLOGY_ID_REJECTED: &str = "topology_id_rejected";
pub const TOPOLOGY_EDIT_DEFERRED: &str = "topology_edit_deferred";
pub const TOPOLOGY_PAYLOAD_KIND_CHANGED: &str = "topology_payload_kind_changed";

// Outbound events.
pub const ENCODE_FAILED: &str = "encode_failed";
pub const FRAME_SEND_OK: &str = "frame_send_ok";
pub const FRAME_SEND_FAILED: &str = "frame_send_failed";
pub const HEARTBEAT_TICK: &str = "heartbeat_tick";
pub const HEARTBEAT_STOP: &str = "heartbeat_stop";

// Frame reader events.
pub const READER_RECV_LAGGED: &str = "reader_recv_lagged";
pub const READER_RECV_CLOSED: &str = "reader_recv_closed";
pub const READER_STOP: &str = "reader_stop";

// Runtime events.
pub const RUNTIME_THREAD_NAME_FALLBACK: &str = "runtime_thread_name_fallback";
pub const RUNTIME_SPAWN_START: &str = "runtime_spawn_start";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";
pub const RUNTIME_JOIN_FAILED: &str = "runtime_join_failed";
