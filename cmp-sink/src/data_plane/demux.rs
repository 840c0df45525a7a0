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

//! Arrival-side fan-out of the messages decoded from one frame.

use crate::message::{CmpMessage, MessageClass};
use crate::observability::counters::{DropCounters, DropReason};
use crate::observability::{events, fields};
use crate::routing::route_table::{DeviceRouteTable, RouteTable};
use crate::status::status_store::StatusHandler;
use std::sync::Arc;
use tracing::{debug, Level};

const COMPONENT: &str = "arrival_demux";

/// How a frame's messages were handed to the route tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DispatchMode {
    Empty,
    /// One `publish_batch` carried the whole frame.
    Batch,
    PerMessage,
}

pub struct ArrivalDemultiplexer {
    route_table: Arc<RouteTable>,
    device_route_table: Arc<DeviceRouteTable>,
    status_handler: Arc<dyn StatusHandler>,
    counters: Arc<DropCounters>,
}

impl ArrivalDemultiplexer {
    pub fn new(
        route_table: Arc<RouteTable>,
        device_route_table: Arc<DeviceRouteTable>,
        status_handler: Arc<dyn StatusHandler>,
        counters: Arc<DropCounters>,
    ) -> Self {
        Self {
            route_table,
            device_route_table,
            status_handler,
            counters,
        }
    }

    /// A frame is batchable when every message is data and shares the first
    /// message's route key and payload kind.
    fn is_batchable(messages: &[Arc<CmpMessage>]) -> bool {
        let Some(head) = messages.first() else {
            return false;
        };
        let key = head.route_key();
        let kind = head.payload_kind();
        head.message_class == MessageClass::Data
            && messages.iter().skip(1).all(|message| {
                message.message_class == MessageClass::Data
                    && message.route_key() == key
                    && message.payload_kind() == kind
            })
    }

    /// Dispatches the ordered messages of one decoded frame.
    pub fn dispatch(&self, messages: &[Arc<CmpMessage>]) -> DispatchMode {
        let Some(head) = messages.first() else {
            return DispatchMode::Empty;
        };

        if Self::is_batchable(messages) {
            if tracing::enabled!(Level::DEBUG) {
                debug!(
                    event = events::ARRIVAL_DISPATCH_BATCH,
                    component = COMPONENT,
                    route_key = fields::format_route_key(head).as_str(),
                    batch_len = messages.len(),
                    "dispatching frame as one batch"
                );
            }
            self.route_table.publish_batch(head.route_key(), messages);
            return DispatchMode::Batch;
        }

        for message in messages {
            self.dispatch_one(message);
        }
        DispatchMode::PerMessage
    }

    fn dispatch_one(&self, message: &Arc<CmpMessage>) {
        match message.message_class {
            MessageClass::Data => {
                if tracing::enabled!(Level::TRACE) {
                    tracing::trace!(
                        event = events::ARRIVAL_DISPATCH_SINGLE,
                        component = COMPONENT,
                        route_key = fields::format_route_key(message).as_str(),
                        "dispatching single message"
                    );
                }
                self.route_table.publish(message.route_key(), message);
            }
            MessageClass::Status => {
                self.status_handler.process_status(message);
                if message.is_capture_module_status() {
                    self.device_route_table
                        .publish(message.device_id, message);
                }
            }
            MessageClass::Control | MessageClass::Vendor => {
                self.counters.record(DropReason::UnsupportedMessageClass);
                debug!(
                    event = events::ARRIVAL_DROP_UNSUPPORTED_CLASS,
                    component = COMPONENT,
                    msg_kind = fields::format_message_kind(message).as_str(),
                    route_key = fields::format_route_key(message).as_str(),
                    reason = DropReason::UnsupportedMessageClass.as_str(),
                    "dropping message of unsupported class"
                );
            }
        }
    }
}
