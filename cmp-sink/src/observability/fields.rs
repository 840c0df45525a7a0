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

//! Shared reason values, worker identity and value-format helpers.

use crate::message::CmpMessage;

pub const REASON_BROADCAST_CLOSED: &str = "broadcast_closed";
pub const REASON_SHUTDOWN: &str = "shutdown";
pub const REASON_INVALID_THREAD_NAME: &str = "invalid_thread_name";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

/// Identity a worker loop stamps on its events.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub worker_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn new(worker_id: impl Into<String>, worker_thread: Option<&str>) -> Self {
        Self {
            worker_id: worker_id.into(),
            worker_thread: thread_name_or_default(worker_thread),
        }
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

/// Formats the routing identity of a message as `device/interface/stream`.
pub fn format_route_key(message: &CmpMessage) -> String {
    message.route_key().to_string()
}

/// Formats class and payload kind as `class:kind`.
pub fn format_message_kind(message: &CmpMessage) -> String {
    format!("{}:{}", message.message_class, message.payload_kind())
}

#[cfg(test)]
mod tests {
    use super::{
        format_message_kind, format_route_key, thread_name_or_default, WorkerContext,
        DEFAULT_WORKER_THREAD,
    };
    use crate::message::{CmpMessage, Payload};
    use crate::routing::route_key::RouteKey;

    #[test]
    fn format_route_key_is_compact_triple() {
        let message = CmpMessage::data(RouteKey::new(1, 22, 3), 0, Payload::Undefined);

        assert_eq!(format_route_key(&message), "1/22/3");
    }

    #[test]
    fn format_message_kind_joins_class_and_payload() {
        let message = CmpMessage::capture_module_status(4, Default::default());

        assert_eq!(format_message_kind(&message), "status:capture_module_status");
    }

    #[test]
    fn thread_name_or_default_falls_back_when_absent() {
        assert_eq!(thread_name_or_default(None), DEFAULT_WORKER_THREAD);
        assert_eq!(thread_name_or_default(Some("named-thread")), "named-thread");
        assert_eq!(
            WorkerContext::new("id", None).worker_thread,
            DEFAULT_WORKER_THREAD
        );
    }
}
