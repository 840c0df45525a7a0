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
    CaptureModuleInfo, CmpMessage, DeviceId, DeviceStatus, InterfaceId, InterfaceInfo,
    InterfaceStatus, Payload, PayloadKind, RouteKey, StreamId,
};

pub fn can_message(key: RouteKey, timestamp_ns: u64) -> CmpMessage {
    CmpMessage::data(
        key,
        timestamp_ns,
        Payload::Can {
            can_id: 0x123,
            data: timestamp_ns.to_le_bytes().to_vec(),
        },
    )
}

pub fn analog_message(key: RouteKey, timestamp_ns: u64) -> CmpMessage {
    CmpMessage::data(
        key,
        timestamp_ns,
        Payload::Analog {
            samples: vec![timestamp_ns as i32; 4],
        },
    )
}

/// `count` CAN messages for `key`, numbered `1..=count` by timestamp.
pub fn can_frame(key: RouteKey, count: u64) -> Vec<CmpMessage> {
    (1..=count).map(|ts| can_message(key, ts)).collect()
}

pub fn capture_status(device_id: DeviceId, description: &str) -> CmpMessage {
    CmpMessage::capture_module_status(
        device_id,
        CaptureModuleInfo {
            device_description: description.to_string(),
            serial_number: format!("SN-{device_id:04}"),
            ..Default::default()
        },
    )
}

pub fn interface_status(
    device_id: DeviceId,
    interface_id: InterfaceId,
    interface_type: PayloadKind,
    stream_ids: &[StreamId],
) -> CmpMessage {
    CmpMessage::interface_status(
        device_id,
        interface_id,
        InterfaceInfo {
            interface_type,
            stream_ids: stream_ids.to_vec(),
        },
    )
}

/// Snapshot with one interface per `(interface_id, kind, stream_ids)` entry.
pub fn device_status(
    device_id: DeviceId,
    description: &str,
    interfaces: &[(InterfaceId, PayloadKind, &[StreamId])],
) -> DeviceStatus {
    let mut status = DeviceStatus::new(
        device_id,
        CaptureModuleInfo {
            device_description: description.to_string(),
            ..Default::default()
        },
    );
    status.interfaces = interfaces
        .iter()
        .map(|(interface_id, kind, stream_ids)| {
            InterfaceStatus::new(*interface_id, *kind, stream_ids.to_vec())
        })
        .collect();
    status
}
