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

//! Decoded CMP message model shared by codecs, routing and topology objects.

use crate::routing::route_key::RouteKey;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of a capture module (remote device).
pub type DeviceId = u16;
/// Identifier of an interface, unique among interfaces of one capture module.
pub type InterfaceId = u32;
/// Identifier of a stream, unique among streams of one interface.
pub type StreamId = u8;

/// Top-level CMP message class.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageClass {
    Data,
    Control,
    Status,
    Vendor,
}

impl Display for MessageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MessageClass::Data => "data",
            MessageClass::Control => "control",
            MessageClass::Status => "status",
            MessageClass::Vendor => "vendor",
        };
        f.write_str(label)
    }
}

/// Payload sub-kind carried by a message.
///
/// Data kinds describe what an interface transports; the two status kinds
/// distinguish capture-module level status from interface level status.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    #[default]
    Undefined,
    Can,
    CanFd,
    Ethernet,
    Analog,
    CaptureModuleStatus,
    InterfaceStatus,
}

impl PayloadKind {
    /// Returns `true` for kinds an interface or stream can carry.
    pub fn is_data_kind(self) -> bool {
        !matches!(
            self,
            PayloadKind::CaptureModuleStatus | PayloadKind::InterfaceStatus
        )
    }

    pub(crate) fn to_raw(self) -> u8 {
        match self {
            PayloadKind::Undefined => 0,
            PayloadKind::Can => 1,
            PayloadKind::CanFd => 2,
            PayloadKind::Ethernet => 3,
            PayloadKind::Analog => 4,
            PayloadKind::CaptureModuleStatus => 5,
            PayloadKind::InterfaceStatus => 6,
        }
    }

    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => PayloadKind::Can,
            2 => PayloadKind::CanFd,
            3 => PayloadKind::Ethernet,
            4 => PayloadKind::Analog,
            5 => PayloadKind::CaptureModuleStatus,
            6 => PayloadKind::InterfaceStatus,
            _ => PayloadKind::Undefined,
        }
    }
}

impl Display for PayloadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PayloadKind::Undefined => "undefined",
            PayloadKind::Can => "can",
            PayloadKind::CanFd => "can_fd",
            PayloadKind::Ethernet => "ethernet",
            PayloadKind::Analog => "analog",
            PayloadKind::CaptureModuleStatus => "capture_module_status",
            PayloadKind::InterfaceStatus => "interface_status",
        };
        f.write_str(label)
    }
}

/// Descriptive data a capture module reports about itself.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CaptureModuleInfo {
    #[serde(default)]
    pub device_description: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub hardware_version: String,
    #[serde(default)]
    pub software_version: String,
    #[serde(default)]
    pub vendor_data: Vec<u8>,
}

/// Descriptive data a capture module reports about one of its interfaces.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub interface_type: PayloadKind,
    #[serde(default)]
    pub stream_ids: Vec<StreamId>,
}

/// Decoded payload body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Undefined,
    Can { can_id: u32, data: Vec<u8> },
    CanFd { can_id: u32, data: Vec<u8> },
    Ethernet { data: Vec<u8> },
    Analog { samples: Vec<i32> },
    CaptureModuleStatus(CaptureModuleInfo),
    InterfaceStatus(InterfaceInfo),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Undefined => PayloadKind::Undefined,
            Payload::Can { .. } => PayloadKind::Can,
            Payload::CanFd { .. } => PayloadKind::CanFd,
            Payload::Ethernet { .. } => PayloadKind::Ethernet,
            Payload::Analog { .. } => PayloadKind::Analog,
            Payload::CaptureModuleStatus(_) => PayloadKind::CaptureModuleStatus,
            Payload::InterfaceStatus(_) => PayloadKind::InterfaceStatus,
        }
    }
}

/// One decoded protocol message tagged with its routing identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CmpMessage {
    pub message_class: MessageClass,
    pub device_id: DeviceId,
    #[serde(default)]
    pub interface_id: InterfaceId,
    #[serde(default)]
    pub stream_id: StreamId,
    #[serde(default)]
    pub timestamp_ns: u64,
    pub payload: Payload,
}

impl CmpMessage {
    /// Builds a data message addressed to one stream.
    pub fn data(key: RouteKey, timestamp_ns: u64, payload: Payload) -> Self {
        Self {
            message_class: MessageClass::Data,
            device_id: key.device_id,
            interface_id: key.interface_id,
            stream_id: key.stream_id,
            timestamp_ns,
            payload,
        }
    }

    /// Builds the capture-module level status message of `device_id`.
    pub fn capture_module_status(device_id: DeviceId, info: CaptureModuleInfo) -> Self {
        Self {
            message_class: MessageClass::Status,
            device_id,
            interface_id: 0,
            stream_id: 0,
            timestamp_ns: 0,
            payload: Payload::CaptureModuleStatus(info),
        }
    }

    /// Builds the status message of one interface of `device_id`.
    pub fn interface_status(
        device_id: DeviceId,
        interface_id: InterfaceId,
        info: InterfaceInfo,
    ) -> Self {
        Self {
            message_class: MessageClass::Status,
            device_id,
            interface_id,
            stream_id: 0,
            timestamp_ns: 0,
            payload: Payload::InterfaceStatus(info),
        }
    }

    pub fn payload_kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn route_key(&self) -> RouteKey {
        RouteKey::new(self.device_id, self.interface_id, self.stream_id)
    }

    /// Returns `true` for status messages describing a whole capture module.
    pub fn is_capture_module_status(&self) -> bool {
        self.message_class == MessageClass::Status
            && self.payload_kind() == PayloadKind::CaptureModuleStatus
    }
}

#[cfg(test)]
mod tests {
    use super::{CmpMessage, InterfaceInfo, MessageClass, Payload, PayloadKind};
    use crate::routing::route_key::RouteKey;

    #[test]
    fn payload_kind_raw_encoding_is_reversible_for_every_kind() {
        for kind in [
            PayloadKind::Undefined,
            PayloadKind::Can,
            PayloadKind::CanFd,
            PayloadKind::Ethernet,
            PayloadKind::Analog,
            PayloadKind::CaptureModuleStatus,
            PayloadKind::InterfaceStatus,
        ] {
            assert_eq!(PayloadKind::from_raw(kind.to_raw()), kind);
        }
        assert_eq!(PayloadKind::from_raw(200), PayloadKind::Undefined);
    }

    #[test]
    fn status_kinds_are_not_data_kinds() {
        assert!(PayloadKind::Can.is_data_kind());
        assert!(PayloadKind::Undefined.is_data_kind());
        assert!(!PayloadKind::CaptureModuleStatus.is_data_kind());
        assert!(!PayloadKind::InterfaceStatus.is_data_kind());
    }

    #[test]
    fn constructors_tag_class_and_key() {
        let key = RouteKey::new(5, 10, 20);
        let data = CmpMessage::data(
            key,
            42,
            Payload::Can {
                can_id: 0x123,
                data: vec![1, 2],
            },
        );
        assert_eq!(data.message_class, MessageClass::Data);
        assert_eq!(data.route_key(), key);
        assert_eq!(data.payload_kind(), PayloadKind::Can);
        assert!(!data.is_capture_module_status());

        let status = CmpMessage::capture_module_status(5, Default::default());
        assert!(status.is_capture_module_status());

        let interface = CmpMessage::interface_status(5, 3, InterfaceInfo::default());
        assert_eq!(interface.message_class, MessageClass::Status);
        assert_eq!(interface.interface_id, 3);
        assert!(!interface.is_capture_module_status());
    }

    #[test]
    fn message_json_shape_uses_tagged_payload() {
        let message = CmpMessage::data(
            RouteKey::new(1, 2, 3),
            7,
            Payload::Ethernet { data: vec![0xAA] },
        );

        let json = serde_json::to_value(&message).expect("message should serialize");
        assert_eq!(json["message_class"], "data");
        assert_eq!(json["payload"]["kind"], "ethernet");
    }
}
