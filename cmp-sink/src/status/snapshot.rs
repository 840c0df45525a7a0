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

//! Immutable point-in-time descriptions of remote capture modules.

use crate::message::{
    CaptureModuleInfo, CmpMessage, DeviceId, InterfaceId, InterfaceInfo, PayloadKind, StreamId,
};
use serde::{Deserialize, Serialize};

/// Last reported status of one interface.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InterfaceStatus {
    pub interface_id: InterfaceId,
    #[serde(flatten)]
    pub info: InterfaceInfo,
}

impl InterfaceStatus {
    pub fn new(
        interface_id: InterfaceId,
        interface_type: PayloadKind,
        stream_ids: Vec<StreamId>,
    ) -> Self {
        Self {
            interface_id,
            info: InterfaceInfo {
                interface_type,
                stream_ids,
            },
        }
    }

    pub fn interface_type(&self) -> PayloadKind {
        self.info.interface_type
    }

    pub fn stream_ids(&self) -> &[StreamId] {
        &self.info.stream_ids
    }
}

/// Last reported status of one capture module and its interfaces.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: DeviceId,
    #[serde(default)]
    pub capture_module: CaptureModuleInfo,
    #[serde(default)]
    pub interfaces: Vec<InterfaceStatus>,
}

impl DeviceStatus {
    pub fn new(device_id: DeviceId, capture_module: CaptureModuleInfo) -> Self {
        Self {
            device_id,
            capture_module,
            interfaces: Vec::new(),
        }
    }

    pub fn interface(&self, interface_id: InterfaceId) -> Option<&InterfaceStatus> {
        self.interfaces
            .iter()
            .find(|interface| interface.interface_id == interface_id)
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Replaces the entry with the same interface id, or appends a new one.
    pub(crate) fn upsert_interface(&mut self, status: InterfaceStatus) {
        match self
            .interfaces
            .iter_mut()
            .find(|interface| interface.interface_id == status.interface_id)
        {
            Some(existing) => *existing = status,
            None => self.interfaces.push(status),
        }
    }

    pub(crate) fn remove_interface(&mut self, interface_id: InterfaceId) -> bool {
        let before = self.interfaces.len();
        self.interfaces
            .retain(|interface| interface.interface_id != interface_id);
        before != self.interfaces.len()
    }

    /// Renders this snapshot as the status messages a capture module emits:
    /// the capture-module status first, then one message per interface.
    pub fn to_messages(&self) -> Vec<CmpMessage> {
        let mut messages = Vec::with_capacity(self.interfaces.len() + 1);
        messages.push(CmpMessage::capture_module_status(
            self.device_id,
            self.capture_module.clone(),
        ));
        messages.extend(self.interfaces.iter().map(|interface| {
            CmpMessage::interface_status(
                self.device_id,
                interface.interface_id,
                interface.info.clone(),
            )
        }));
        messages
    }

    /// One-line summary used by status listings.
    pub fn summary_line(&self) -> String {
        format!(
            "Id: {}, Name: {}, Interfaces: {}",
            self.device_id,
            self.capture_module.device_description,
            self.interfaces.len()
        )
    }
}
