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

//! Status this process reports about itself on the outbound side.

use crate::message::{CaptureModuleInfo, CmpMessage, DeviceId, InterfaceId};
use crate::status::snapshot::{DeviceStatus, InterfaceStatus};
use std::sync::{Mutex, PoisonError};

/// Local capture-module status, rendered on every heartbeat.
#[derive(Debug, Default)]
pub struct LocalCaptureStatus {
    status: Mutex<DeviceStatus>,
}

impl LocalCaptureStatus {
    pub fn new(device_id: DeviceId, info: CaptureModuleInfo) -> Self {
        Self {
            status: Mutex::new(DeviceStatus::new(device_id, info)),
        }
    }

    fn with_status<R>(&self, f: impl FnOnce(&mut DeviceStatus) -> R) -> R {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut status)
    }

    pub fn device_id(&self) -> DeviceId {
        self.with_status(|status| status.device_id)
    }

    pub fn set_device_id(&self, device_id: DeviceId) {
        self.with_status(|status| status.device_id = device_id);
    }

    pub fn set_capture_module_info(&self, info: CaptureModuleInfo) {
        self.with_status(|status| status.capture_module = info);
    }

    /// Adds or replaces the interface with the same id.
    pub fn set_interface(&self, interface: InterfaceStatus) {
        self.with_status(|status| status.upsert_interface(interface));
    }

    pub fn remove_interface(&self, interface_id: InterfaceId) -> bool {
        self.with_status(|status| status.remove_interface(interface_id))
    }

    pub fn snapshot(&self) -> DeviceStatus {
        self.with_status(|status| status.clone())
    }

    /// Capture-module status followed by one interface status per interface.
    pub fn to_messages(&self) -> Vec<CmpMessage> {
        self.with_status(|status| status.to_messages())
    }
}
