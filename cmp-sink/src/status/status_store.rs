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

//! Aggregation of remote status messages into versioned device snapshots.

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use crate::message::{CmpMessage, DeviceId, InterfaceId, Payload};
use crate::observability::counters::{DropCounters, DropReason};
use crate::observability::events;
use crate::status::snapshot::{DeviceStatus, InterfaceStatus};

const COMPONENT: &str = "status_store";

/// Receiver of status-class messages on the arrival side.
pub trait StatusHandler: Send + Sync {
    fn process_status(&self, message: &Arc<CmpMessage>);
}

/// What a stored status message changed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusChange {
    DeviceAdded(DeviceId),
    DeviceUpdated(DeviceId),
    InterfaceUpdated {
        device_id: DeviceId,
        interface_id: InterfaceId,
    },
}

impl StatusChange {
    pub fn device_id(&self) -> DeviceId {
        match self {
            StatusChange::DeviceAdded(device_id) | StatusChange::DeviceUpdated(device_id) => {
                *device_id
            }
            StatusChange::InterfaceUpdated { device_id, .. } => *device_id,
        }
    }
}

/// Immutable view of every known device, in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct StatusSnapshot {
    version: u64,
    devices: Vec<DeviceStatus>,
}

impl StatusSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn devices(&self) -> &[DeviceStatus] {
        &self.devices
    }

    pub fn device(&self, index: usize) -> Option<&DeviceStatus> {
        self.devices.get(index)
    }

    pub fn device_by_id(&self, device_id: DeviceId) -> Option<&DeviceStatus> {
        self.devices
            .iter()
            .find(|device| device.device_id == device_id)
    }

    pub fn index_of(&self, device_id: DeviceId) -> Option<usize> {
        self.devices
            .iter()
            .position(|device| device.device_id == device_id)
    }
}

/// Status aggregator. Readers load the current snapshot without locking;
/// writers serialize on `write_lock` and replace the snapshot wholesale.
pub struct StatusStore {
    snapshot: ArcSwap<StatusSnapshot>,
    next_version: AtomicU64,
    write_lock: Mutex<()>,
    counters: Arc<DropCounters>,
}

impl StatusStore {
    pub fn new(counters: Arc<DropCounters>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(StatusSnapshot::default()),
            next_version: AtomicU64::new(1),
            write_lock: Mutex::new(()),
            counters,
        }
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.snapshot.load_full()
    }

    pub fn version(&self) -> u64 {
        self.snapshot.load().version
    }

    pub fn device_count(&self) -> usize {
        self.snapshot.load().devices.len()
    }

    pub fn device_status(&self, index: usize) -> Option<DeviceStatus> {
        self.snapshot.load().device(index).cloned()
    }

    pub fn device_status_by_id(&self, device_id: DeviceId) -> Option<DeviceStatus> {
        self.snapshot.load().device_by_id(device_id).cloned()
    }

    pub fn index_of(&self, device_id: DeviceId) -> Option<usize> {
        self.snapshot.load().index_of(device_id)
    }

    /// One `Id: .., Name: .., Interfaces: ..` line per known device.
    pub fn summary_lines(&self) -> Vec<String> {
        self.snapshot
            .load()
            .devices
            .iter()
            .map(DeviceStatus::summary_line)
            .collect()
    }

    pub fn clear(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.publish(Vec::new());
        info!(
            event = events::STATUS_CLEARED,
            component = COMPONENT,
            "status store cleared"
        );
    }

    fn publish(&self, devices: Vec<DeviceStatus>) {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        self.snapshot
            .store(Arc::new(StatusSnapshot { version, devices }));
    }

    /// Stores one status message. Returns `None` when the message carried no
    /// status or was dropped.
    pub fn apply(&self, message: &CmpMessage) -> Option<StatusChange> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot.load();

        match &message.payload {
            Payload::CaptureModuleStatus(info) => {
                let mut devices = current.devices.clone();
                let change = match devices
                    .iter_mut()
                    .find(|device| device.device_id == message.device_id)
                {
                    Some(device) => {
                        device.capture_module = info.clone();
                        debug!(
                            event = events::STATUS_DEVICE_UPDATED,
                            component = COMPONENT,
                            device_id = message.device_id,
                            "capture module status stored"
                        );
                        StatusChange::DeviceUpdated(message.device_id)
                    }
                    None => {
                        devices.push(DeviceStatus::new(message.device_id, info.clone()));
                        info!(
                            event = events::STATUS_DEVICE_ADDED,
                            component = COMPONENT,
                            device_id = message.device_id,
                            device_description = info.device_description.as_str(),
                            "new remote device reported"
                        );
                        StatusChange::DeviceAdded(message.device_id)
                    }
                };
                self.publish(devices);
                Some(change)
            }
            Payload::InterfaceStatus(info) => {
                let Some(index) = current.index_of(message.device_id) else {
                    self.counters.record(DropReason::OrderingDependency);
                    debug!(
                        event = events::STATUS_DROP_ORDERING_DEPENDENCY,
                        component = COMPONENT,
                        device_id = message.device_id,
                        interface_id = message.interface_id,
                        reason = DropReason::OrderingDependency.as_str(),
                        "interface status before capture module status; dropping"
                    );
                    return None;
                };

                let mut devices = current.devices.clone();
                devices[index].upsert_interface(InterfaceStatus {
                    interface_id: message.interface_id,
                    info: info.clone(),
                });
                self.publish(devices);
                debug!(
                    event = events::STATUS_INTERFACE_UPDATED,
                    component = COMPONENT,
                    device_id = message.device_id,
                    interface_id = message.interface_id,
                    stream_ids = info.stream_ids.len(),
                    "interface status stored"
                );
                Some(StatusChange::InterfaceUpdated {
                    device_id: message.device_id,
                    interface_id: message.interface_id,
                })
            }
            _ => {
                self.counters.record(DropReason::UnsupportedStatusPayload);
                debug!(
                    event = events::STATUS_DROP_UNSUPPORTED_PAYLOAD,
                    component = COMPONENT,
                    device_id = message.device_id,
                    interface_id = message.interface_id,
                    payload_kind = %message.payload_kind(),
                    reason = DropReason::UnsupportedStatusPayload.as_str(),
                    "status message without status payload; dropping"
                );
                None
            }
        }
    }
}

impl StatusHandler for StatusStore {
    fn process_status(&self, message: &Arc<CmpMessage>) {
        let _ = self.apply(message);
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusChange, StatusStore};
    use crate::message::{CaptureModuleInfo, CmpMessage, InterfaceInfo, MessageClass, Payload, PayloadKind};
    use crate::routing::route_key::RouteKey;
    use crate::observability::counters::DropCounters;
    use std::sync::Arc;

    fn store() -> (StatusStore, Arc<DropCounters>) {
        let counters = Arc::new(DropCounters::new());
        (StatusStore::new(counters.clone()), counters)
    }

    fn capture(device_id: u16, name: &str) -> CmpMessage {
        CmpMessage::capture_module_status(
            device_id,
            CaptureModuleInfo {
                device_description: name.to_string(),
                ..Default::default()
            },
        )
    }

    fn interface(device_id: u16, interface_id: u32, stream_ids: Vec<u8>) -> CmpMessage {
        CmpMessage::interface_status(
            device_id,
            interface_id,
            InterfaceInfo {
                interface_type: PayloadKind::Can,
                stream_ids,
            },
        )
    }

    #[test]
    fn interface_status_before_capture_status_is_dropped() {
        let (store, counters) = store();

        assert_eq!(store.apply(&interface(3, 0, vec![1])), None);
        assert_eq!(store.device_count(), 0);
        assert_eq!(counters.snapshot().ordering_dependency, 1);
    }

    #[test]
    fn capture_status_then_interfaces_build_the_device() {
        let (store, _) = store();

        assert_eq!(store.apply(&capture(3, "logger")), Some(StatusChange::DeviceAdded(3)));
        assert_eq!(
            store.apply(&interface(3, 0, vec![1, 2])),
            Some(StatusChange::InterfaceUpdated {
                device_id: 3,
                interface_id: 0
            })
        );
        store.apply(&interface(3, 0, vec![1, 2, 3]));

        let device = store.device_status_by_id(3).unwrap();
        assert_eq!(device.interface_count(), 1);
        assert_eq!(device.interface(0).unwrap().stream_ids(), &[1, 2, 3]);
        assert_eq!(store.summary_lines(), vec!["Id: 3, Name: logger, Interfaces: 1"]);
    }

    #[test]
    fn capture_status_update_keeps_interfaces() {
        let (store, _) = store();
        store.apply(&capture(1, "first"));
        store.apply(&interface(1, 4, vec![0]));

        assert_eq!(store.apply(&capture(1, "renamed")), Some(StatusChange::DeviceUpdated(1)));

        let device = store.device_status(0).unwrap();
        assert_eq!(device.capture_module.device_description, "renamed");
        assert_eq!(device.interface_count(), 1);
    }

    #[test]
    fn snapshots_are_versioned_and_immutable() {
        let (store, _) = store();
        store.apply(&capture(1, "a"));
        let before = store.snapshot();

        store.apply(&capture(2, "b"));

        assert_eq!(before.devices().len(), 1);
        assert!(store.version() > before.version());
        assert_eq!(store.index_of(2), Some(1));

        store.clear();
        assert_eq!(store.device_count(), 0);
        assert_eq!(store.device_status(0), None);
    }

    #[test]
    fn status_message_without_status_payload_is_counted() {
        let (store, counters) = store();
        store.apply(&capture(1, "logger"));
        let version = store.version();
        let mut message = CmpMessage::data(
            RouteKey::new(1, 0, 0),
            0,
            Payload::Analog { samples: vec![1] },
        );
        message.message_class = MessageClass::Status;

        assert_eq!(store.apply(&message), None);
        assert_eq!(counters.snapshot().unsupported_status_payload, 1);
        assert_eq!(store.version(), version);
    }
}
