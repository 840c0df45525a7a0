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

//! Capture-module → interface → stream tree and its routing subscriptions.
//!
//! Every mutation runs under one tree lock and performs its route-table
//! (un)subscriptions while holding it, so the subscriptions always mirror the
//! tree. Lock order is tree first, route tables second; route tables never call
//! back into the synchronizer.

use crate::control_plane::edits::{EditError, EditOutcome, UpdateReport, UpdateState};
use crate::control_plane::handles::{
    CaptureModuleHandle, InterfaceHandle, NodeHandle, StreamHandle,
};
use crate::control_plane::id_allocator::{IdAllocator, IdError};
use crate::control_plane::object_handlers::{CaptureModuleHandler, SampleSink, StreamHandler};
use crate::control_plane::payload_kind_table::{
    payload_kind_for_selection, selection_index_of, selection_labels,
};
use crate::message::{CaptureModuleInfo, DeviceId, InterfaceId, PayloadKind, StreamId};
use crate::observability::counters::DropCounters;
use crate::observability::events;
use crate::routing::handler::MessageHandler;
use crate::routing::route_key::RouteKey;
use crate::routing::route_table::{DeviceRouteTable, RouteTable};
use crate::status::snapshot::{DeviceStatus, InterfaceStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const COMPONENT: &str = "topology";

/// Structural failures of topology mutations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TopologyError {
    UnknownCaptureModule(CaptureModuleHandle),
    UnknownInterface(InterfaceHandle),
    UnknownStream(StreamHandle),
    IndexOutOfRange { index: usize, len: usize },
    /// Children cannot be added or removed while the parent is being updated.
    UpdateInProgress(NodeHandle),
    NoUpdateInProgress(NodeHandle),
    Id(IdError),
}

impl Display for TopologyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::UnknownCaptureModule(handle) => write!(f, "unknown {handle}"),
            TopologyError::UnknownInterface(handle) => write!(f, "unknown {handle}"),
            TopologyError::UnknownStream(handle) => write!(f, "unknown {handle}"),
            TopologyError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} children")
            }
            TopologyError::UpdateInProgress(handle) => {
                write!(f, "{handle} is being updated")
            }
            TopologyError::NoUpdateInProgress(handle) => {
                write!(f, "{handle} has no open update")
            }
            TopologyError::Id(err) => write!(f, "identifier allocation failed: {err}"),
        }
    }
}

impl Error for TopologyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TopologyError::Id(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IdError> for TopologyError {
    fn from(err: IdError) -> Self {
        TopologyError::Id(err)
    }
}

/// Children a snapshot added to an existing or new capture module.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GrowthSummary {
    pub interfaces_added: usize,
    pub streams_added: usize,
}

impl GrowthSummary {
    pub fn is_empty(&self) -> bool {
        self.interfaces_added == 0 && self.streams_added == 0
    }
}

struct StreamNode {
    handle: StreamHandle,
    stream_id: StreamId,
    handler: Arc<StreamHandler>,
    update: UpdateState,
}

impl StreamNode {
    fn as_handler(&self) -> Arc<dyn MessageHandler> {
        self.handler.clone()
    }
}

struct InterfaceNode {
    handle: InterfaceHandle,
    interface_id: InterfaceId,
    payload_kind: PayloadKind,
    stream_ids: IdAllocator<StreamId>,
    streams: Vec<StreamNode>,
    update: UpdateState,
}

struct CaptureModuleNode {
    handle: CaptureModuleHandle,
    device_id: DeviceId,
    handler: Arc<CaptureModuleHandler>,
    interface_ids: IdAllocator<InterfaceId>,
    interfaces: Vec<InterfaceNode>,
    update: UpdateState,
}

impl CaptureModuleNode {
    fn as_handler(&self) -> Arc<dyn MessageHandler> {
        self.handler.clone()
    }
}

#[derive(Default)]
struct TopologyTree {
    modules: Vec<CaptureModuleNode>,
    device_ids: IdAllocator<DeviceId>,
}

impl TopologyTree {
    fn module_index(&self, handle: CaptureModuleHandle) -> Result<usize, TopologyError> {
        self.modules
            .iter()
            .position(|module| module.handle == handle)
            .ok_or(TopologyError::UnknownCaptureModule(handle))
    }

    fn locate_interface(&self, handle: InterfaceHandle) -> Result<(usize, usize), TopologyError> {
        self.modules
            .iter()
            .enumerate()
            .find_map(|(m, module)| {
                module
                    .interfaces
                    .iter()
                    .position(|interface| interface.handle == handle)
                    .map(|i| (m, i))
            })
            .ok_or(TopologyError::UnknownInterface(handle))
    }

    fn locate_stream(&self, handle: StreamHandle) -> Result<(usize, usize, usize), TopologyError> {
        for (m, module) in self.modules.iter().enumerate() {
            for (i, interface) in module.interfaces.iter().enumerate() {
                if let Some(s) = interface
                    .streams
                    .iter()
                    .position(|stream| stream.handle == handle)
                {
                    return Ok((m, i, s));
                }
            }
        }
        Err(TopologyError::UnknownStream(handle))
    }

    fn update_state_mut(&mut self, node: NodeHandle) -> Result<&mut UpdateState, TopologyError> {
        Ok(match node {
            NodeHandle::CaptureModule(handle) => {
                let m = self.module_index(handle)?;
                &mut self.modules[m].update
            }
            NodeHandle::Interface(handle) => {
                let (m, i) = self.locate_interface(handle)?;
                &mut self.modules[m].interfaces[i].update
            }
            NodeHandle::Stream(handle) => {
                let (m, i, s) = self.locate_stream(handle)?;
                &mut self.modules[m].interfaces[i].streams[s].update
            }
        })
    }
}

/// Owner of the local topology mirror and its route-table subscriptions.
pub struct TopologySynchronizer {
    tree: Mutex<TopologyTree>,
    next_handle: AtomicU64,
    route_table: Arc<RouteTable>,
    device_route_table: Arc<DeviceRouteTable>,
    sample_sink: Arc<dyn SampleSink>,
    counters: Arc<DropCounters>,
}

impl TopologySynchronizer {
    pub fn new(
        route_table: Arc<RouteTable>,
        device_route_table: Arc<DeviceRouteTable>,
        sample_sink: Arc<dyn SampleSink>,
        counters: Arc<DropCounters>,
    ) -> Self {
        Self {
            tree: Mutex::new(TopologyTree::default()),
            next_handle: AtomicU64::new(1),
            route_table,
            device_route_table,
            sample_sink,
            counters,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TopologyTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn build_stream(
        &self,
        device_id: DeviceId,
        interface_id: InterfaceId,
        stream_id: StreamId,
        payload_kind: PayloadKind,
    ) -> StreamNode {
        let handle = StreamHandle(self.next_handle());
        let handler = Arc::new(StreamHandler::new(
            handle,
            payload_kind,
            self.sample_sink.clone(),
            self.counters.clone(),
        ));
        let node = StreamNode {
            handle,
            stream_id,
            handler,
            update: UpdateState::default(),
        };
        let key = RouteKey::new(device_id, interface_id, stream_id);
        self.route_table.subscribe(key, &node.as_handler());
        debug!(
            event = events::TOPOLOGY_STREAM_ADD,
            component = COMPONENT,
            stream = %handle,
            route_key = %key,
            "stream added"
        );
        node
    }

    fn build_interface(&self, device_id: DeviceId, status: &InterfaceStatus) -> InterfaceNode {
        let payload_kind = if status.interface_type().is_data_kind() {
            status.interface_type()
        } else {
            PayloadKind::Undefined
        };

        let mut node = InterfaceNode {
            handle: InterfaceHandle(self.next_handle()),
            interface_id: status.interface_id,
            payload_kind,
            stream_ids: IdAllocator::new(),
            streams: Vec::with_capacity(status.stream_ids().len()),
            update: UpdateState::default(),
        };
        for &stream_id in status.stream_ids() {
            if node.stream_ids.add(stream_id).is_ok() {
                let stream = self.build_stream(device_id, node.interface_id, stream_id, payload_kind);
                node.streams.push(stream);
            }
        }
        debug!(
            event = events::TOPOLOGY_INTERFACE_ADD,
            component = COMPONENT,
            interface = %node.handle,
            device_id,
            interface_id = node.interface_id,
            payload_kind = %payload_kind,
            streams = node.streams.len(),
            "interface added from snapshot"
        );
        node
    }

    fn build_capture_module(&self, device_id: DeviceId, info: CaptureModuleInfo) -> CaptureModuleNode {
        let node = CaptureModuleNode {
            handle: CaptureModuleHandle(self.next_handle()),
            device_id,
            handler: Arc::new(CaptureModuleHandler::new(info)),
            interface_ids: IdAllocator::new(),
            interfaces: Vec::new(),
            update: UpdateState::default(),
        };
        self.device_route_table
            .subscribe(device_id, &node.as_handler());
        node
    }

    fn detach_interface(&self, device_id: DeviceId, interface: &InterfaceNode) {
        for stream in &interface.streams {
            let key = RouteKey::new(device_id, interface.interface_id, stream.stream_id);
            self.route_table.unsubscribe(key, &stream.as_handler());
        }
    }

    fn detach_capture_module(&self, module: &CaptureModuleNode) {
        self.device_route_table
            .unsubscribe(module.device_id, &module.as_handler());
        for interface in &module.interfaces {
            self.detach_interface(module.device_id, interface);
        }
    }

    // New key is subscribed before the old one is released so no message
    // addressed to either key falls through during the switch.
    fn rekey_stream(&self, old_key: RouteKey, new_key: RouteKey, stream: &StreamNode) {
        let handler = stream.as_handler();
        self.route_table.subscribe(new_key, &handler);
        self.route_table.unsubscribe(old_key, &handler);
    }

    fn grow_capture_module(
        &self,
        module: &mut CaptureModuleNode,
        status: &DeviceStatus,
    ) -> GrowthSummary {
        module.handler.set_info(status.capture_module.clone());

        let device_id = module.device_id;
        let mut summary = GrowthSummary::default();
        for interface_status in &status.interfaces {
            match module
                .interfaces
                .iter_mut()
                .find(|interface| interface.interface_id == interface_status.interface_id)
            {
                Some(interface) => {
                    for &stream_id in interface_status.stream_ids() {
                        if interface.stream_ids.add(stream_id).is_err() {
                            continue;
                        }
                        let stream = self.build_stream(
                            device_id,
                            interface.interface_id,
                            stream_id,
                            interface.payload_kind,
                        );
                        interface.streams.push(stream);
                        summary.streams_added += 1;
                    }
                }
                None => {
                    if module
                        .interface_ids
                        .add(interface_status.interface_id)
                        .is_err()
                    {
                        continue;
                    }
                    let interface = self.build_interface(device_id, interface_status);
                    summary.interfaces_added += 1;
                    summary.streams_added += interface.streams.len();
                    module.interfaces.push(interface);
                }
            }
        }
        summary
    }

    /// Creates a capture module with the smallest free device id and no children.
    pub fn add_capture_module_empty(&self) -> Result<CaptureModuleHandle, TopologyError> {
        let mut tree = self.lock();
        let device_id = tree.device_ids.allocate()?;
        let module = self.build_capture_module(device_id, CaptureModuleInfo::default());
        let handle = module.handle;
        tree.modules.push(module);

        info!(
            event = events::TOPOLOGY_CAPTURE_MODULE_ADD,
            component = COMPONENT,
            capture_module = %handle,
            device_id,
            source = "empty",
            "capture module added"
        );
        Ok(handle)
    }

    /// Materializes the capture module described by `status`.
    ///
    /// When a capture module with the same device id already exists, the
    /// snapshot is applied to it as a refresh and its handle is returned.
    pub fn add_capture_module_from_status(
        &self,
        status: &DeviceStatus,
    ) -> Result<CaptureModuleHandle, TopologyError> {
        let mut tree = self.lock();
        if let Some(index) = tree
            .modules
            .iter()
            .position(|module| module.device_id == status.device_id)
        {
            let module = &mut tree.modules[index];
            let summary = self.grow_capture_module(module, status);
            Self::log_growth(module, summary);
            return Ok(module.handle);
        }

        tree.device_ids.add(status.device_id)?;
        let mut module = self.build_capture_module(status.device_id, status.capture_module.clone());
        let summary = self.grow_capture_module(&mut module, status);
        let handle = module.handle;
        tree.modules.push(module);

        info!(
            event = events::TOPOLOGY_CAPTURE_MODULE_ADD,
            component = COMPONENT,
            capture_module = %handle,
            device_id = status.device_id,
            source = "status",
            interfaces = summary.interfaces_added,
            streams = summary.streams_added,
            "capture module added"
        );
        Ok(handle)
    }

    /// Applies a newer snapshot to the materialized capture module of its device.
    ///
    /// Only unseen ids are added; nothing is removed. Returns `None` when no
    /// capture module for the device exists.
    pub fn refresh_from_status(&self, status: &DeviceStatus) -> Option<GrowthSummary> {
        let mut tree = self.lock();
        let module = tree
            .modules
            .iter_mut()
            .find(|module| module.device_id == status.device_id)?;
        let summary = self.grow_capture_module(module, status);
        Self::log_growth(module, summary);
        Some(summary)
    }

    fn log_growth(module: &CaptureModuleNode, summary: GrowthSummary) {
        if !summary.is_empty() {
            info!(
                event = events::TOPOLOGY_REFRESH,
                component = COMPONENT,
                capture_module = %module.handle,
                device_id = module.device_id,
                interfaces = summary.interfaces_added,
                streams = summary.streams_added,
                "capture module grew from status"
            );
        }
    }

    /// Removes the capture module at `index` together with all its children.
    pub fn remove_capture_module(&self, index: usize) -> Result<(), TopologyError> {
        let mut tree = self.lock();
        let len = tree.modules.len();
        if index >= len {
            return Err(TopologyError::IndexOutOfRange { index, len });
        }

        let module = tree.modules.remove(index);
        self.detach_capture_module(&module);
        tree.device_ids.remove(module.device_id);

        info!(
            event = events::TOPOLOGY_CAPTURE_MODULE_REMOVE,
            component = COMPONENT,
            capture_module = %module.handle,
            device_id = module.device_id,
            "capture module removed"
        );
        Ok(())
    }

    /// Adds an empty interface with the smallest free id of `capture_module`.
    pub fn create_interface(
        &self,
        capture_module: CaptureModuleHandle,
    ) -> Result<(InterfaceHandle, InterfaceId), TopologyError> {
        let mut tree = self.lock();
        let m = tree.module_index(capture_module)?;
        let module = &mut tree.modules[m];
        if module.update.is_open() {
            return Err(TopologyError::UpdateInProgress(capture_module.into()));
        }

        let interface_id = module.interface_ids.allocate()?;
        let handle = InterfaceHandle(self.next_handle());
        module.interfaces.push(InterfaceNode {
            handle,
            interface_id,
            payload_kind: PayloadKind::Undefined,
            stream_ids: IdAllocator::new(),
            streams: Vec::new(),
            update: UpdateState::default(),
        });

        info!(
            event = events::TOPOLOGY_INTERFACE_ADD,
            component = COMPONENT,
            interface = %handle,
            device_id = module.device_id,
            interface_id,
            "interface added"
        );
        Ok((handle, interface_id))
    }

    /// Removes the interface at `index` of `capture_module` and its streams.
    pub fn remove_interface(
        &self,
        capture_module: CaptureModuleHandle,
        index: usize,
    ) -> Result<(), TopologyError> {
        let mut tree = self.lock();
        let m = tree.module_index(capture_module)?;
        let module = &mut tree.modules[m];
        if module.update.is_open() {
            return Err(TopologyError::UpdateInProgress(capture_module.into()));
        }
        let len = module.interfaces.len();
        if index >= len {
            return Err(TopologyError::IndexOutOfRange { index, len });
        }

        let interface = module.interfaces.remove(index);
        self.detach_interface(module.device_id, &interface);
        module.interface_ids.remove(interface.interface_id);

        info!(
            event = events::TOPOLOGY_INTERFACE_REMOVE,
            component = COMPONENT,
            interface = %interface.handle,
            device_id = module.device_id,
            interface_id = interface.interface_id,
            "interface removed"
        );
        Ok(())
    }

    /// Adds a stream with the smallest free id of `interface` and subscribes it.
    pub fn create_stream(
        &self,
        interface: InterfaceHandle,
    ) -> Result<(StreamHandle, StreamId), TopologyError> {
        let mut tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        let module = &mut tree.modules[m];
        let device_id = module.device_id;
        let node = &mut module.interfaces[i];
        if node.update.is_open() {
            return Err(TopologyError::UpdateInProgress(interface.into()));
        }

        let stream_id = node.stream_ids.allocate()?;
        let stream = self.build_stream(device_id, node.interface_id, stream_id, node.payload_kind);
        let handle = stream.handle;
        node.streams.push(stream);
        Ok((handle, stream_id))
    }

    /// Removes the stream at `index` of `interface` and unsubscribes it.
    pub fn remove_stream(&self, interface: InterfaceHandle, index: usize) -> Result<(), TopologyError> {
        let mut tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        let module = &mut tree.modules[m];
        let device_id = module.device_id;
        let node = &mut module.interfaces[i];
        if node.update.is_open() {
            return Err(TopologyError::UpdateInProgress(interface.into()));
        }
        let len = node.streams.len();
        if index >= len {
            return Err(TopologyError::IndexOutOfRange { index, len });
        }

        let stream = node.streams.remove(index);
        let key = RouteKey::new(device_id, node.interface_id, stream.stream_id);
        self.route_table.unsubscribe(key, &stream.as_handler());
        node.stream_ids.remove(stream.stream_id);

        debug!(
            event = events::TOPOLOGY_STREAM_REMOVE,
            component = COMPONENT,
            stream = %stream.handle,
            route_key = %key,
            "stream removed"
        );
        Ok(())
    }

    fn log_deferred(node: NodeHandle, property: &'static str, raw: u64) {
        debug!(
            event = events::TOPOLOGY_EDIT_DEFERRED,
            component = COMPONENT,
            node = %node,
            property,
            value = raw,
            "edit deferred until update ends"
        );
    }

    fn rejected(node: NodeHandle, property: &'static str, raw: u64, err: EditError) -> EditOutcome {
        warn!(
            event = events::TOPOLOGY_ID_REJECTED,
            component = COMPONENT,
            node = %node,
            property,
            value = raw,
            err = %err,
            "edit rejected; keeping previous value"
        );
        EditOutcome::Rejected(err)
    }

    fn log_migrated(node: NodeHandle, property: &'static str, old: u64, new: u64) {
        info!(
            event = events::TOPOLOGY_ID_MIGRATED,
            component = COMPONENT,
            node = %node,
            property,
            old,
            new,
            "identifier migrated"
        );
    }

    fn migrate_device_id(&self, tree: &mut TopologyTree, m: usize, raw: u64) -> EditOutcome {
        let node = NodeHandle::from(tree.modules[m].handle);
        let current = tree.modules[m].device_id;
        if raw == u64::from(current) {
            return EditOutcome::Unchanged;
        }

        let new_id = match tree.device_ids.validate(raw) {
            Ok(id) => id,
            Err(err) => return Self::rejected(node, "device_id", raw, err.into()),
        };
        if let Err(err) = tree.device_ids.add(new_id) {
            return Self::rejected(node, "device_id", raw, err.into());
        }
        tree.device_ids.remove(current);

        let module = &mut tree.modules[m];
        let handler = module.as_handler();
        self.device_route_table.subscribe(new_id, &handler);
        self.device_route_table.unsubscribe(current, &handler);
        for interface in &module.interfaces {
            for stream in &interface.streams {
                let old_key = RouteKey::new(current, interface.interface_id, stream.stream_id);
                self.rekey_stream(old_key, old_key.with_device(new_id), stream);
            }
        }
        module.device_id = new_id;

        Self::log_migrated(node, "device_id", u64::from(current), raw);
        EditOutcome::Applied
    }

    fn migrate_interface_id(
        &self,
        tree: &mut TopologyTree,
        m: usize,
        i: usize,
        raw: u64,
    ) -> EditOutcome {
        let module = &mut tree.modules[m];
        let device_id = module.device_id;
        let node = NodeHandle::from(module.interfaces[i].handle);
        let current = module.interfaces[i].interface_id;
        if raw == u64::from(current) {
            return EditOutcome::Unchanged;
        }

        let new_id = match module.interface_ids.validate(raw) {
            Ok(id) => id,
            Err(err) => return Self::rejected(node, "interface_id", raw, err.into()),
        };
        if let Err(err) = module.interface_ids.add(new_id) {
            return Self::rejected(node, "interface_id", raw, err.into());
        }
        module.interface_ids.remove(current);

        let interface = &mut module.interfaces[i];
        for stream in &interface.streams {
            let old_key = RouteKey::new(device_id, current, stream.stream_id);
            self.rekey_stream(old_key, old_key.with_interface(new_id), stream);
        }
        interface.interface_id = new_id;

        Self::log_migrated(node, "interface_id", u64::from(current), raw);
        EditOutcome::Applied
    }

    fn migrate_stream_id(
        &self,
        tree: &mut TopologyTree,
        m: usize,
        i: usize,
        s: usize,
        raw: u64,
    ) -> EditOutcome {
        let module = &mut tree.modules[m];
        let device_id = module.device_id;
        let interface = &mut module.interfaces[i];
        let node = NodeHandle::from(interface.streams[s].handle);
        let current = interface.streams[s].stream_id;
        if raw == u64::from(current) {
            return EditOutcome::Unchanged;
        }

        let new_id = match interface.stream_ids.validate(raw) {
            Ok(id) => id,
            Err(err) => return Self::rejected(node, "stream_id", raw, err.into()),
        };
        if let Err(err) = interface.stream_ids.add(new_id) {
            return Self::rejected(node, "stream_id", raw, err.into());
        }
        interface.stream_ids.remove(current);

        let old_key = RouteKey::new(device_id, interface.interface_id, current);
        let stream = &mut interface.streams[s];
        self.rekey_stream(old_key, old_key.with_stream(new_id), stream);
        stream.stream_id = new_id;

        Self::log_migrated(node, "stream_id", u64::from(current), raw);
        EditOutcome::Applied
    }

    fn apply_payload_kind(interface: &mut InterfaceNode, selection: u64) -> EditOutcome {
        let Some(kind) = payload_kind_for_selection(selection) else {
            return Self::rejected(
                interface.handle.into(),
                "payload_kind",
                selection,
                EditError::PayloadKindSelection(selection),
            );
        };
        if kind == interface.payload_kind {
            return EditOutcome::Unchanged;
        }

        interface.payload_kind = kind;
        for stream in &interface.streams {
            stream.handler.set_payload_kind(kind);
        }
        info!(
            event = events::TOPOLOGY_PAYLOAD_KIND_CHANGED,
            component = COMPONENT,
            interface = %interface.handle,
            interface_id = interface.interface_id,
            payload_kind = %kind,
            "interface payload kind changed"
        );
        EditOutcome::Applied
    }

    /// Moves a capture module and every descendant stream to a new device id.
    pub fn set_device_id(
        &self,
        capture_module: CaptureModuleHandle,
        raw: u64,
    ) -> Result<EditOutcome, TopologyError> {
        let mut tree = self.lock();
        let m = tree.module_index(capture_module)?;
        if tree.modules[m].update.is_open() {
            tree.modules[m].update.defer_id(raw);
            Self::log_deferred(capture_module.into(), "device_id", raw);
            return Ok(EditOutcome::Deferred);
        }
        Ok(self.migrate_device_id(&mut tree, m, raw))
    }

    /// Moves an interface and its streams to a new interface id.
    pub fn set_interface_id(
        &self,
        interface: InterfaceHandle,
        raw: u64,
    ) -> Result<EditOutcome, TopologyError> {
        let mut tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        let state = &mut tree.modules[m].interfaces[i].update;
        if state.is_open() {
            state.defer_id(raw);
            Self::log_deferred(interface.into(), "interface_id", raw);
            return Ok(EditOutcome::Deferred);
        }
        Ok(self.migrate_interface_id(&mut tree, m, i, raw))
    }

    /// Moves a stream to a new stream id.
    pub fn set_stream_id(&self, stream: StreamHandle, raw: u64) -> Result<EditOutcome, TopologyError> {
        let mut tree = self.lock();
        let (m, i, s) = tree.locate_stream(stream)?;
        let state = &mut tree.modules[m].interfaces[i].streams[s].update;
        if state.is_open() {
            state.defer_id(raw);
            Self::log_deferred(stream.into(), "stream_id", raw);
            return Ok(EditOutcome::Deferred);
        }
        Ok(self.migrate_stream_id(&mut tree, m, i, s, raw))
    }

    /// Selects the payload kind of an interface by selection index and pushes it
    /// to every stream of the interface.
    pub fn set_interface_payload_kind(
        &self,
        interface: InterfaceHandle,
        selection: u64,
    ) -> Result<EditOutcome, TopologyError> {
        let mut tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        let node = &mut tree.modules[m].interfaces[i];
        if node.update.is_open() {
            node.update.defer_payload_kind(selection);
            Self::log_deferred(interface.into(), "payload_kind", selection);
            return Ok(EditOutcome::Deferred);
        }
        Ok(Self::apply_payload_kind(node, selection))
    }

    /// Opens an update bracket on `node`. Edits are deferred until it closes.
    ///
    /// Brackets do not nest: opening a second one on the same node fails
    /// with `UpdateInProgress` and leaves the open bracket untouched.
    pub fn begin_update(&self, node: impl Into<NodeHandle>) -> Result<(), TopologyError> {
        let node = node.into();
        let mut tree = self.lock();
        let state = tree.update_state_mut(node)?;
        if state.is_open() {
            return Err(TopologyError::UpdateInProgress(node));
        }
        state.open();
        Ok(())
    }

    /// Closes the update bracket on `node` and applies the deferred edits.
    ///
    /// Each edit is validated on its own; a rejected edit leaves its property
    /// unchanged without affecting the others.
    pub fn end_update(&self, node: impl Into<NodeHandle>) -> Result<UpdateReport, TopologyError> {
        let node = node.into();
        let mut tree = self.lock();
        let state = tree.update_state_mut(node)?;
        if !state.is_open() {
            return Err(TopologyError::NoUpdateInProgress(node));
        }
        let (pending_id, pending_payload_kind) = state.close();

        let mut report = UpdateReport::default();
        match node {
            NodeHandle::CaptureModule(handle) => {
                let m = tree.module_index(handle)?;
                report.id = pending_id.map(|raw| self.migrate_device_id(&mut tree, m, raw));
            }
            NodeHandle::Interface(handle) => {
                let (m, i) = tree.locate_interface(handle)?;
                report.id = pending_id.map(|raw| self.migrate_interface_id(&mut tree, m, i, raw));
                report.payload_kind = pending_payload_kind.map(|selection| {
                    Self::apply_payload_kind(&mut tree.modules[m].interfaces[i], selection)
                });
            }
            NodeHandle::Stream(handle) => {
                let (m, i, s) = tree.locate_stream(handle)?;
                report.id = pending_id.map(|raw| self.migrate_stream_id(&mut tree, m, i, s, raw));
            }
        }
        Ok(report)
    }

    pub fn is_updating(&self, node: impl Into<NodeHandle>) -> Result<bool, TopologyError> {
        let mut tree = self.lock();
        Ok(tree.update_state_mut(node.into())?.is_open())
    }

    pub fn capture_modules(&self) -> Vec<CaptureModuleHandle> {
        self.lock().modules.iter().map(|module| module.handle).collect()
    }

    pub fn capture_module_count(&self) -> usize {
        self.lock().modules.len()
    }

    pub fn find_capture_module(&self, device_id: DeviceId) -> Option<CaptureModuleHandle> {
        self.lock()
            .modules
            .iter()
            .find(|module| module.device_id == device_id)
            .map(|module| module.handle)
    }

    pub fn device_id(&self, capture_module: CaptureModuleHandle) -> Result<DeviceId, TopologyError> {
        let tree = self.lock();
        let m = tree.module_index(capture_module)?;
        Ok(tree.modules[m].device_id)
    }

    /// Last device info reported for the capture module.
    pub fn device_info(
        &self,
        capture_module: CaptureModuleHandle,
    ) -> Result<CaptureModuleInfo, TopologyError> {
        let tree = self.lock();
        let m = tree.module_index(capture_module)?;
        Ok(tree.modules[m].handler.info())
    }

    pub fn interfaces(
        &self,
        capture_module: CaptureModuleHandle,
    ) -> Result<Vec<InterfaceHandle>, TopologyError> {
        let tree = self.lock();
        let m = tree.module_index(capture_module)?;
        Ok(tree.modules[m]
            .interfaces
            .iter()
            .map(|interface| interface.handle)
            .collect())
    }

    pub fn interface_id(&self, interface: InterfaceHandle) -> Result<InterfaceId, TopologyError> {
        let tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        Ok(tree.modules[m].interfaces[i].interface_id)
    }

    pub fn interface_payload_kind(
        &self,
        interface: InterfaceHandle,
    ) -> Result<PayloadKind, TopologyError> {
        let tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        Ok(tree.modules[m].interfaces[i].payload_kind)
    }

    /// Selection index of the interface's current payload kind, `None` when
    /// the kind is not selectable.
    pub fn interface_payload_kind_selection(
        &self,
        interface: InterfaceHandle,
    ) -> Result<Option<u64>, TopologyError> {
        self.interface_payload_kind(interface)
            .map(selection_index_of)
    }

    /// Labels of the selectable payload kinds, indexed by selection.
    pub fn payload_kind_selection_labels() -> Vec<&'static str> {
        selection_labels()
    }

    pub fn streams(&self, interface: InterfaceHandle) -> Result<Vec<StreamHandle>, TopologyError> {
        let tree = self.lock();
        let (m, i) = tree.locate_interface(interface)?;
        Ok(tree.modules[m].interfaces[i]
            .streams
            .iter()
            .map(|stream| stream.handle)
            .collect())
    }

    pub fn stream_id(&self, stream: StreamHandle) -> Result<StreamId, TopologyError> {
        let tree = self.lock();
        let (m, i, s) = tree.locate_stream(stream)?;
        Ok(tree.modules[m].interfaces[i].streams[s].stream_id)
    }

    /// Current routing key of `stream`, recomputed from the tree.
    pub fn stream_route_key(&self, stream: StreamHandle) -> Result<RouteKey, TopologyError> {
        let tree = self.lock();
        let (m, i, s) = tree.locate_stream(stream)?;
        let module = &tree.modules[m];
        let interface = &module.interfaces[i];
        Ok(RouteKey::new(
            module.device_id,
            interface.interface_id,
            interface.streams[s].stream_id,
        ))
    }

    pub fn stream_payload_kind(&self, stream: StreamHandle) -> Result<PayloadKind, TopologyError> {
        let tree = self.lock();
        let (m, i, s) = tree.locate_stream(stream)?;
        Ok(tree.modules[m].interfaces[i].streams[s].handler.payload_kind())
    }

    /// Every stream key currently present in the tree.
    pub fn route_keys(&self) -> Vec<RouteKey> {
        let tree = self.lock();
        tree.modules
            .iter()
            .flat_map(|module| {
                module.interfaces.iter().flat_map(move |interface| {
                    interface.streams.iter().map(move |stream| {
                        RouteKey::new(module.device_id, interface.interface_id, stream.stream_id)
                    })
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{GrowthSummary, TopologyError, TopologySynchronizer};
    use crate::control_plane::edits::{EditError, EditOutcome};
    use crate::control_plane::handles::{NodeHandle, StreamHandle};
    use crate::control_plane::id_allocator::IdError;
    use crate::control_plane::object_handlers::SampleSink;
    use crate::message::{CaptureModuleInfo, CmpMessage, Payload, PayloadKind};
    use crate::observability::counters::DropCounters;
    use crate::routing::route_key::RouteKey;
    use crate::routing::route_table::{DeviceRouteTable, RouteTable};
    use crate::status::snapshot::{DeviceStatus, InterfaceStatus};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        deliveries: Mutex<Vec<(StreamHandle, usize)>>,
    }

    impl RecordingSink {
        fn deliveries(&self) -> Vec<(StreamHandle, usize)> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    impl SampleSink for RecordingSink {
        fn on_samples(&self, stream: StreamHandle, messages: &[Arc<CmpMessage>]) {
            self.deliveries.lock().unwrap().push((stream, messages.len()));
        }
    }

    struct Fixture {
        topology: TopologySynchronizer,
        route_table: Arc<RouteTable>,
        device_route_table: Arc<DeviceRouteTable>,
        sink: Arc<RecordingSink>,
    }

    fn fixture() -> Fixture {
        let counters = Arc::new(DropCounters::new());
        let route_table = Arc::new(RouteTable::new("streams", counters.clone()));
        let device_route_table = Arc::new(DeviceRouteTable::new("devices", counters.clone()));
        let sink = Arc::new(RecordingSink::default());
        let topology = TopologySynchronizer::new(
            route_table.clone(),
            device_route_table.clone(),
            sink.clone(),
            counters,
        );
        Fixture {
            topology,
            route_table,
            device_route_table,
            sink,
        }
    }

    fn can_at(key: RouteKey) -> Arc<CmpMessage> {
        Arc::new(CmpMessage::data(
            key,
            0,
            Payload::Can {
                can_id: 1,
                data: vec![0],
            },
        ))
    }

    fn device(device_id: u16, interfaces: Vec<InterfaceStatus>) -> DeviceStatus {
        DeviceStatus {
            device_id,
            capture_module: CaptureModuleInfo {
                device_description: format!("device {device_id}"),
                ..Default::default()
            },
            interfaces,
        }
    }

    #[test]
    fn empty_capture_modules_take_smallest_free_device_id() {
        let f = fixture();
        let first = f.topology.add_capture_module_empty().unwrap();
        let second = f.topology.add_capture_module_empty().unwrap();

        assert_eq!(f.topology.device_id(first), Ok(0));
        assert_eq!(f.topology.device_id(second), Ok(1));
        assert_eq!(f.device_route_table.subscriber_count(0), 1);

        f.topology.remove_capture_module(0).unwrap();
        let third = f.topology.add_capture_module_empty().unwrap();
        assert_eq!(f.topology.device_id(third), Ok(0));
    }

    #[test]
    fn created_streams_are_routed_to_the_sample_sink() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, interface_id) = f.topology.create_interface(module).unwrap();
        assert_eq!(interface_id, 0);
        assert!(f
            .topology
            .set_interface_payload_kind(interface, 1)
            .unwrap()
            .is_applied());

        let (first, first_id) = f.topology.create_stream(interface).unwrap();
        let (_, second_id) = f.topology.create_stream(interface).unwrap();
        assert_eq!((first_id, second_id), (0, 1));
        assert_eq!(f.topology.stream_payload_kind(first), Ok(PayloadKind::Can));

        let key = f.topology.stream_route_key(first).unwrap();
        assert_eq!(key, RouteKey::new(0, 0, 0));
        assert_eq!(f.route_table.publish(key, &can_at(key)), 1);
        assert_eq!(f.sink.deliveries(), vec![(first, 1)]);
    }

    #[test]
    fn remove_interface_unsubscribes_its_streams_and_frees_the_id() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, _) = f.topology.create_interface(module).unwrap();
        f.topology.create_stream(interface).unwrap();
        f.topology.create_stream(interface).unwrap();
        assert_eq!(f.route_table.key_count(), 2);

        f.topology.remove_interface(module, 0).unwrap();

        assert!(f.route_table.is_empty());
        assert_eq!(f.topology.streams(interface), Err(TopologyError::UnknownInterface(interface)));
        assert_eq!(f.topology.create_interface(module).unwrap().1, 0);
        assert_eq!(
            f.topology.remove_interface(module, 5),
            Err(TopologyError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn remove_capture_module_cascades_to_all_subscriptions() {
        let f = fixture();
        f.topology
            .add_capture_module_from_status(&device(
                4,
                vec![
                    InterfaceStatus::new(0, PayloadKind::Can, vec![0, 1]),
                    InterfaceStatus::new(1, PayloadKind::Analog, vec![0]),
                ],
            ))
            .unwrap();
        assert_eq!(f.route_table.key_count(), 3);

        f.topology.remove_capture_module(0).unwrap();

        assert!(f.route_table.is_empty());
        assert!(f.device_route_table.is_empty());
        assert_eq!(f.topology.capture_module_count(), 0);
    }

    #[test]
    fn stream_migration_moves_delivery_to_the_new_key() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                5,
                vec![InterfaceStatus::new(10, PayloadKind::Can, vec![20])],
            ))
            .unwrap();
        let interface = f.topology.interfaces(module).unwrap()[0];
        let stream = f.topology.streams(interface).unwrap()[0];
        let old_key = RouteKey::new(5, 10, 20);
        let new_key = RouteKey::new(5, 10, 21);

        assert_eq!(f.topology.set_stream_id(stream, 21), Ok(EditOutcome::Applied));

        assert_eq!(f.route_table.publish(old_key, &can_at(old_key)), 0);
        assert_eq!(f.route_table.publish(new_key, &can_at(new_key)), 1);
        assert_eq!(f.sink.deliveries(), vec![(stream, 1)]);
        assert_eq!(f.topology.stream_route_key(stream), Ok(new_key));
    }

    #[test]
    fn interface_migration_onto_sibling_id_is_rejected_without_side_effects() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![
                    InterfaceStatus::new(0, PayloadKind::Can, vec![0]),
                    InterfaceStatus::new(1, PayloadKind::Can, vec![0]),
                ],
            ))
            .unwrap();
        let interfaces = f.topology.interfaces(module).unwrap();

        let outcome = f.topology.set_interface_id(interfaces[1], 0).unwrap();

        assert_eq!(
            outcome,
            EditOutcome::Rejected(EditError::Id(IdError::DuplicateId(0)))
        );
        assert_eq!(f.topology.interface_id(interfaces[1]), Ok(1));
        assert_eq!(f.route_table.subscriber_count(RouteKey::new(1, 0, 0)), 1);
        assert_eq!(f.route_table.subscriber_count(RouteKey::new(1, 1, 0)), 1);
    }

    #[test]
    fn out_of_range_stream_id_is_rejected() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, _) = f.topology.create_interface(module).unwrap();
        let (stream, _) = f.topology.create_stream(interface).unwrap();

        assert_eq!(
            f.topology.set_stream_id(stream, 256),
            Ok(EditOutcome::Rejected(EditError::Id(IdError::InvalidRange(256))))
        );
        assert_eq!(f.topology.set_stream_id(stream, 0), Ok(EditOutcome::Unchanged));
        assert_eq!(f.topology.stream_id(stream), Ok(0));
    }

    #[test]
    fn device_migration_rekeys_every_descendant_stream() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                2,
                vec![
                    InterfaceStatus::new(0, PayloadKind::Can, vec![0, 1]),
                    InterfaceStatus::new(3, PayloadKind::Can, vec![7]),
                ],
            ))
            .unwrap();

        assert_eq!(f.topology.set_device_id(module, 9), Ok(EditOutcome::Applied));

        let keys: HashSet<RouteKey> = f.topology.route_keys().into_iter().collect();
        let expected: HashSet<RouteKey> = [
            RouteKey::new(9, 0, 0),
            RouteKey::new(9, 0, 1),
            RouteKey::new(9, 3, 7),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys, expected);
        for key in expected {
            assert_eq!(f.route_table.subscriber_count(key), 1);
        }
        assert_eq!(f.route_table.key_count(), 3);
        assert_eq!(f.device_route_table.subscriber_count(2), 0);
        assert_eq!(f.device_route_table.subscriber_count(9), 1);
        assert_eq!(f.topology.find_capture_module(9), Some(module));
    }

    #[test]
    fn device_migration_onto_another_module_is_rejected() {
        let f = fixture();
        let first = f.topology.add_capture_module_empty().unwrap();
        f.topology.add_capture_module_empty().unwrap();

        assert_eq!(
            f.topology.set_device_id(first, 1),
            Ok(EditOutcome::Rejected(EditError::Id(IdError::DuplicateId(1))))
        );
        assert_eq!(
            f.topology.set_device_id(first, 70_000),
            Ok(EditOutcome::Rejected(EditError::Id(IdError::InvalidRange(70_000))))
        );
        assert_eq!(f.topology.device_id(first), Ok(0));
    }

    #[test]
    fn update_bracket_defers_edits_and_blocks_child_changes() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![InterfaceStatus::new(0, PayloadKind::Can, vec![0])],
            ))
            .unwrap();
        let interface = f.topology.interfaces(module).unwrap()[0];

        f.topology.begin_update(interface).unwrap();
        assert_eq!(f.topology.is_updating(interface), Ok(true));
        assert_eq!(f.topology.set_interface_id(interface, 6), Ok(EditOutcome::Deferred));
        assert_eq!(f.topology.interface_id(interface), Ok(0));
        assert_eq!(f.route_table.subscriber_count(RouteKey::new(1, 0, 0)), 1);
        assert_eq!(
            f.topology.create_stream(interface),
            Err(TopologyError::UpdateInProgress(NodeHandle::Interface(interface)))
        );
        assert_eq!(
            f.topology.remove_stream(interface, 0),
            Err(TopologyError::UpdateInProgress(NodeHandle::Interface(interface)))
        );

        let report = f.topology.end_update(interface).unwrap();

        assert_eq!(report.id, Some(EditOutcome::Applied));
        assert_eq!(report.payload_kind, None);
        assert_eq!(f.topology.interface_id(interface), Ok(6));
        assert_eq!(f.route_table.subscriber_count(RouteKey::new(1, 0, 0)), 0);
        assert_eq!(f.route_table.subscriber_count(RouteKey::new(1, 6, 0)), 1);
        assert!(f.topology.create_stream(interface).is_ok());
    }

    #[test]
    fn nested_begin_update_is_rejected_and_keeps_deferred_edits() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![InterfaceStatus::new(0, PayloadKind::Can, vec![0])],
            ))
            .unwrap();
        let interface = f.topology.interfaces(module).unwrap()[0];

        f.topology.begin_update(interface).unwrap();
        assert_eq!(f.topology.set_interface_id(interface, 3), Ok(EditOutcome::Deferred));
        assert_eq!(
            f.topology.begin_update(interface),
            Err(TopologyError::UpdateInProgress(NodeHandle::Interface(interface)))
        );
        assert_eq!(f.topology.is_updating(interface), Ok(true));

        let report = f.topology.end_update(interface).unwrap();

        assert_eq!(report.id, Some(EditOutcome::Applied));
        assert_eq!(f.topology.interface_id(interface), Ok(3));
        assert_eq!(f.topology.is_updating(interface), Ok(false));
        assert!(f.topology.begin_update(interface).is_ok());
    }

    #[test]
    fn payload_kind_selection_follows_edits() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![InterfaceStatus::new(0, PayloadKind::Ethernet, vec![0])],
            ))
            .unwrap();
        let interface = f.topology.interfaces(module).unwrap()[0];
        let labels = TopologySynchronizer::payload_kind_selection_labels();

        assert_eq!(f.topology.interface_payload_kind_selection(interface), Ok(None));
        assert_eq!(f.topology.set_interface_payload_kind(interface, 1), Ok(EditOutcome::Applied));
        assert_eq!(f.topology.interface_payload_kind_selection(interface), Ok(Some(1)));
        assert_eq!(labels[1], "CAN");
        assert_eq!(
            f.topology
                .set_interface_payload_kind(interface, labels.len() as u64),
            Ok(EditOutcome::Rejected(EditError::PayloadKindSelection(
                labels.len() as u64
            )))
        );
    }

    #[test]
    fn rejected_id_in_bracket_does_not_block_payload_kind_edit() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![
                    InterfaceStatus::new(0, PayloadKind::Can, vec![0]),
                    InterfaceStatus::new(1, PayloadKind::Can, vec![0]),
                ],
            ))
            .unwrap();
        let interface = f.topology.interfaces(module).unwrap()[0];
        let stream = f.topology.streams(interface).unwrap()[0];

        f.topology.begin_update(interface).unwrap();
        f.topology.set_interface_id(interface, 1).unwrap();
        f.topology.set_interface_payload_kind(interface, 3).unwrap();
        let report = f.topology.end_update(interface).unwrap();

        assert!(report.id.unwrap().is_rejected());
        assert_eq!(report.payload_kind, Some(EditOutcome::Applied));
        assert_eq!(f.topology.interface_id(interface), Ok(0));
        assert_eq!(f.topology.interface_payload_kind(interface), Ok(PayloadKind::Analog));
        assert_eq!(f.topology.stream_payload_kind(stream), Ok(PayloadKind::Analog));
        assert_eq!(
            f.topology.end_update(interface),
            Err(TopologyError::NoUpdateInProgress(NodeHandle::Interface(interface)))
        );
    }

    #[test]
    fn capture_module_bracket_blocks_interface_changes() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();

        f.topology.begin_update(module).unwrap();
        assert_eq!(f.topology.set_device_id(module, 4), Ok(EditOutcome::Deferred));
        assert!(matches!(
            f.topology.create_interface(module),
            Err(TopologyError::UpdateInProgress(_))
        ));
        let report = f.topology.end_update(module).unwrap();

        assert_eq!(report.id, Some(EditOutcome::Applied));
        assert_eq!(f.topology.device_id(module), Ok(4));
    }

    #[test]
    fn stream_bracket_applies_id_on_close() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, _) = f.topology.create_interface(module).unwrap();
        let (stream, _) = f.topology.create_stream(interface).unwrap();

        f.topology.begin_update(stream).unwrap();
        assert_eq!(f.topology.set_stream_id(stream, 40), Ok(EditOutcome::Deferred));
        assert_eq!(f.topology.stream_id(stream), Ok(0));
        f.topology.end_update(stream).unwrap();

        assert_eq!(f.topology.stream_id(stream), Ok(40));
    }

    #[test]
    fn out_of_range_payload_kind_selection_is_rejected() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, _) = f.topology.create_interface(module).unwrap();

        assert_eq!(
            f.topology.set_interface_payload_kind(interface, 9),
            Ok(EditOutcome::Rejected(EditError::PayloadKindSelection(9)))
        );
        assert_eq!(
            f.topology.interface_payload_kind(interface),
            Ok(PayloadKind::Undefined)
        );
    }

    #[test]
    fn snapshot_refresh_only_grows_the_tree() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                3,
                vec![InterfaceStatus::new(0, PayloadKind::CanFd, vec![1, 2])],
            ))
            .unwrap();

        let summary = f
            .topology
            .refresh_from_status(&device(
                3,
                vec![
                    InterfaceStatus::new(0, PayloadKind::CanFd, vec![1, 2, 3]),
                    InterfaceStatus::new(1, PayloadKind::Analog, vec![0]),
                ],
            ))
            .unwrap();
        assert_eq!(
            summary,
            GrowthSummary {
                interfaces_added: 1,
                streams_added: 2
            }
        );

        let shrunk = f
            .topology
            .refresh_from_status(&device(3, vec![InterfaceStatus::new(0, PayloadKind::CanFd, vec![1])]))
            .unwrap();
        assert!(shrunk.is_empty());
        assert_eq!(f.route_table.key_count(), 4);
        assert_eq!(f.topology.interfaces(module).unwrap().len(), 2);
        assert_eq!(f.topology.refresh_from_status(&device(8, vec![])), None);
    }

    #[test]
    fn adding_a_materialized_device_again_refreshes_it() {
        let f = fixture();
        let first = f
            .topology
            .add_capture_module_from_status(&device(
                3,
                vec![InterfaceStatus::new(0, PayloadKind::Can, vec![0])],
            ))
            .unwrap();
        let second = f
            .topology
            .add_capture_module_from_status(&device(
                3,
                vec![InterfaceStatus::new(0, PayloadKind::Can, vec![0, 1])],
            ))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(f.topology.capture_module_count(), 1);
        assert_eq!(f.route_table.key_count(), 2);
        assert_eq!(
            f.topology.device_info(first).unwrap().device_description,
            "device 3"
        );
    }

    #[test]
    fn snapshot_interface_kind_is_inherited_by_its_streams() {
        let f = fixture();
        let module = f
            .topology
            .add_capture_module_from_status(&device(
                1,
                vec![
                    InterfaceStatus::new(0, PayloadKind::Analog, vec![0]),
                    InterfaceStatus::new(1, PayloadKind::InterfaceStatus, vec![0]),
                ],
            ))
            .unwrap();
        let interfaces = f.topology.interfaces(module).unwrap();
        let analog_stream = f.topology.streams(interfaces[0]).unwrap()[0];

        assert_eq!(
            f.topology.stream_payload_kind(analog_stream),
            Ok(PayloadKind::Analog)
        );
        assert_eq!(
            f.topology.interface_payload_kind(interfaces[1]),
            Ok(PayloadKind::Undefined)
        );
    }

    #[test]
    fn stale_handles_report_unknown_objects() {
        let f = fixture();
        let module = f.topology.add_capture_module_empty().unwrap();
        let (interface, _) = f.topology.create_interface(module).unwrap();
        let (stream, _) = f.topology.create_stream(interface).unwrap();
        f.topology.remove_capture_module(0).unwrap();

        assert_eq!(
            f.topology.device_id(module),
            Err(TopologyError::UnknownCaptureModule(module))
        );
        assert_eq!(
            f.topology.set_stream_id(stream, 3),
            Err(TopologyError::UnknownStream(stream))
        );
        assert_eq!(
            f.topology.begin_update(interface),
            Err(TopologyError::UnknownInterface(interface))
        );
    }
}
