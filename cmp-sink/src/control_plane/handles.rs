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

//! Opaque handles addressing topology objects.
//!
//! Handles stay stable while protocol identifiers migrate. They are resolved
//! against the tree under the synchronizer lock; a handle whose object has been
//! removed simply no longer resolves.

use std::fmt::{Display, Formatter};

macro_rules! topology_handle {
    ($name:ident, $label:literal) => {
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $name(pub(crate) u64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

topology_handle!(CaptureModuleHandle, "capture_module");
topology_handle!(InterfaceHandle, "interface");
topology_handle!(StreamHandle, "stream");

/// Any topology object, used where capture modules, interfaces and streams
/// share an operation (update brackets).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeHandle {
    CaptureModule(CaptureModuleHandle),
    Interface(InterfaceHandle),
    Stream(StreamHandle),
}

impl From<CaptureModuleHandle> for NodeHandle {
    fn from(handle: CaptureModuleHandle) -> Self {
        NodeHandle::CaptureModule(handle)
    }
}

impl From<InterfaceHandle> for NodeHandle {
    fn from(handle: InterfaceHandle) -> Self {
        NodeHandle::Interface(handle)
    }
}

impl From<StreamHandle> for NodeHandle {
    fn from(handle: StreamHandle) -> Self {
        NodeHandle::Stream(handle)
    }
}

impl Display for NodeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeHandle::CaptureModule(handle) => Display::fmt(handle, f),
            NodeHandle::Interface(handle) => Display::fmt(handle, f),
            NodeHandle::Stream(handle) => Display::fmt(handle, f),
        }
    }
}
