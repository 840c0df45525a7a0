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

//! Composite routing identity of one stream.

use crate::message::{DeviceId, InterfaceId, StreamId};
use std::fmt::{Display, Formatter};

/// `(device, interface, stream)` triple that addresses exactly one live stream.
///
/// Two distinct stream objects never hold the same key at the same time.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RouteKey {
    pub device_id: DeviceId,
    pub interface_id: InterfaceId,
    pub stream_id: StreamId,
}

impl RouteKey {
    #[inline(always)]
    pub fn new(device_id: DeviceId, interface_id: InterfaceId, stream_id: StreamId) -> Self {
        Self {
            device_id,
            interface_id,
            stream_id,
        }
    }

    /// Same key with the device component replaced.
    pub(crate) fn with_device(self, device_id: DeviceId) -> Self {
        Self { device_id, ..self }
    }

    /// Same key with the interface component replaced.
    pub(crate) fn with_interface(self, interface_id: InterfaceId) -> Self {
        Self {
            interface_id,
            ..self
        }
    }

    /// Same key with the stream component replaced.
    pub(crate) fn with_stream(self, stream_id: StreamId) -> Self {
        Self { stream_id, ..self }
    }
}

impl Display for RouteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.device_id, self.interface_id, self.stream_id
        )
    }
}
