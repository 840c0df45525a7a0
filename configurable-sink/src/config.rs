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
    CaptureModuleInfo, DataContext, DeviceId, HeartbeatOptions, InterfaceId, InterfaceInfo,
    InterfaceStatus, LocalCaptureStatus, PayloadKind, SinkOptions, StreamId,
    DEFAULT_LOOPBACK_CAPACITY,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(json5::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(err) => write!(f, "unable to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse config file: {err}"),
            ConfigError::Invalid(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Read(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) sink: SinkConfig,
    pub(crate) local_device: LocalDeviceConfig,
    #[serde(default)]
    pub(crate) heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub(crate) adapter: AdapterConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    #[serde(default)]
    pub(crate) auto_materialize: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct LocalDeviceConfig {
    pub(crate) device_id: DeviceId,
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) serial_number: String,
    #[serde(default)]
    pub(crate) interfaces: Vec<InterfaceConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    pub(crate) interface_id: InterfaceId,
    pub(crate) payload_kind: PayloadKind,
    pub(crate) stream_ids: Vec<StreamId>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatConfig {
    pub(crate) interval_ms: u64,
    pub(crate) slot: usize,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        let options = HeartbeatOptions::default();
        Self {
            interval_ms: options.interval.as_millis() as u64,
            slot: options.slot,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    pub(crate) channel_capacity: usize,
    pub(crate) encoder_slots: usize,
    pub(crate) min_frame_size: usize,
    pub(crate) max_frame_size: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        let context = DataContext::default();
        Self {
            channel_capacity: DEFAULT_LOOPBACK_CAPACITY,
            encoder_slots: 2,
            min_frame_size: context.min_frame_size,
            max_frame_size: context.max_frame_size,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config: Config = json5::from_str(&contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "heartbeat.interval_ms must be positive".to_string(),
            ));
        }
        if self.heartbeat.slot >= self.adapter.encoder_slots {
            return Err(ConfigError::Invalid(format!(
                "heartbeat.slot {} needs at least {} encoder slots",
                self.heartbeat.slot,
                self.heartbeat.slot + 1
            )));
        }
        if self.adapter.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "adapter.channel_capacity must be positive".to_string(),
            ));
        }
        if self.adapter.min_frame_size > self.adapter.max_frame_size {
            return Err(ConfigError::Invalid(
                "adapter.min_frame_size exceeds adapter.max_frame_size".to_string(),
            ));
        }

        let mut interface_ids: Vec<InterfaceId> = Vec::new();
        for interface in &self.local_device.interfaces {
            if interface_ids.contains(&interface.interface_id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate interface id {}",
                    interface.interface_id
                )));
            }
            if !interface.payload_kind.is_data_kind() {
                return Err(ConfigError::Invalid(format!(
                    "interface {} has non-data payload kind {}",
                    interface.interface_id, interface.payload_kind
                )));
            }
            interface_ids.push(interface.interface_id);
        }
        Ok(())
    }

    pub fn sink_options(&self) -> SinkOptions {
        SinkOptions {
            auto_materialize: self.sink.auto_materialize,
        }
    }

    pub fn heartbeat_options(&self) -> HeartbeatOptions {
        HeartbeatOptions {
            interval: Duration::from_millis(self.heartbeat.interval_ms),
            slot: self.heartbeat.slot,
        }
    }

    pub fn data_context(&self) -> DataContext {
        DataContext {
            min_frame_size: self.adapter.min_frame_size,
            max_frame_size: self.adapter.max_frame_size,
        }
    }

    pub fn local_status(&self) -> LocalCaptureStatus {
        let device = &self.local_device;
        let status = LocalCaptureStatus::new(
            device.device_id,
            CaptureModuleInfo {
                device_description: device.description.clone(),
                serial_number: device.serial_number.clone(),
                ..Default::default()
            },
        );
        for interface in &device.interfaces {
            status.set_interface(InterfaceStatus {
                interface_id: interface.interface_id,
                info: InterfaceInfo {
                    interface_type: interface.payload_kind,
                    stream_ids: interface.stream_ids.clone(),
                },
            });
        }
        status
    }
}
