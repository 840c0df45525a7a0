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

//! Periodic transmission of the local capture status.

use crate::codec::MessageEncoder;
use crate::data_plane::sender::CaptureSender;
use crate::observability::{events, fields};
use crate::runtime::worker_runtime::StoppableWorker;
use crate::status::local_status::LocalCaptureStatus;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

const COMPONENT: &str = "status_heartbeat";
const HEARTBEAT_THREAD_NAME_PREFIX: &str = "cmp-hb-";

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_HEARTBEAT_SLOT: usize = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeartbeatOptions {
    pub interval: Duration,
    /// Encoder-pool slot the status frames are sent through.
    pub slot: usize,
}

impl Default for HeartbeatOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_HEARTBEAT_INTERVAL,
            slot: DEFAULT_HEARTBEAT_SLOT,
        }
    }
}

/// Background task sending the local status once per interval, starting
/// immediately. Stopped by [`StatusHeartbeat::stop`] or on drop.
pub struct StatusHeartbeat {
    worker: StoppableWorker,
}

impl StatusHeartbeat {
    pub fn start<E>(
        sender: Arc<CaptureSender<E>>,
        status: Arc<LocalCaptureStatus>,
        options: HeartbeatOptions,
    ) -> io::Result<Self>
    where
        E: MessageEncoder + 'static,
    {
        let worker = StoppableWorker::spawn(
            HEARTBEAT_THREAD_NAME_PREFIX,
            move |context, mut shutdown| async move {
                let mut ticker = interval(options.interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                let mut beats: u64 = 0;

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            beats += 1;
                            let messages = status.to_messages();
                            // Failures are logged by the sender; the next tick retries.
                            if let Ok(frames) = sender.send_batch(options.slot, &messages) {
                                debug!(
                                    event = events::HEARTBEAT_TICK,
                                    component = COMPONENT,
                                    worker_id = context.worker_id.as_str(),
                                    beats,
                                    messages = messages.len(),
                                    frames,
                                    "status heartbeat sent"
                                );
                            }
                        }
                        _ = shutdown.changed() => {
                            info!(
                                event = events::HEARTBEAT_STOP,
                                component = COMPONENT,
                                worker_id = context.worker_id.as_str(),
                                worker_thread = context.worker_thread.as_str(),
                                beats,
                                reason = fields::REASON_SHUTDOWN,
                                "status heartbeat stopped"
                            );
                            break;
                        }
                    }
                }
            },
        )?;
        Ok(Self { worker })
    }

    pub fn worker_id(&self) -> &str {
        self.worker.worker_id()
    }

    pub fn worker_thread(&self) -> &str {
        self.worker.worker_thread()
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Signals the task and waits until it has exited.
    pub fn stop(&mut self) {
        self.worker.stop();
    }
}
