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

//! Adapter-reading thread feeding raw frames to the arrival side.

use crate::adapter::Frame;
use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::runtime::worker_runtime::StoppableWorker;
use std::io;
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio::sync::watch;
use tracing::{info, warn};

const COMPONENT: &str = "frame_reader";
const READER_THREAD_NAME_PREFIX: &str = "cmp-rx-";

/// Consumer of raw frames read from an adapter.
pub trait FrameConsumer: Send + Sync {
    fn on_frame(&self, frame: &[u8]);

    /// Called when the reader fell behind and `skipped` frames were lost.
    fn on_lagged(&self, _skipped: u64) {}
}

/// Owns the reading thread. Frames are handed to the consumer in arrival
/// order on that one thread.
pub struct FrameReader {
    worker: StoppableWorker,
}

impl FrameReader {
    pub fn start(receiver: Receiver<Frame>, consumer: Arc<dyn FrameConsumer>) -> io::Result<Self> {
        let worker = StoppableWorker::spawn(
            READER_THREAD_NAME_PREFIX,
            move |context, shutdown| Self::read_loop(context, receiver, consumer, shutdown),
        )?;
        Ok(Self { worker })
    }

    pub fn worker_id(&self) -> &str {
        self.worker.worker_id()
    }

    pub fn worker_thread(&self) -> &str {
        self.worker.worker_thread()
    }

    /// Returns `false` once the adapter closed or the reader was stopped.
    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    pub fn stop(&mut self) {
        self.worker.stop();
    }

    pub(crate) async fn read_loop(
        context: WorkerContext,
        mut receiver: Receiver<Frame>,
        consumer: Arc<dyn FrameConsumer>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                received = receiver.recv() => match received {
                    Ok(frame) => consumer.on_frame(&frame),
                    Err(RecvError::Lagged(skipped)) => {
                        consumer.on_lagged(skipped);
                        warn!(
                            event = events::READER_RECV_LAGGED,
                            component = COMPONENT,
                            worker_id = context.worker_id.as_str(),
                            worker_thread = context.worker_thread.as_str(),
                            skipped,
                            "reader lagged; frames were skipped"
                        );
                    }
                    Err(RecvError::Closed) => {
                        info!(
                            event = events::READER_RECV_CLOSED,
                            component = COMPONENT,
                            worker_id = context.worker_id.as_str(),
                            worker_thread = context.worker_thread.as_str(),
                            reason = fields::REASON_BROADCAST_CLOSED,
                            "adapter closed; stopping reader"
                        );
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!(
                        event = events::READER_STOP,
                        component = COMPONENT,
                        worker_id = context.worker_id.as_str(),
                        worker_thread = context.worker_thread.as_str(),
                        reason = fields::REASON_SHUTDOWN,
                        "reader stopped"
                    );
                    break;
                }
            }
        }
    }
}
