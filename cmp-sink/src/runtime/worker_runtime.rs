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

//! Dedicated worker threads that each drive one async loop on a
//! current-thread Tokio runtime, stopped by signal-then-join.

use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use std::future::Future;
use std::io;
use std::thread::{self, JoinHandle};
use tokio::runtime::Builder;
use tokio::sync::watch;
use tracing::{debug, error, warn};
use uuid::Uuid;

pub(crate) const DEFAULT_WORKER_THREAD_NAME: &str = "cmp-sink-worker";
// Linux truncates thread names beyond 15 bytes.
const WORKER_THREAD_NAME_MAX_LEN: usize = 15;
const COMPONENT: &str = "worker_runtime";

/// Builds `<prefix><hex digits of worker_id>` capped at the platform limit,
/// or the default name when the id does not supply enough hex digits.
pub(crate) fn build_worker_thread_name(prefix: &str, worker_id: &str) -> String {
    let Some(suffix_len) = WORKER_THREAD_NAME_MAX_LEN.checked_sub(prefix.len()) else {
        return DEFAULT_WORKER_THREAD_NAME.to_string();
    };
    let suffix: String = worker_id
        .chars()
        .filter(|ch| ch.is_ascii_hexdigit())
        .take(suffix_len)
        .collect();

    if suffix_len > 0 && suffix.len() == suffix_len {
        format!("{prefix}{suffix}")
    } else {
        debug!(
            event = events::RUNTIME_THREAD_NAME_FALLBACK,
            component = COMPONENT,
            worker_id,
            reason = fields::REASON_INVALID_THREAD_NAME,
            "falling back to default worker thread name"
        );
        DEFAULT_WORKER_THREAD_NAME.to_string()
    }
}

/// A running worker loop together with its shutdown signal.
pub(crate) struct StoppableWorker {
    worker_id: String,
    worker_thread: String,
    shutdown: watch::Sender<bool>,
    join_handle: Option<JoinHandle<()>>,
}

impl StoppableWorker {
    /// Spawns `run_loop` on a new named thread.
    ///
    /// The loop receives its [`WorkerContext`] and a shutdown receiver that
    /// flips to `true` when [`StoppableWorker::stop`] is called.
    pub(crate) fn spawn<F, Fut>(thread_name_prefix: &str, run_loop: F) -> io::Result<Self>
    where
        F: FnOnce(WorkerContext, watch::Receiver<bool>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let worker_id = Uuid::new_v4().hyphenated().to_string();
        let worker_thread = build_worker_thread_name(thread_name_prefix, &worker_id);
        let (shutdown, shutdown_receiver) = watch::channel(false);

        debug!(
            event = events::RUNTIME_SPAWN_START,
            component = COMPONENT,
            worker_id = worker_id.as_str(),
            worker_thread = worker_thread.as_str(),
            "spawning worker thread"
        );

        let context = WorkerContext::new(worker_id.clone(), Some(worker_thread.as_str()));
        let spawn_result = thread::Builder::new()
            .name(worker_thread.clone())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(
                            event = events::RUNTIME_SPAWN_FAILED,
                            component = COMPONENT,
                            worker_id = context.worker_id.as_str(),
                            worker_thread = context.worker_thread.as_str(),
                            err = %err,
                            "failed to build worker runtime"
                        );
                        return;
                    }
                };
                runtime.block_on(run_loop(context, shutdown_receiver));
            });

        let join_handle = match spawn_result {
            Ok(join_handle) => join_handle,
            Err(err) => {
                error!(
                    event = events::RUNTIME_SPAWN_FAILED,
                    component = COMPONENT,
                    worker_id = worker_id.as_str(),
                    worker_thread = worker_thread.as_str(),
                    err = %err,
                    "failed to spawn worker thread"
                );
                return Err(err);
            }
        };

        debug!(
            event = events::RUNTIME_SPAWN_OK,
            component = COMPONENT,
            worker_id = worker_id.as_str(),
            worker_thread = worker_thread.as_str(),
            "worker thread spawned"
        );

        Ok(Self {
            worker_id,
            worker_thread,
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    pub(crate) fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub(crate) fn worker_thread(&self) -> &str {
        &self.worker_thread
    }

    /// Returns `true` once the loop has returned on its own or been stopped.
    pub(crate) fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .map_or(true, |join_handle| join_handle.is_finished())
    }

    /// Signals the loop to stop and waits for its thread. Idempotent.
    pub(crate) fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        let Some(join_handle) = self.join_handle.take() else {
            return;
        };
        if join_handle.join().is_err() {
            warn!(
                event = events::RUNTIME_JOIN_FAILED,
                component = COMPONENT,
                worker_id = self.worker_id.as_str(),
                worker_thread = self.worker_thread.as_str(),
                "worker thread panicked"
            );
        }
    }
}

impl Drop for StoppableWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
