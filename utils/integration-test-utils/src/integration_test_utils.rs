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

use cmp_sink::CmpMessage;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Installs a test subscriber once per process; later calls are no-ops.
/// Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Polls `condition` until it holds or `timeout` elapses. Returns the final
/// outcome of `condition`.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(POLL_INTERVAL);
    }
    condition()
}

/// Asserts timestamps of `messages` are strictly increasing, which is how the
/// builders here number messages in send order.
pub fn check_messages_in_order(messages: &[Arc<CmpMessage>]) {
    for pair in messages.windows(2) {
        assert!(
            pair[0].timestamp_ns < pair[1].timestamp_ns,
            "messages out of order: {} then {}",
            pair[0].timestamp_ns,
            pair[1].timestamp_ns
        );
    }
}
