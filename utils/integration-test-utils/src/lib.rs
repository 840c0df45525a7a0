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

mod integration_test_utils;
pub use integration_test_utils::{check_messages_in_order, init_logging, wait_until};

mod integration_test_listeners;
pub use integration_test_listeners::{
    CollectingFrameSink, HandlerCall, RecordingHandler, RecordingSampleSink,
};

mod integration_test_messages;
pub use integration_test_messages::{
    analog_message, can_frame, can_message, capture_status, device_status, interface_status,
};
