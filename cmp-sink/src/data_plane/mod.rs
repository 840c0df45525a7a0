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

//! Message movement in both directions.
//!
//! Arrival: [`frame_reader`] feeds frames whose decoded messages [`demux`] fans
//! out to the route tables. Outbound: [`sender`] and [`heartbeat`] encode
//! through [`encoder_pool`] slots and write to a frame sink.

pub mod demux;
pub mod encoder_pool;
pub mod frame_reader;
pub mod heartbeat;
pub mod sender;
