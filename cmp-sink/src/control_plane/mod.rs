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

//! Control-plane ownership of the local topology mirror.
//!
//! Topology objects, identifier allocation and property edits live here. All
//! route-table subscription changes originate in [`topology`].

pub mod edits;
pub mod handles;
pub mod id_allocator;
pub(crate) mod object_handlers;
pub mod payload_kind_table;
pub mod topology;
