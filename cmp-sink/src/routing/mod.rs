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

//! Routing layer.
//!
//! Owns routing identity ([`route_key::RouteKey`]), the handler capability and the
//! keyed subscriber tables. Nothing here knows about topology; the control plane
//! decides what is subscribed under which key.

pub mod handler;
pub mod route_key;
pub mod route_table;
