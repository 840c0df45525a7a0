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

//! Lock-free counters for every silent drop path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Why a message was dropped instead of delivered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DropReason {
    /// Published under a key nobody subscribes to.
    NoSubscriber,
    /// Message class the arrival side does not route.
    UnsupportedMessageClass,
    /// Interface status for a device whose capture status is unknown.
    OrderingDependency,
    /// Stream received a payload kind different from its own.
    PayloadMismatch,
    /// Raw frame could not be decoded.
    DecodeFailed,
    /// Frames the reader skipped because it fell behind the adapter.
    AdapterLagged,
    /// Status-class message without a capture-module or interface status payload.
    UnsupportedStatusPayload,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::NoSubscriber => "no_subscriber",
            DropReason::UnsupportedMessageClass => "unsupported_message_class",
            DropReason::OrderingDependency => "ordering_dependency",
            DropReason::PayloadMismatch => "payload_mismatch",
            DropReason::DecodeFailed => "decode_failed",
            DropReason::AdapterLagged => "adapter_lagged",
            DropReason::UnsupportedStatusPayload => "unsupported_status_payload",
        }
    }
}

#[derive(Debug, Default)]
pub struct DropCounters {
    no_subscriber: AtomicU64,
    unsupported_message_class: AtomicU64,
    ordering_dependency: AtomicU64,
    payload_mismatch: AtomicU64,
    decode_failed: AtomicU64,
    adapter_lagged: AtomicU64,
    unsupported_status_payload: AtomicU64,
}

/// Point-in-time copy of [`DropCounters`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DropCountersSnapshot {
    pub no_subscriber: u64,
    pub unsupported_message_class: u64,
    pub ordering_dependency: u64,
    pub payload_mismatch: u64,
    pub decode_failed: u64,
    pub adapter_lagged: u64,
    pub unsupported_status_payload: u64,
}

impl DropCountersSnapshot {
    pub fn total(&self) -> u64 {
        self.no_subscriber
            + self.unsupported_message_class
            + self.ordering_dependency
            + self.payload_mismatch
            + self.decode_failed
            + self.adapter_lagged
            + self.unsupported_status_payload
    }
}

impl DropCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, reason: DropReason) {
        self.record_many(reason, 1);
    }

    pub fn record_many(&self, reason: DropReason, count: u64) {
        let counter = match reason {
            DropReason::NoSubscriber => &self.no_subscriber,
            DropReason::UnsupportedMessageClass => &self.unsupported_message_class,
            DropReason::OrderingDependency => &self.ordering_dependency,
            DropReason::PayloadMismatch => &self.payload_mismatch,
            DropReason::DecodeFailed => &self.decode_failed,
            DropReason::AdapterLagged => &self.adapter_lagged,
            DropReason::UnsupportedStatusPayload => &self.unsupported_status_payload,
        };
        counter.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DropCountersSnapshot {
        DropCountersSnapshot {
            no_subscriber: self.no_subscriber.load(Ordering::Relaxed),
            unsupported_message_class: self.unsupported_message_class.load(Ordering::Relaxed),
            ordering_dependency: self.ordering_dependency.load(Ordering::Relaxed),
            payload_mismatch: self.payload_mismatch.load(Ordering::Relaxed),
            decode_failed: self.decode_failed.load(Ordering::Relaxed),
            adapter_lagged: self.adapter_lagged.load(Ordering::Relaxed),
            unsupported_status_payload: self.unsupported_status_payload.load(Ordering::Relaxed),
        }
    }
}
