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

//! Property edit outcomes and update-bracket bookkeeping.

use crate::control_plane::id_allocator::IdError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a property edit was not applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditError {
    Id(IdError),
    /// Payload-kind selection index outside the selectable range.
    PayloadKindSelection(u64),
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::Id(err) => write!(f, "identifier rejected: {err}"),
            EditError::PayloadKindSelection(index) => {
                write!(f, "payload kind selection {index} is out of range")
            }
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EditError::Id(err) => Some(err),
            EditError::PayloadKindSelection(_) => None,
        }
    }
}

impl From<IdError> for EditError {
    fn from(err: IdError) -> Self {
        EditError::Id(err)
    }
}

/// Result of one property edit. Rejections leave the previous value in place.
#[must_use]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EditOutcome {
    Applied,
    /// The new value equals the current one.
    Unchanged,
    /// Recorded inside an open update bracket; applied at `end_update`.
    Deferred,
    Rejected(EditError),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, EditOutcome::Rejected(_))
    }
}

/// Outcomes of the edits applied when an update bracket closes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpdateReport {
    pub id: Option<EditOutcome>,
    pub payload_kind: Option<EditOutcome>,
}

impl UpdateReport {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.payload_kind.is_none()
    }
}

/// Update-bracket state carried by every topology object.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct UpdateState {
    open: bool,
    pending_id: Option<u64>,
    pending_payload_kind: Option<u64>,
}

impl UpdateState {
    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn open(&mut self) {
        self.open = true;
    }

    pub(crate) fn defer_id(&mut self, raw: u64) {
        self.pending_id = Some(raw);
    }

    pub(crate) fn defer_payload_kind(&mut self, selection: u64) {
        self.pending_payload_kind = Some(selection);
    }

    /// Closes the bracket and hands back the recorded edits.
    pub(crate) fn close(&mut self) -> (Option<u64>, Option<u64>) {
        let pending = (self.pending_id.take(), self.pending_payload_kind.take());
        self.open = false;
        pending
    }
}
