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

//! Translation between interface payload kinds and their selection index.

use crate::message::PayloadKind;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref SELECTABLE_KINDS: Vec<(PayloadKind, &'static str)> = vec![
        (PayloadKind::Undefined, "Undefined"),
        (PayloadKind::Can, "CAN"),
        (PayloadKind::CanFd, "CAN FD"),
        (PayloadKind::Analog, "Analog"),
    ];
    static ref SELECTION_INDEX: HashMap<PayloadKind, u64> = SELECTABLE_KINDS
        .iter()
        .enumerate()
        .map(|(index, (kind, _))| (*kind, index as u64))
        .collect();
}

/// Payload kind stored at `index`, if the index is in range.
pub fn payload_kind_for_selection(index: u64) -> Option<PayloadKind> {
    usize::try_from(index)
        .ok()
        .and_then(|index| SELECTABLE_KINDS.get(index))
        .map(|(kind, _)| *kind)
}

/// Selection index of `kind`; `None` for kinds that cannot be selected.
pub fn selection_index_of(kind: PayloadKind) -> Option<u64> {
    SELECTION_INDEX.get(&kind).copied()
}

/// Display labels in selection order.
pub fn selection_labels() -> Vec<&'static str> {
    SELECTABLE_KINDS.iter().map(|(_, label)| *label).collect()
}

#[cfg(test)]
mod tests {
    use super::{payload_kind_for_selection, selection_index_of, selection_labels};
    use crate::message::PayloadKind;

    #[test]
    fn table_is_bidirectional() {
        for index in 0..selection_labels().len() as u64 {
            let kind = payload_kind_for_selection(index).expect("index is in range");
            assert_eq!(selection_index_of(kind), Some(index));
        }
    }

    #[test]
    fn out_of_range_and_unselectable_kinds_are_rejected() {
        assert_eq!(payload_kind_for_selection(4), None);
        assert_eq!(payload_kind_for_selection(u64::MAX), None);
        assert_eq!(selection_index_of(PayloadKind::Ethernet), None);
        assert_eq!(selection_index_of(PayloadKind::CaptureModuleStatus), None);
        assert_eq!(payload_kind_for_selection(2), Some(PayloadKind::CanFd));
    }
}
