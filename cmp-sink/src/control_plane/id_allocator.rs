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

//! Gap-filling identifier allocation scoped to one parent object.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Failures of identifier allocation and validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdError {
    /// The identifier is already assigned in this scope.
    DuplicateId(u64),
    /// The raw value does not fit the identifier's bit width.
    InvalidRange(u64),
    /// Every value of the identifier's bit width is assigned.
    Exhausted,
}

impl Display for IdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IdError::DuplicateId(id) => write!(f, "id {id} is already assigned"),
            IdError::InvalidRange(id) => write!(f, "id {id} is out of range"),
            IdError::Exhausted => write!(f, "no free id left in scope"),
        }
    }
}

impl Error for IdError {}

/// Unsigned identifier types the allocator can manage.
pub trait AllocatableId: Copy + Debug + Display + Ord + Into<u64> + TryFrom<u64> {
    const MAX: Self;
}

impl AllocatableId for u8 {
    const MAX: Self = u8::MAX;
}

impl AllocatableId for u16 {
    const MAX: Self = u16::MAX;
}

impl AllocatableId for u32 {
    const MAX: Self = u32::MAX;
}

/// Ordered set of assigned identifiers.
///
/// [`IdAllocator::first_unused`] always answers the smallest unassigned value, so
/// removed ids are reused before new ones are handed out.
#[derive(Clone, Debug)]
pub struct IdAllocator<T> {
    assigned: BTreeSet<T>,
}

impl<T: AllocatableId> Default for IdAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AllocatableId> IdAllocator<T> {
    pub fn new() -> Self {
        Self {
            assigned: BTreeSet::new(),
        }
    }

    /// Marks `id` as assigned.
    pub fn add(&mut self, id: T) -> Result<(), IdError> {
        if self.assigned.insert(id) {
            Ok(())
        } else {
            Err(IdError::DuplicateId(id.into()))
        }
    }

    /// Un-marks `id`. Returns `false` when it was not assigned.
    pub fn remove(&mut self, id: T) -> bool {
        self.assigned.remove(&id)
    }

    /// `true` iff `id` is not currently assigned.
    pub fn is_valid(&self, id: T) -> bool {
        !self.assigned.contains(&id)
    }

    /// Converts a raw value and checks it is free in this scope.
    pub fn validate(&self, raw: u64) -> Result<T, IdError> {
        let id = T::try_from(raw).map_err(|_| IdError::InvalidRange(raw))?;
        if self.is_valid(id) {
            Ok(id)
        } else {
            Err(IdError::DuplicateId(raw))
        }
    }

    /// Smallest unassigned value. Has no side effects.
    pub fn first_unused(&self) -> Result<T, IdError> {
        let mut candidate: u64 = 0;
        for id in &self.assigned {
            let id: u64 = (*id).into();
            if id != candidate {
                break;
            }
            candidate += 1;
        }

        if candidate > T::MAX.into() {
            return Err(IdError::Exhausted);
        }
        T::try_from(candidate).map_err(|_| IdError::Exhausted)
    }

    /// Claims and returns the smallest unassigned value.
    pub fn allocate(&mut self) -> Result<T, IdError> {
        let id = self.first_unused()?;
        self.add(id)?;
        Ok(id)
    }

    pub fn contains(&self, id: T) -> bool {
        self.assigned.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.assigned.iter().copied()
    }
}
