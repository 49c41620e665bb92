//! Type-Safe Registry Identifiers
//!
//! Branch ids are handed out to the rest of the engine; class and method
//! indices stay inside the registry arena. None of them are interchangeable.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Globally unique branch identifier
///
/// Assigned densely from 1 in registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(u32);

impl BranchId {
    /// Create a branch ID from its raw value
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Position of this branch in the registry's dense branch storage
    ///
    /// Returns `None` for the reserved id 0.
    #[inline]
    #[must_use]
    pub(crate) const fn slot(self) -> Option<usize> {
        match self.0.checked_sub(1) {
            Some(slot) => Some(slot as usize),
            None => None,
        }
    }
}

impl Hash for BranchId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for BranchId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BranchId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Arena index of a class known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ClassIdx(u32);

impl ClassIdx {
    #[inline]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }
}

/// Arena index of a method known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MethodIdx(u32);

impl MethodIdx {
    #[inline]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    #[inline]
    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }
}
