//! Strongly-typed identifiers for elements, pool slots, attributes and steps.

use std::fmt;

/// Unique identifier of a simulated element.
///
/// Assigned sequentially at seeding time starting from 1 and never
/// reused, even after the element is deactivated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Dense index of an element inside the pool's parallel arrays.
///
/// Distinct from [`ElementId`]: slots are storage positions, IDs are
/// identities. The pool never compacts, so a slot stays bound to the
/// same element for the life of the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub usize);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a physical attribute in an [`ElementSchema`](crate::ElementSchema).
///
/// Resolved once from an attribute name when a substance is constructed,
/// then used for every per-step access without string lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrId(pub u32);

impl fmt::Display for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing step counter.
///
/// Zero before the first step; incremented once per completed step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
