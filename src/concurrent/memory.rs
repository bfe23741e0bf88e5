//! Abstract memory addresses.

use std::collections::BTreeSet;

use crate::concurrent::zone::Zone;

/// An abstract pointer value.
pub type Pointer = u64;

/// The set of locations a memory access may touch.
///
/// Shared-ness is contagious under [`MemoryAddr::join`]: only shared accesses
/// take part in the concurrency encoding. Equality compares the pointer sets.
#[derive(Debug, Clone, Eq)]
pub struct MemoryAddr {
    ptrs: BTreeSet<Pointer>,
    is_shared: bool,
}

impl MemoryAddr {
    /// Creates a shared address of a single pointer.
    #[must_use]
    pub fn new(ptr: Pointer) -> Self {
        Self::with_sharing(ptr, true)
    }

    /// Creates an address of a single pointer with explicit shared-ness.
    #[must_use]
    pub fn with_sharing(ptr: Pointer, is_shared: bool) -> Self {
        Self {
            ptrs: BTreeSet::from([ptr]),
            is_shared,
        }
    }

    /// Union of both pointer sets, shared if either side is shared.
    #[must_use]
    pub fn join(&self, other: &MemoryAddr) -> MemoryAddr {
        MemoryAddr {
            ptrs: self.ptrs.union(&other.ptrs).copied().collect(),
            is_shared: self.is_shared || other.is_shared,
        }
    }

    /// The pointers of the address, in ascending order.
    #[must_use]
    pub fn ptrs(&self) -> &BTreeSet<Pointer> {
        &self.ptrs
    }

    /// Checks if the access may be observed by another thread.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.is_shared
    }

    /// The zone covered by the address.
    #[must_use]
    pub fn zone(&self) -> Zone {
        Zone::new(self.ptrs.iter().copied())
    }
}

impl PartialEq for MemoryAddr {
    fn eq(&self, other: &Self) -> bool {
        self.ptrs == other.ptrs
    }
}
