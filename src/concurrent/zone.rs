//! Memory zones.
//!
//! A [`Zone`] over-approximates the set of locations an access may touch.
//! Two zones may overlap iff their meet is not bottom.

use std::{collections::BTreeSet, fmt};

use crate::concurrent::memory::Pointer;

/// An approximate set of memory locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zone {
    ptrs: BTreeSet<Pointer>,
}

impl Zone {
    /// Creates the zone of the given pointers.
    #[must_use]
    pub fn new(ptrs: impl IntoIterator<Item = Pointer>) -> Self {
        Self {
            ptrs: ptrs.into_iter().collect(),
        }
    }

    /// The empty zone.
    #[must_use]
    pub fn bottom() -> Self {
        Self::default()
    }

    /// Checks if the zone contains no location.
    #[must_use]
    pub fn is_bottom(&self) -> bool {
        self.ptrs.is_empty()
    }

    /// Locations both zones may touch.
    #[must_use]
    pub fn meet(&self, other: &Zone) -> Zone {
        Zone {
            ptrs: self.ptrs.intersection(&other.ptrs).copied().collect(),
        }
    }

    /// Checks if both zones may overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Zone) -> bool {
        !self.ptrs.is_disjoint(&other.ptrs)
    }

    /// The pointers of the zone.
    #[must_use]
    pub fn ptrs(&self) -> &BTreeSet<Pointer> {
        &self.ptrs
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            return f.write_str("bottom");
        }
        f.write_str("{")?;
        for (i, ptr) in self.ptrs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ptr:#x}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meet() {
        let a = Zone::new([1, 2]);
        let b = Zone::new([2, 3]);
        let c = Zone::new([4]);

        assert_eq!(a.meet(&b), Zone::new([2]));
        assert!(a.meet(&c).is_bottom());
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.meet(&b), b.meet(&a));
        assert!(Zone::bottom().meet(&a).is_bottom());
    }

    #[test]
    fn test_display() {
        assert_eq!(Zone::new([1, 16]).to_string(), "{0x1, 0x10}");
        assert_eq!(Zone::bottom().to_string(), "bottom");
    }
}
