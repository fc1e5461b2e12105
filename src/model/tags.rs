//! Workspace membership bitmask.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of workspaces a configuration may declare. One bit of a
/// `u32` is kept in reserve so that the full mask never becomes ambiguous
/// with a sign bit in external consumers.
pub const MAX_TAGS: u32 = 31;

/// One bit per workspace. A monitor's selected tagset decides which bits are
/// currently visible; a surface is shown when the masks intersect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMask(u32);

impl TagMask {
    pub const fn new(bits: u32) -> Self {
        TagMask(bits)
    }

    /// Mask covering the first `count` workspaces.
    pub fn all(count: u32) -> Self {
        let count = count.min(MAX_TAGS);
        TagMask(((1u64 << count) - 1) as u32)
    }

    /// Mask for a single zero-based workspace index.
    pub fn single(index: u32) -> Self {
        TagMask(1u32 << index.min(MAX_TAGS - 1))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersects(self, other: TagMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: TagMask) -> TagMask {
        TagMask(self.0 | other.0)
    }

    pub fn toggle(self, other: TagMask) -> TagMask {
        TagMask(self.0 ^ other.0)
    }

    /// Restrict to the configured workspace range.
    pub fn clamped(self, valid: TagMask) -> TagMask {
        TagMask(self.0 & valid.0)
    }
}

impl fmt::Display for TagMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn all_covers_configured_count() {
        assert_eq!(TagMask::all(4).bits(), 0b1111);
        assert_eq!(TagMask::all(1).bits(), 0b1);
    }

    #[test]
    fn all_saturates_at_31_bits() {
        assert_eq!(TagMask::all(40).bits(), 0x7fff_ffff);
    }

    #[test]
    fn toggle_flips_membership() {
        let t = TagMask::single(0).union(TagMask::single(2));
        assert_eq!(t.toggle(TagMask::single(2)), TagMask::single(0));
        assert!(t.intersects(TagMask::single(2)));
        assert!(!t.intersects(TagMask::single(1)));
    }
}
