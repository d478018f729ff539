//! Level relationship encoding for spatial queries.
//!
//! Every registered organism carries a pair of 16-bit fields:
//!
//! * `memberships` (upper half when packed): exactly one bit, `1 << (level % 16)`.
//! * `filter` (lower half): `0xFFFF`, i.e. it answers any query.
//!
//! A predator at level `L` queries with `memberships = 0xFFFF` and
//! `filter = 1 << ((L - 1) % 16)`. A shape matches a query when each side's
//! memberships intersect the other side's filter, so a single masked nearest
//! query returns only organisms exactly one level below the predator.

/// Pair of 16-bit membership/filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CollisionGroups {
    pub memberships: u16,
    pub filter: u16,
}

/// Number of distinct level bits before the encoding wraps.
pub const LEVEL_BITS: u32 = 16;

const ALL: u16 = 0xFFFF;

#[inline]
fn level_bit(level: u32) -> u16 {
    1 << (level % LEVEL_BITS)
}

impl CollisionGroups {
    /// Matches nothing. Used for organisms that have been eaten but not yet swept.
    pub const NONE: CollisionGroups = CollisionGroups {
        memberships: 0,
        filter: 0,
    };

    /// Tag registered for an organism at `level`.
    pub fn organism(level: u32) -> Self {
        Self {
            memberships: level_bit(level),
            filter: ALL,
        }
    }

    /// Query mask for a predator at `level`. Level 0 has nothing to eat.
    pub fn prey_query(level: u32) -> Option<Self> {
        if level < 1 {
            return None;
        }
        Some(Self {
            memberships: ALL,
            filter: level_bit(level - 1),
        })
    }

    /// Symmetric membership/filter test.
    #[inline]
    pub fn interacts(self, other: CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }

    /// `memberships` in the upper 16 bits, `filter` in the lower 16.
    pub fn pack(self) -> u32 {
        (self.memberships as u32) << 16 | self.filter as u32
    }

    pub fn unpack(bits: u32) -> Self {
        Self {
            memberships: (bits >> 16) as u16,
            filter: bits as u16,
        }
    }

    /// Level bit carried by an organism tag (modulo 16), if exactly one is set.
    pub fn level_bit_index(self) -> Option<u32> {
        if self.memberships.count_ones() == 1 {
            Some(self.memberships.trailing_zeros())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_layout() {
        assert_eq!(CollisionGroups::organism(0).pack(), 0x0001_FFFF);
        assert_eq!(CollisionGroups::organism(3).pack(), 0x0008_FFFF);
        assert_eq!(CollisionGroups::prey_query(3).map(|g| g.pack()), Some(0xFFFF_0004));
        let g = CollisionGroups::organism(9);
        assert_eq!(CollisionGroups::unpack(g.pack()), g);
    }

    #[test]
    fn level_zero_cannot_hunt() {
        assert!(CollisionGroups::prey_query(0).is_none());
    }

    #[test]
    fn every_level_matches_exactly_one_below() {
        for predator in 1..LEVEL_BITS {
            let query = CollisionGroups::prey_query(predator).unwrap();
            for prey in 0..LEVEL_BITS {
                let tag = CollisionGroups::organism(prey);
                assert_eq!(
                    query.interacts(tag),
                    prey + 1 == predator,
                    "predator {predator} vs prey {prey}"
                );
            }
        }
    }

    #[test]
    fn retired_tag_matches_nothing() {
        for predator in 1..LEVEL_BITS {
            let query = CollisionGroups::prey_query(predator).unwrap();
            assert!(!query.interacts(CollisionGroups::NONE));
        }
    }

    #[test]
    fn level_bit_roundtrip() {
        for level in 0..LEVEL_BITS {
            assert_eq!(CollisionGroups::organism(level).level_bit_index(), Some(level));
        }
        assert_eq!(CollisionGroups::NONE.level_bit_index(), None);
        assert_eq!(CollisionGroups::organism(17).level_bit_index(), Some(1));
    }
}
