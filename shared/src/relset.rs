/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use crate::relation::RelationId;
use std::fmt;

/// An immutable set of relations stored as a single machine word.
///
/// Relation `i` lives at bit `i`, so bit 0 is never set and a set holds at
/// most [`RelSet::CAPACITY`] relations. Schemas with more relations are
/// rejected by the [`Builder`](crate::schema::Builder) rather than spilled
/// into a wider representation.
///
/// Statistics have a similar ceiling: cardinalities and selectivities are
/// `f64`, and a plan whose estimated cost exceeds `f64::MAX` cannot be
/// ranked. The builder accepts any finite value; the orderers report such
/// plans as a cost overflow instead of returning them.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelSet(u64);

impl RelSet {
    /// Highest relation id a set can hold.
    pub const CAPACITY: u32 = u64::BITS - 1;

    pub const fn empty() -> Self {
        RelSet(0)
    }

    pub fn singleton(id: RelationId) -> Self {
        RelSet::empty().with(id)
    }

    /// Rebuilds a set from the value returned by [`RelSet::bits`].
    pub fn from_bits(bits: u64) -> Self {
        RelSet(bits & !1)
    }

    /// The canonical integer encoding of the set.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Returns a copy of this set that also contains `id`.
    pub fn with(self, id: RelationId) -> Self {
        let bit = id.get();
        assert!(
            bit >= 1 && bit <= Self::CAPACITY,
            "relation id {} does not fit in a RelSet",
            bit
        );
        RelSet(self.0 | (1u64 << bit))
    }

    pub fn contains(self, id: RelationId) -> bool {
        let bit = id.get();
        bit >= 1 && bit <= Self::CAPACITY && self.0 & (1u64 << bit) != 0
    }

    pub fn union(self, other: RelSet) -> RelSet {
        RelSet(self.0 | other.0)
    }

    pub fn intersects(self, other: RelSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_subset(self, other: RelSet) -> bool {
        self.0 & other.0 == self.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending id order.
    pub fn iter(self) -> RelSetIter {
        RelSetIter { remaining: self.0 }
    }
}

pub struct RelSetIter {
    remaining: u64,
}

impl Iterator for RelSetIter {
    type Item = RelationId;

    fn next(&mut self) -> Option<RelationId> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros();
        self.remaining &= self.remaining - 1;
        Some(RelationId::new(bit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

impl IntoIterator for RelSet {
    type Item = RelationId;
    type IntoIter = RelSetIter;

    fn into_iter(self) -> RelSetIter {
        self.iter()
    }
}

impl FromIterator<RelationId> for RelSet {
    fn from_iter<I: IntoIterator<Item = RelationId>>(iter: I) -> Self {
        iter.into_iter().fold(RelSet::empty(), RelSet::with)
    }
}

impl fmt::Debug for RelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelSet{}", self)
    }
}

impl fmt::Display for RelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str("}")
    }
}
