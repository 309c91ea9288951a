/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use crate::relset::RelSet;
use rustc_hash::FxHashMap;

/// Maps relation sets to a payload, keyed by the set's bit encoding.
#[derive(Debug, Clone)]
pub struct RelSetMap<V> {
    entries: FxHashMap<u64, V>,
}

impl<V> RelSetMap<V> {
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Stores `value` for `set`, returning the value it replaced.
    pub fn insert(&mut self, set: RelSet, value: V) -> Option<V> {
        self.entries.insert(set.bits(), value)
    }

    pub fn get(&self, set: RelSet) -> Option<&V> {
        self.entries.get(&set.bits())
    }

    pub fn contains(&self, set: RelSet) -> bool {
        self.entries.contains_key(&set.bits())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (RelSet, &V)> + '_ {
        self.entries
            .iter()
            .map(|(&bits, value)| (RelSet::from_bits(bits), value))
    }
}

impl<V> Default for RelSetMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationId;

    fn set(ids: &[u32]) -> RelSet {
        ids.iter().map(|&i| RelationId::new(i)).collect()
    }

    #[test]
    fn test_lookup_ignores_insertion_order() {
        let mut m = RelSetMap::new();
        assert_eq!(m.insert(set(&[1, 3]), 7), None);
        assert_eq!(m.get(set(&[3, 1])), Some(&7));
        assert_eq!(m.get(set(&[1])), None);
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let mut m = RelSetMap::new();
        m.insert(set(&[2]), 1usize);
        assert_eq!(m.insert(set(&[2]), 4), Some(1));
        assert_eq!(m.len(), 1);
        assert!(m.contains(set(&[2])));
    }

    #[test]
    fn test_iter_returns_keys() {
        let mut m = RelSetMap::new();
        m.insert(set(&[1, 2]), "ab");
        m.insert(set(&[5]), "e");
        let mut keys: Vec<RelSet> = m.iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec![set(&[1, 2]), set(&[5])]);
    }
}
