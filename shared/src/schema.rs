/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The query graph: relations with cardinalities, and pairwise join
//! selectivities between them.
//!
//! A [`Schema`] is assembled once through a [`Builder`] and is read-only
//! afterwards. Two relations are *adjacent* when at least one predicate was
//! declared between them, whatever its selectivity; pairs without a predicate
//! have selectivity 1.

use crate::error::{Result, SchemaError};
use crate::relation::{Cardinality, Relation, RelationId, Selectivity};
use crate::relset::RelSet;
use std::collections::HashMap;

/// Position of the unordered pair `{a, b}` in a packed lower-triangular table.
fn pair_index(a: RelationId, b: RelationId) -> usize {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (lo, hi) = (lo.index(), hi.index());
    hi * (hi - 1) / 2 + lo
}

/// Immutable description of the relations to join.
#[derive(Debug, Clone)]
pub struct Schema {
    relations: Vec<Relation>,
    // None when no predicate was declared for the pair.
    selectivities: Vec<Option<Selectivity>>,
    name_to_id: HashMap<String, RelationId>,
}

impl Schema {
    pub fn num_rels(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.iter()
    }

    /// Every relation id, ascending.
    pub fn relation_ids(&self) -> impl Iterator<Item = RelationId> {
        (1..=self.relations.len() as u32).map(RelationId::new)
    }

    /// The set of all relations in the schema.
    pub fn all(&self) -> RelSet {
        self.relation_ids().collect()
    }

    pub fn relation(&self, id: RelationId) -> Result<&Relation> {
        self.relations
            .get(id.index())
            .ok_or(SchemaError::UnknownRelation(id))
    }

    pub fn relation_by_name(&self, name: &str) -> Result<RelationId> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownRelationName(name.to_string()))
    }

    pub fn name(&self, id: RelationId) -> Result<&str> {
        self.relation(id).map(|r| r.name.as_str())
    }

    pub fn cardinality(&self, id: RelationId) -> Result<Cardinality> {
        self.relation(id).map(|r| r.cardinality)
    }

    fn declared(&self, a: RelationId, b: RelationId) -> Result<Option<Selectivity>> {
        self.relation(a)?;
        self.relation(b)?;
        if a == b {
            return Err(SchemaError::SelfPredicate(a));
        }
        Ok(self.selectivities[pair_index(a, b)])
    }

    /// Product of every predicate declared between `a` and `b`, or 1.
    pub fn selectivity(&self, a: RelationId, b: RelationId) -> Result<Selectivity> {
        Ok(self.declared(a, b)?.unwrap_or(1.0))
    }

    /// True iff a predicate was declared between `a` and `b`.
    pub fn adjacent(&self, a: RelationId, b: RelationId) -> Result<bool> {
        Ok(self.declared(a, b)?.is_some())
    }

    /// Relations adjacent to `id`.
    pub fn neighbors(&self, id: RelationId) -> Result<RelSet> {
        self.relation(id)?;
        let mut result = RelSet::empty();
        for other in self.relation_ids() {
            if other != id && self.adjacent(id, other)? {
                result = result.with(other);
            }
        }
        Ok(result)
    }

    /// True iff some relation of `left` is adjacent to some relation of `right`.
    pub fn subgraphs_adjacent(&self, left: RelSet, right: RelSet) -> Result<bool> {
        for a in left {
            for b in right {
                if self.adjacent(a, b)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Selectivity of joining two disjoint subtrees: the product over every
    /// cross pair. Pairs without a predicate contribute 1.
    pub fn complex_selectivity(&self, left: RelSet, right: RelSet) -> Result<Selectivity> {
        let mut sel = 1.0;
        for a in left {
            for b in right {
                sel *= self.selectivity(a, b)?;
            }
        }
        Ok(sel)
    }
}

/// Accumulates relations and predicates, then freezes them into a [`Schema`].
#[derive(Debug, Default)]
pub struct Builder {
    relations: Vec<Relation>,
    selectivities: Vec<Option<Selectivity>>,
    name_to_id: HashMap<String, RelationId>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_rels(&self) -> usize {
        self.relations.len()
    }

    pub fn relation_by_name(&self, name: &str) -> Result<RelationId> {
        self.name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownRelationName(name.to_string()))
    }

    /// Adds a relation and returns its id. Ids are handed out from 1 upwards.
    pub fn add_relation(
        &mut self,
        name: impl Into<String>,
        cardinality: Cardinality,
    ) -> Result<RelationId> {
        let name = name.into();
        if self.name_to_id.contains_key(&name) {
            return Err(SchemaError::DuplicateRelation(name));
        }
        if self.relations.len() >= RelSet::CAPACITY as usize {
            return Err(SchemaError::TooManyRelations {
                limit: RelSet::CAPACITY,
            });
        }
        if !cardinality.is_finite() || cardinality <= 0.0 {
            return Err(SchemaError::InvalidCardinality {
                name,
                value: cardinality,
            });
        }

        // The new relation pairs with every relation added before it.
        let existing = self.relations.len();
        self.selectivities.extend(std::iter::repeat(None).take(existing));

        let id = RelationId::new(existing as u32 + 1);
        self.name_to_id.insert(name.clone(), id);
        self.relations.push(Relation {
            id,
            name,
            cardinality,
        });
        Ok(id)
    }

    /// Declares a predicate between `a` and `b`. Repeated predicates on the
    /// same pair multiply together.
    pub fn add_predicate(
        &mut self,
        a: RelationId,
        b: RelationId,
        selectivity: Selectivity,
    ) -> Result<()> {
        for id in [a, b] {
            if self.relations.get(id.index()).is_none() {
                return Err(SchemaError::UnknownRelation(id));
            }
        }
        if a == b {
            return Err(SchemaError::SelfPredicate(a));
        }
        if !selectivity.is_finite() || selectivity <= 0.0 {
            return Err(SchemaError::InvalidSelectivity {
                left: a,
                right: b,
                value: selectivity,
            });
        }

        let slot = &mut self.selectivities[pair_index(a, b)];
        *slot = Some(slot.unwrap_or(1.0) * selectivity);
        Ok(())
    }

    pub fn build(self) -> Schema {
        Schema {
            relations: self.relations,
            selectivities: self.selectivities,
            name_to_id: self.name_to_id,
        }
    }
}
