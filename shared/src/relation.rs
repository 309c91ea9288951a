/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated number of rows produced by a relation or a join.
pub type Cardinality = f64;

/// Fraction of a cross product that survives a join predicate.
pub type Selectivity = f64;

/// Identifier of a relation inside a [`Schema`](crate::schema::Schema).
///
/// Ids are dense and start at 1; there is no relation 0.
#[derive(PartialEq, Debug, Clone, Copy, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationId(u32);

impl RelationId {
    pub const fn new(id: u32) -> Self {
        RelationId(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position, for indexing per-relation vectors.
    pub fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }
}

impl From<u32> for RelationId {
    fn from(id: u32) -> Self {
        RelationId(id)
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A base relation of the query graph.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub name: String,
    pub cardinality: Cardinality,
}

/// A candidate left-deep join order.
pub type Sequence = Vec<RelationId>;
