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

/// Malformed query graph descriptions and out-of-range relation lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate relation name `{0}`")]
    DuplicateRelation(String),
    #[error("no relation with id {0}")]
    UnknownRelation(RelationId),
    #[error("no relation named `{0}`")]
    UnknownRelationName(String),
    #[error("relation {0} cannot be paired with itself")]
    SelfPredicate(RelationId),
    #[error("a schema holds at most {limit} relations")]
    TooManyRelations { limit: u32 },
    #[error("relation `{name}` has invalid cardinality {value}")]
    InvalidCardinality { name: String, value: f64 },
    #[error("predicate between {left} and {right} has invalid selectivity {value}")]
    InvalidSelectivity {
        left: RelationId,
        right: RelationId,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
