/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use crate::forest::GroupId;
use shared::{RelationId, SchemaError};

/// Every way an optimization run can be aborted.
///
/// None of these are retried or patched up inside the optimizers; a caller
/// that wants resilience picks another strategy, e.g. DPSize when IKKBZ
/// reports [`ErrorKind::Structural`].
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("query graph has no relations")]
    EmptySchema,
    #[error("group 0 is the empty group")]
    EmptyGroup,
    #[error("no group with id {0}")]
    UnknownGroup(GroupId),
    #[error("root not set")]
    RootNotSet,
    #[error("query graph was not a tree: relation {relation} reached again from {parent}")]
    NotATree {
        relation: RelationId,
        parent: RelationId,
    },
    #[error("query graph is not connected: relation {relation} cannot be joined")]
    Disconnected { relation: RelationId },
    #[error("plan cost {cost} does not fit in an f64; statistics are too large")]
    CostOverflow { cost: f64 },
    #[error("rank of empty sequence not defined")]
    EmptySequence,
    #[error("unknown query {0:?}")]
    UnknownQuery(String),
    #[error("cannot read query graph from {path}")]
    QueryFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed query graph document")]
    QueryFormat(#[from] serde_json::Error),
}

/// Coarse classification of [`OptimizerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed schema, out-of-range relation, or statistics whose plan
    /// costs overflow.
    Schema,
    /// The query graph has a shape the optimizer cannot handle.
    Structural,
    /// An internal precondition was violated by the caller.
    Invariant,
    /// The driver asked for a query that does not exist or cannot be read.
    Input,
}

impl OptimizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptimizerError::Schema(_)
            | OptimizerError::EmptySchema
            | OptimizerError::CostOverflow { .. } => ErrorKind::Schema,
            OptimizerError::NotATree { .. } | OptimizerError::Disconnected { .. } => {
                ErrorKind::Structural
            }
            OptimizerError::EmptyGroup
            | OptimizerError::UnknownGroup(_)
            | OptimizerError::RootNotSet
            | OptimizerError::EmptySequence => ErrorKind::Invariant,
            OptimizerError::UnknownQuery(_)
            | OptimizerError::QueryFile { .. }
            | OptimizerError::QueryFormat(_) => ErrorKind::Input,
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
