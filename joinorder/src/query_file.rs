/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Query graphs stored as JSON.
//!
//! ```json
//! {
//!   "relations": [{ "name": "A", "cardinality": 100 }, { "name": "B", "cardinality": 10 }],
//!   "predicates": [{ "left": "A", "right": "B", "selectivity": 0.01 }]
//! }
//! ```
//!
//! Relations get ids in the order they are listed. Predicates name their
//! relations, and repeated predicates over one pair multiply.

use crate::error::{OptimizerError, Result};
use serde::{Deserialize, Serialize};
use shared::{Builder, Cardinality, Schema, Selectivity};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSpec {
    pub name: String,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    pub left: String,
    pub right: String,
    pub selectivity: Selectivity,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryGraph {
    pub relations: Vec<RelationSpec>,
    #[serde(default)]
    pub predicates: Vec<PredicateSpec>,
}

impl QueryGraph {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| OptimizerError::QueryFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Validates the graph and builds the schema.
    pub fn into_schema(self) -> Result<Schema> {
        let mut builder = Builder::new();
        for relation in self.relations {
            builder.add_relation(relation.name, relation.cardinality)?;
        }
        for predicate in &self.predicates {
            let left = builder.relation_by_name(&predicate.left)?;
            let right = builder.relation_by_name(&predicate.right)?;
            builder.add_predicate(left, right, predicate.selectivity)?;
        }
        Ok(builder.build())
    }
}
