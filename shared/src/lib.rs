/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
pub mod error;
pub mod relation;
pub mod relset;
pub mod relset_map;
pub mod schema;

pub use error::SchemaError;
pub use relation::{Cardinality, Relation, RelationId, Selectivity, Sequence};
pub use relset::RelSet;
pub use relset_map::RelSetMap;
pub use schema::{Builder, Schema};
