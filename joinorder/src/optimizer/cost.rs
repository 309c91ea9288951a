/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use crate::error::{OptimizerError, Result};
use shared::{RelationId, Schema};

/// Estimated number of rows materialized when joining `sequence` left-deep,
/// counting the first relation's scan.
///
/// Each relation after the first multiplies the running row count by its
/// cardinality and by its selectivity against every relation before it.
pub fn left_deep_cost(schema: &Schema, sequence: &[RelationId]) -> Result<f64> {
    let (&first, _) = sequence
        .split_first()
        .ok_or(OptimizerError::EmptySequence)?;

    let mut rows = schema.cardinality(first)?;
    let mut cost = rows;
    for (i, &next) in sequence.iter().enumerate().skip(1) {
        for &previous in &sequence[..i] {
            rows *= schema.selectivity(next, previous)?;
        }
        rows *= schema.cardinality(next)?;
        cost += rows;
    }
    Ok(cost)
}
