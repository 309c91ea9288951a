/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use super::cost::left_deep_cost;
use super::JoinOrderer;
use crate::error::{OptimizerError, Result};
use crate::forest::{Forest, GroupId};

use log::debug;
use shared::{RelationId, Schema, Sequence};

/// Scores every permutation of the relations with [`left_deep_cost`].
///
/// Factorial in the number of relations; meant as a reference for the other
/// orderers on small graphs.
pub struct BruteForceOrderer<'s> {
    schema: &'s Schema,
}

impl<'s> BruteForceOrderer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// The cheapest permutation and its cost. The first permutation reached
    /// wins a tie.
    pub fn best_order(&self) -> Result<(Sequence, f64)> {
        if self.schema.is_empty() {
            return Err(OptimizerError::EmptySchema);
        }

        let mut start: Sequence = self.schema.relation_ids().collect();
        let mut best: Option<(Sequence, f64)> = None;
        permute(&mut start, 0, &mut |ordering| {
            let cost = left_deep_cost(self.schema, ordering)?;
            if best.as_ref().map_or(true, |(_, b)| cost < *b) {
                best = Some((ordering.to_vec(), cost));
            }
            Ok(())
        })?;

        let (sequence, cost) = best.ok_or(OptimizerError::EmptySchema)?;
        if !cost.is_finite() {
            return Err(OptimizerError::CostOverflow { cost });
        }
        Ok((sequence, cost))
    }
}

/// Calls `visit` with every ordering of `items[k..]`.
fn permute(
    items: &mut [RelationId],
    k: usize,
    visit: &mut dyn FnMut(&[RelationId]) -> Result<()>,
) -> Result<()> {
    if k == items.len() {
        return visit(items);
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit)?;
        items.swap(k, i);
    }
    Ok(())
}

impl JoinOrderer for BruteForceOrderer<'_> {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn order(&mut self, forest: &mut Forest<'_>) -> Result<GroupId> {
        debug_assert!(std::ptr::eq(forest.schema(), self.schema));
        let (sequence, cost) = self.best_order()?;
        debug!("brute-force: best order {:?} costs {}", sequence, cost);
        forest.add_left_deep(&sequence)
    }
}
