/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
use super::{first_unreachable, JoinOrderer};
use crate::error::{OptimizerError, Result};
use crate::forest::{Forest, GroupId};

use log::{debug, trace};
use rustc_hash::FxHashMap;
use shared::{Cardinality, RelSetMap, Schema};

/// Estimated size and cost of a plan stored in the forest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStats {
    /// Sum of the output rows of every join in the plan.
    pub cost: f64,
    pub cardinality: Cardinality,
}

/// Exhaustive bushy join ordering by dynamic programming over subset sizes.
///
/// Level `s` holds the cheapest known plan for every connected set of `s`
/// relations. Plans for level `s` are built by joining a plan of level `s1`
/// with a disjoint, adjacent plan of level `s - s1`. The single plan on the
/// last level is optimal under the additive cost model.
///
/// Runtime is exponential in the number of relations.
pub struct DpSizeOrderer<'s> {
    schema: &'s Schema,
    stats: FxHashMap<GroupId, PlanStats>,
}

impl<'s> DpSizeOrderer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            stats: FxHashMap::default(),
        }
    }

    /// Cost and cardinality of a plan built by this orderer.
    pub fn stats(&self, group: GroupId) -> Option<PlanStats> {
        self.stats.get(&group).copied()
    }

    fn known(&self, group: GroupId) -> Result<PlanStats> {
        self.stats(group).ok_or(OptimizerError::UnknownGroup(group))
    }

    fn seed_leaves(&mut self, forest: &mut Forest<'_>) -> Result<Vec<GroupId>> {
        let mut units = Vec::with_capacity(self.schema.num_rels());
        for relation in self.schema.relation_ids() {
            let leaf = forest.add_leaf(relation)?;
            self.stats.insert(
                leaf,
                PlanStats {
                    cost: 0.0,
                    cardinality: self.schema.cardinality(relation)?,
                },
            );
            units.push(leaf);
        }
        Ok(units)
    }

    /// Builds every plan of `size` relations from the smaller levels.
    fn build_level(
        &mut self,
        forest: &mut Forest<'_>,
        levels: &[Vec<GroupId>],
        size: usize,
    ) -> Result<Vec<GroupId>> {
        // Best plans of this level, in the order their relation sets were
        // first reached, plus an index from relation set to position.
        let mut level: Vec<GroupId> = Vec::new();
        let mut bests: RelSetMap<usize> = RelSetMap::new();

        for left_size in 1..size {
            let right_size = size - left_size;
            for &left in &levels[left_size] {
                for &right in &levels[right_size] {
                    let left_members = forest.members(left)?;
                    let right_members = forest.members(right)?;

                    if left_members.intersects(right_members) {
                        continue;
                    }
                    if !self
                        .schema
                        .subgraphs_adjacent(left_members, right_members)?
                    {
                        continue;
                    }

                    let l = self.known(left)?;
                    let r = self.known(right)?;
                    let sel = self
                        .schema
                        .complex_selectivity(left_members, right_members)?;
                    let cardinality = l.cardinality * r.cardinality * sel;
                    let cost = l.cost + r.cost + cardinality;

                    let resulting_set = left_members.union(right_members);
                    let old_best = bests.get(resulting_set).copied();
                    if let Some(idx) = old_best {
                        // Ties keep the plan found first.
                        if cost >= self.known(level[idx])?.cost {
                            continue;
                        }
                    }

                    let join = forest.add_join(left, right)?;
                    self.stats.insert(join, PlanStats { cost, cardinality });
                    trace!(
                        "dpsize: {} = {} ⋈ {} covers {} at cost {}",
                        join,
                        left,
                        right,
                        resulting_set,
                        cost
                    );

                    match old_best {
                        Some(idx) => level[idx] = join,
                        None => {
                            bests.insert(resulting_set, level.len());
                            level.push(join);
                        }
                    }
                }
            }
        }
        Ok(level)
    }
}

impl JoinOrderer for DpSizeOrderer<'_> {
    fn name(&self) -> &'static str {
        "dpsize"
    }

    fn order(&mut self, forest: &mut Forest<'_>) -> Result<GroupId> {
        debug_assert!(std::ptr::eq(forest.schema(), self.schema));

        let num_rels = self.schema.num_rels();
        if num_rels == 0 {
            return Err(OptimizerError::EmptySchema);
        }
        if let Some(relation) = first_unreachable(self.schema)? {
            return Err(OptimizerError::Disconnected { relation });
        }

        // levels[s] holds plans covering s relations; levels[0] stays empty.
        let mut levels: Vec<Vec<GroupId>> = vec![Vec::new()];
        let units = self.seed_leaves(forest)?;
        levels.push(units);

        for size in 2..=num_rels {
            let level = self.build_level(forest, &levels, size)?;
            debug!("dpsize: level {} has {} plans", size, level.len());
            levels.push(level);
        }

        // Connectivity was checked up front, so the last level holds exactly
        // one plan and it covers every relation.
        let best = levels[num_rels]
            .first()
            .copied()
            .ok_or(OptimizerError::EmptyGroup)?;

        let cost = self.known(best)?.cost;
        if !cost.is_finite() {
            return Err(OptimizerError::CostOverflow { cost });
        }
        debug!("dpsize: best plan {} costs {}", best, cost);
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries;
    use shared::Builder;

    fn run(schema: &Schema) -> (String, f64) {
        let mut forest = Forest::new(schema);
        let mut orderer = DpSizeOrderer::new(schema);
        let root = orderer.order(&mut forest).unwrap();
        (
            forest.format_string(root).unwrap(),
            orderer.stats(root).unwrap().cost,
        )
    }

    #[test]
    fn test_bushy_plan() {
        let (plan, cost) = run(&queries::bushy().unwrap());
        assert_eq!(plan, "((A ⋈ B) ⋈ (C ⋈ D))");
        assert!((cost - 25214600.0).abs() < 1e-3);
    }

    #[test]
    fn test_three_way() {
        let (plan, cost) = run(&queries::three_way().unwrap());
        assert_eq!(plan, "(C ⋈ (A ⋈ B))");
        assert!((cost - 2500500.0).abs() < 1e-3);
    }

    #[test]
    fn test_chain() {
        let (plan, cost) = run(&queries::chain().unwrap());
        assert_eq!(plan, "(F ⋈ (E ⋈ (C ⋈ (A ⋈ (B ⋈ D)))))");
        assert!((cost - 220048.0).abs() < 1e-3);
    }

    #[test]
    fn test_cross_pairs_are_pruned() {
        let mut builder = Builder::new();
        let a = builder.add_relation("A", 1000.0).unwrap();
        let b = builder.add_relation("B", 1000.0).unwrap();
        let c = builder.add_relation("C", 1000.0).unwrap();
        let d = builder.add_relation("D", 1000.0).unwrap();
        builder.add_predicate(a, b, 0.0000001).unwrap();
        builder.add_predicate(a, c, 0.5).unwrap();
        builder.add_predicate(c, d, 0.0000001).unwrap();
        let s = builder.build();

        let mut forest = Forest::new(&s);
        let root = DpSizeOrderer::new(&s).order(&mut forest).unwrap();
        assert_eq!(forest.members(root).unwrap(), s.all());
        // A and D are never joined directly.
        let text = forest.format_string(root).unwrap();
        assert!(!text.contains("(A ⋈ D)") && !text.contains("(D ⋈ A)"));
        assert_eq!(text, "((A ⋈ B) ⋈ (C ⋈ D))");
    }

    #[test]
    fn test_single_relation() {
        let mut builder = Builder::new();
        builder.add_relation("A", 10.0).unwrap();
        let s = builder.build();
        let (plan, cost) = run(&s);
        assert_eq!(plan, "A");
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_empty_and_disconnected_graphs() {
        let empty = Builder::new().build();
        let mut forest = Forest::new(&empty);
        assert!(matches!(
            DpSizeOrderer::new(&empty).order(&mut forest),
            Err(OptimizerError::EmptySchema)
        ));

        let mut builder = Builder::new();
        builder.add_relation("A", 10.0).unwrap();
        builder.add_relation("B", 10.0).unwrap();
        let s = builder.build();
        let mut forest = Forest::new(&s);
        assert!(matches!(
            DpSizeOrderer::new(&s).order(&mut forest),
            Err(OptimizerError::Disconnected { .. })
        ));
    }

    #[test]
    fn test_overflowing_costs_are_reported() {
        let mut builder = Builder::new();
        let a = builder.add_relation("A", 1e200).unwrap();
        let b = builder.add_relation("B", 1e200).unwrap();
        let c = builder.add_relation("C", 1e200).unwrap();
        builder.add_predicate(a, b, 1.0).unwrap();
        builder.add_predicate(b, c, 1.0).unwrap();
        let s = builder.build();

        let mut forest = Forest::new(&s);
        let err = DpSizeOrderer::new(&s).order(&mut forest).unwrap_err();
        assert!(matches!(err, OptimizerError::CostOverflow { cost } if cost.is_infinite()));
    }

    #[test]
    fn test_cycles_are_accepted() {
        let s = queries::triangle().unwrap();
        let mut forest = Forest::new(&s);
        let root = DpSizeOrderer::new(&s).order(&mut forest).unwrap();
        assert_eq!(forest.members(root).unwrap().len(), 3);
    }
}
