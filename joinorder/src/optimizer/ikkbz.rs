/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Left-deep join ordering for tree-shaped query graphs, after Ibaraki and
//! Kameda.
//!
//! For each candidate root the query graph is turned into a rooted tree, so
//! every non-root relation has exactly one parent and its selectivity becomes
//! the selectivity against that parent. Subtrees are solved bottom-up into
//! chains of non-decreasing rank, the chains of sibling subtrees are merged
//! by rank, and the cheapest root wins.
//!
//! Only one normalization pass runs per subtree: a piece whose rank is lower
//! than the piece before it is folded into that piece. Inversions across
//! subtree boundaries that this pass leaves behind are not repaired.

use super::JoinOrderer;
use crate::error::{OptimizerError, Result};
use crate::forest::{Forest, GroupId};

use log::{debug, trace};
use shared::{RelSet, RelationId, Schema, Selectivity, Sequence};
use std::collections::VecDeque;

/// The winning order of a full IKKBZ run.
#[derive(Debug, Clone, PartialEq)]
pub struct RootedOrder {
    pub root: RelationId,
    pub sequence: Sequence,
    /// `C(sequence)` under `root`.
    pub cost: f64,
}

pub struct IkkbzOrderer<'s> {
    schema: &'s Schema,
    root: Option<RelationId>,
    // Indexed by RelationId::index(); None for the root.
    parents: Vec<Option<RelationId>>,
}

impl<'s> IkkbzOrderer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            root: None,
            parents: vec![None; schema.num_rels()],
        }
    }

    pub fn root(&self) -> Option<RelationId> {
        self.root
    }

    /// Roots the query graph at `root`, giving every other relation a parent.
    ///
    /// Fails if some relation is reachable along two different paths (the
    /// graph has a cycle) or not at all.
    pub fn set_root(&mut self, root: RelationId) -> Result<()> {
        self.schema.relation(root)?;
        self.root = None;

        let mut parents = vec![None; self.schema.num_rels()];
        let mut placed = RelSet::singleton(root);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for next in self.schema.neighbors(node)? {
                if parents[node.index()] == Some(next) {
                    continue;
                }
                if placed.contains(next) {
                    return Err(OptimizerError::NotATree {
                        relation: next,
                        parent: node,
                    });
                }
                parents[next.index()] = Some(node);
                placed = placed.with(next);
                stack.push(next);
            }
        }

        if let Some(relation) = self.schema.relation_ids().find(|r| !placed.contains(*r)) {
            return Err(OptimizerError::Disconnected { relation });
        }

        self.parents = parents;
        self.root = Some(root);
        Ok(())
    }

    pub fn parent(&self, relation: RelationId) -> Option<RelationId> {
        self.parents.get(relation.index()).copied().flatten()
    }

    /// Selectivity of `relation` against its parent; 1 for the root.
    pub fn rooted_selectivity(&self, relation: RelationId) -> Result<Selectivity> {
        let root = self.root.ok_or(OptimizerError::RootNotSet)?;
        self.schema.relation(relation)?;
        if relation == root {
            return Ok(1.0);
        }
        match self.parent(relation) {
            Some(parent) => Ok(self.schema.selectivity(relation, parent)?),
            None => Err(OptimizerError::Disconnected { relation }),
        }
    }

    fn contribution(&self, relation: RelationId) -> Result<f64> {
        Ok(self.rooted_selectivity(relation)? * self.schema.cardinality(relation)?)
    }

    /// The factor by which `s` multiplies the row count: `T` in Ibaraki and
    /// Kameda.
    pub fn t(&self, s: &[RelationId]) -> Result<f64> {
        s.iter()
            .try_fold(1.0, |acc, &r| Ok(acc * self.contribution(r)?))
    }

    /// The cost function from Ibaraki and Kameda.
    ///
    ///   C(S1 S2) = C(S1) + T(S1) C(S2)
    pub fn c(&self, s: &[RelationId]) -> Result<f64> {
        let mut cost = 0.0;
        let mut factor = 1.0;
        for &r in s {
            let contribution = self.contribution(r)?;
            cost += factor * contribution;
            factor *= contribution;
        }
        Ok(cost)
    }

    /// The rank function from Ibaraki and Kameda, `(T(s) - 1) / C(s)`.
    pub fn rank(&self, s: &[RelationId]) -> Result<f64> {
        if s.is_empty() {
            return Err(OptimizerError::EmptySequence);
        }
        Ok((self.t(s)? - 1.0) / self.c(s)?)
    }

    /// Children of `relation` in the current rooting, ascending by id.
    pub fn children_of(&self, relation: RelationId) -> Vec<RelationId> {
        self.schema
            .relation_ids()
            .filter(|&r| self.parent(r) == Some(relation))
            .collect()
    }

    /// Roots the graph at `root` and returns its rank-ordered chains.
    pub fn solve_root(&mut self, root: RelationId) -> Result<Vec<Sequence>> {
        self.set_root(root)?;
        self.solve_wedge(root)
    }

    fn solve_wedge(&self, relation: RelationId) -> Result<Vec<Sequence>> {
        let mut chains = Vec::new();
        for child in self.children_of(relation) {
            chains.push(VecDeque::from(self.solve_wedge(child)?));
        }

        // Repeatedly take the lowest-ranked chain head; the earliest chain
        // wins a tie.
        let mut merged: Vec<Sequence> = vec![vec![relation]];
        loop {
            let mut lowest: Option<(usize, f64)> = None;
            for (i, chain) in chains.iter().enumerate() {
                if let Some(head) = chain.front() {
                    let rank = self.rank(head)?;
                    if lowest.map_or(true, |(_, best)| rank < best) {
                        lowest = Some((i, rank));
                    }
                }
            }
            let Some((i, _)) = lowest else {
                break;
            };
            merged.extend(chains[i].pop_front());
        }

        // Ranks must not decrease along the order; fold inversions together.
        let mut compressed: Vec<Sequence> = Vec::with_capacity(merged.len());
        for piece in merged {
            let fold = match compressed.last() {
                Some(previous) => self.rank(&piece)? < self.rank(previous)?,
                None => false,
            };
            match compressed.last_mut() {
                Some(previous) if fold => previous.extend(piece),
                _ => compressed.push(piece),
            }
        }

        trace!("ikkbz: wedge at {} -> {:?}", relation, compressed);
        Ok(compressed)
    }

    /// Tries every root and returns the cheapest flattened order.
    ///
    /// Leaves the orderer rooted at the winning root.
    pub fn best_order(&mut self) -> Result<RootedOrder> {
        if self.schema.is_empty() {
            return Err(OptimizerError::EmptySchema);
        }

        let mut best: Option<RootedOrder> = None;
        for root in self.schema.relation_ids() {
            let sequence: Sequence = self.solve_root(root)?.into_iter().flatten().collect();
            let cost = self.c(&sequence)?;
            debug!("ikkbz: root {} gives cost {}", root, cost);
            if best.as_ref().map_or(true, |b| cost < b.cost) {
                best = Some(RootedOrder {
                    root,
                    sequence,
                    cost,
                });
            }
        }

        let best = best.ok_or(OptimizerError::EmptySchema)?;
        if !best.cost.is_finite() {
            return Err(OptimizerError::CostOverflow { cost: best.cost });
        }
        self.set_root(best.root)?;
        debug!("ikkbz: best root {} with cost {}", best.root, best.cost);
        Ok(best)
    }

    /// The cheapest left-deep order over all roots.
    pub fn order_sequence(&mut self) -> Result<Sequence> {
        self.best_order().map(|o| o.sequence)
    }
}

impl JoinOrderer for IkkbzOrderer<'_> {
    fn name(&self) -> &'static str {
        "ikkbz"
    }

    fn order(&mut self, forest: &mut Forest<'_>) -> Result<GroupId> {
        debug_assert!(std::ptr::eq(forest.schema(), self.schema));
        let sequence = self.order_sequence()?;
        let root = forest.add_left_deep(&sequence)?;
        debug!("ikkbz: materialized {} relations as {}", sequence.len(), root);
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries;

    fn id(i: u32) -> RelationId {
        RelationId::new(i)
    }

    fn seq(ids: &[u32]) -> Sequence {
        ids.iter().map(|&i| id(i)).collect()
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
    }

    #[test]
    fn test_rooting() {
        let s = queries::chain().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        o.set_root(id(3)).unwrap();

        //       3
        //     /   \
        //    2     5
        //  /   \   |
        // 1     4  6
        assert_eq!(o.parent(id(3)), None);
        assert_eq!(o.parent(id(2)), Some(id(3)));
        assert_eq!(o.parent(id(1)), Some(id(2)));
        assert_eq!(o.parent(id(4)), Some(id(2)));
        assert_eq!(o.parent(id(6)), Some(id(5)));
        assert_eq!(o.children_of(id(2)), vec![id(1), id(4)]);
        assert_eq!(o.children_of(id(3)), vec![id(2), id(5)]);
    }

    #[test]
    fn test_rooted_selectivity() {
        let s = queries::chain().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        assert!(matches!(
            o.rooted_selectivity(id(3)),
            Err(OptimizerError::RootNotSet)
        ));
        o.set_root(id(3)).unwrap();

        assert_eq!(o.rooted_selectivity(id(3)).unwrap(), 1.0);
        // Selectivity of 2 with its parent 3.
        assert_eq!(o.rooted_selectivity(id(2)).unwrap(), 0.1);
        // Selectivity of 6 with its parent 5.
        assert_eq!(o.rooted_selectivity(id(6)).unwrap(), 0.0001);
    }

    #[test]
    fn test_rank_functions() {
        let s = queries::chain().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        o.set_root(id(3)).unwrap();

        for (s, expected) in [
            (seq(&[]), 1.0),
            (seq(&[1]), 1.0),
            (seq(&[2]), 1.0),
            (seq(&[3]), 100.0),
            (seq(&[3, 5]), 50000.0),
        ] {
            let actual = o.t(&s).unwrap();
            assert!(close(actual, expected), "T({:?}) = {}, not {}", s, actual, expected);
        }

        for (s, expected) in [
            (seq(&[]), 0.0),
            (seq(&[1]), 1.0),
            (seq(&[2]), 1.0),
            (seq(&[3]), 100.0),
            (seq(&[3, 5]), 50100.0),
            (seq(&[2, 4, 1, 3, 5, 6]), 220041.8),
            (seq(&[2, 1, 4, 3, 5, 6]), 220042.4),
        ] {
            let actual = o.c(&s).unwrap();
            assert!(close(actual, expected), "C({:?}) = {}, not {}", s, actual, expected);
        }

        for (s, expected) in [
            (seq(&[1]), 0.0),
            (seq(&[2]), 0.0),
            (seq(&[3]), 0.99),
            (seq(&[4]), -1.4999999999999998),
            (seq(&[5]), 0.998),
            (seq(&[6]), 0.9),
            (seq(&[3, 5]), 0.9979840319361277),
            (seq(&[2, 4, 1, 3, 5, 6]), 0.9089136700390562),
            (seq(&[2, 1, 4, 3, 5, 6]), 0.9089111916612435),
        ] {
            let actual = o.rank(&s).unwrap();
            assert!(close(actual, expected), "R({:?}) = {}, not {}", s, actual, expected);
        }

        assert!(matches!(o.rank(&[]), Err(OptimizerError::EmptySequence)));
    }

    #[test]
    fn test_solve_root_normalizes_chains() {
        let s = queries::chain().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        assert_eq!(
            o.solve_root(id(3)).unwrap(),
            vec![seq(&[3, 2, 4, 1]), seq(&[5, 6])]
        );
        assert_eq!(
            o.solve_root(id(2)).unwrap(),
            vec![seq(&[2, 4, 1]), seq(&[3]), seq(&[5, 6])]
        );
    }

    #[test]
    fn test_best_root_on_chain() {
        let s = queries::chain().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        let best = o.best_order().unwrap();
        assert_eq!(best.root, id(2));
        assert_eq!(best.sequence, seq(&[2, 4, 1, 3, 5, 6]));
        assert!(close(best.cost, 220058.0));
        assert_eq!(o.root(), Some(id(2)));

        let mut forest = Forest::new(&s);
        let g = o.order(&mut forest).unwrap();
        assert_eq!(
            forest.format_string(g).unwrap(),
            "(((((B ⋈ D) ⋈ A) ⋈ C) ⋈ E) ⋈ F)"
        );
    }

    #[test]
    fn test_best_root_is_no_worse_than_any_root() {
        for s in [queries::chain().unwrap(), queries::star().unwrap()] {
            let mut o = IkkbzOrderer::new(&s);
            let best = o.best_order().unwrap();
            for root in s.relation_ids() {
                let flat: Sequence = o.solve_root(root).unwrap().into_iter().flatten().collect();
                assert!(best.cost <= o.c(&flat).unwrap());
            }
        }
    }

    // R(10) with two identical children X(50) and Y(50).
    fn twin_leaves() -> Schema {
        let mut builder = shared::Builder::new();
        let r = builder.add_relation("R", 10.0).unwrap();
        let x = builder.add_relation("X", 50.0).unwrap();
        let y = builder.add_relation("Y", 50.0).unwrap();
        builder.add_predicate(r, x, 0.5).unwrap();
        builder.add_predicate(r, y, 0.5).unwrap();
        builder.build()
    }

    #[test]
    fn test_equal_ranks_keep_chain_order() {
        let s = twin_leaves();
        let mut o = IkkbzOrderer::new(&s);

        // X and Y tie on rank: X is taken first and Y is not folded into it.
        assert_eq!(o.solve_root(id(1)).unwrap(), vec![seq(&[1]), seq(&[2]), seq(&[3])]);
        assert_eq!(o.rank(&seq(&[2])).unwrap(), o.rank(&seq(&[3])).unwrap());

        let best = o.best_order().unwrap();
        assert_eq!(best.root, id(1));
        assert_eq!(best.sequence, seq(&[1, 2, 3]));
        assert!(close(best.cost, 6510.0));
    }

    #[test]
    fn test_tied_subtrees_merge_lower_id_first() {
        //        R
        //      /   \
        //     P     Q
        //     |     |
        //    P2    Q2
        let mut builder = shared::Builder::new();
        let r = builder.add_relation("R", 10.0).unwrap();
        let p = builder.add_relation("P", 50.0).unwrap();
        let q = builder.add_relation("Q", 50.0).unwrap();
        let p2 = builder.add_relation("P2", 1000.0).unwrap();
        let q2 = builder.add_relation("Q2", 10000.0).unwrap();
        builder.add_predicate(r, p, 0.5).unwrap();
        builder.add_predicate(r, q, 0.5).unwrap();
        builder.add_predicate(p, p2, 0.1).unwrap();
        builder.add_predicate(q, q2, 0.1).unwrap();
        let s = builder.build();
        let mut o = IkkbzOrderer::new(&s);

        // Heads P and Q tie; P's chain is consumed first, then the lower
        // ranked Q, then the tails by rank.
        assert_eq!(
            o.solve_root(id(1)).unwrap(),
            vec![seq(&[1]), seq(&[2]), seq(&[3]), seq(&[4]), seq(&[5])]
        );
    }

    #[test]
    fn test_overflowing_costs_are_reported() {
        let mut builder = shared::Builder::new();
        let mut previous = None;
        for i in 0..RelSet::CAPACITY {
            let r = builder.add_relation(format!("R{}", i), 1e200).unwrap();
            if let Some(p) = previous {
                builder.add_predicate(p, r, 1.0).unwrap();
            }
            previous = Some(r);
        }
        let s = builder.build();

        let mut o = IkkbzOrderer::new(&s);
        assert!(matches!(
            o.best_order(),
            Err(OptimizerError::CostOverflow { cost }) if cost.is_infinite()
        ));
        let mut forest = Forest::new(&s);
        assert_eq!(
            o.order(&mut forest).unwrap_err().kind(),
            crate::error::ErrorKind::Schema
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let s = queries::triangle().unwrap();
        let mut o = IkkbzOrderer::new(&s);
        for root in s.relation_ids() {
            assert!(matches!(
                o.set_root(root),
                Err(OptimizerError::NotATree { .. })
            ));
        }
        let mut forest = Forest::new(&s);
        assert!(matches!(
            o.order(&mut forest),
            Err(OptimizerError::NotATree { .. })
        ));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_disconnected_graph_is_rejected() {
        let mut builder = shared::Builder::new();
        builder.add_relation("A", 10.0).unwrap();
        builder.add_relation("B", 10.0).unwrap();
        let s = builder.build();
        let mut o = IkkbzOrderer::new(&s);
        assert!(matches!(
            o.set_root(id(1)),
            Err(OptimizerError::Disconnected { relation }) if relation == id(2)
        ));
        assert_eq!(o.root(), None);
    }

    #[test]
    fn test_single_relation() {
        let mut builder = shared::Builder::new();
        builder.add_relation("A", 10.0).unwrap();
        let s = builder.build();
        let mut forest = Forest::new(&s);
        let g = IkkbzOrderer::new(&s).order(&mut forest).unwrap();
        assert_eq!(forest.format_string(g).unwrap(), "A");
    }
}
