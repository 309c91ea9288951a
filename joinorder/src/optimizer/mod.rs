/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Cost-based join orderers
//!
//! Every orderer reads cardinalities and selectivities from a [`Schema`] and
//! writes its winning plan into a [`Forest`], returning the root group:
//!
//! - `dpsize`: exhaustive dynamic programming over subset sizes, finds the
//!   cheapest bushy tree for any connected query graph
//! - `ikkbz`: Ibaraki/Kameda rank-based ordering, finds the cheapest
//!   left-deep order for tree-shaped query graphs in polynomial time
//! - `brute_force`: tries every permutation, used as a reference
//! - `cost`: the left-deep cost model shared by the above
//!
//! ## Usage
//!
//! ```rust
//! use joinorder::forest::Forest;
//! use joinorder::optimizer::{DpSizeOrderer, JoinOrderer};
//! use joinorder::queries;
//!
//! let schema = queries::bushy().unwrap();
//! let mut forest = Forest::new(&schema);
//! let root = DpSizeOrderer::new(&schema).order(&mut forest).unwrap();
//! assert_eq!(forest.format_string(root).unwrap(), "((A ⋈ B) ⋈ (C ⋈ D))");
//! ```

pub mod brute_force;
pub mod cost;
pub mod dpsize;
pub mod ikkbz;

pub use brute_force::BruteForceOrderer;
pub use cost::left_deep_cost;
pub use dpsize::{DpSizeOrderer, PlanStats};
pub use ikkbz::{IkkbzOrderer, RootedOrder};

use crate::error::{ErrorKind, Result};
use crate::forest::{Forest, GroupId};
use log::debug;
use shared::{RelSet, RelationId, Schema};
use std::fmt;
use std::str::FromStr;

/// A join ordering algorithm.
pub trait JoinOrderer {
    fn name(&self) -> &'static str;

    /// Adds the chosen plan to `forest` and returns its root group.
    ///
    /// `forest` must be built over the same schema as the orderer.
    fn order(&mut self, forest: &mut Forest<'_>) -> Result<GroupId>;
}

/// Which orderer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DpSize,
    Ikkbz,
    BruteForce,
    /// IKKBZ, falling back to DPSize when the query graph is not a tree.
    Auto,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::DpSize,
        Strategy::Ikkbz,
        Strategy::BruteForce,
        Strategy::Auto,
    ];

    /// Same as [`JoinOrderer::name`] for the orderer this strategy runs.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::DpSize => "dpsize",
            Strategy::Ikkbz => "ikkbz",
            Strategy::BruteForce => "brute-force",
            Strategy::Auto => "auto",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Strategy::ALL.iter().map(|st| st.name()).collect();
                format!("unknown orderer {:?}, expected one of {}", s, names.join(", "))
            })
    }
}

fn run(orderer: &mut dyn JoinOrderer, forest: &mut Forest<'_>) -> Result<GroupId> {
    debug!("running {}", orderer.name());
    orderer.order(forest)
}

/// Runs the orderer selected by `strategy` over the forest's schema.
pub fn order_with(strategy: Strategy, forest: &mut Forest<'_>) -> Result<GroupId> {
    let schema = forest.schema();
    match strategy {
        Strategy::DpSize => run(&mut DpSizeOrderer::new(schema), forest),
        Strategy::Ikkbz => run(&mut IkkbzOrderer::new(schema), forest),
        Strategy::BruteForce => run(&mut BruteForceOrderer::new(schema), forest),
        Strategy::Auto => match run(&mut IkkbzOrderer::new(schema), forest) {
            Err(err) if err.kind() == ErrorKind::Structural => {
                debug!("ikkbz rejected the query graph ({}), using dpsize", err);
                run(&mut DpSizeOrderer::new(schema), forest)
            }
            other => other,
        },
    }
}

/// First relation, in id order, that cannot be reached from relation 1.
pub(crate) fn first_unreachable(schema: &Schema) -> Result<Option<RelationId>> {
    let Some(start) = schema.relation_ids().next() else {
        return Ok(None);
    };
    let mut reached = RelSet::singleton(start);
    let mut frontier = vec![start];
    while let Some(node) = frontier.pop() {
        for next in schema.neighbors(node)? {
            if !reached.contains(next) {
                reached = reached.with(next);
                frontier.push(next);
            }
        }
    }
    Ok(schema.relation_ids().find(|r| !reached.contains(*r)))
}
