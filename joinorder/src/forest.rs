/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Memo of candidate join trees.
//!
//! A [`Forest`] is an append-only arena of groups. A group is either a leaf
//! wrapping one relation or a join of two earlier groups, and always knows
//! which relations it covers. Groups are addressed by [`GroupId`]s, which are
//! only meaningful for the forest that handed them out.

use crate::error::{OptimizerError, Result};
use shared::{RelSet, RelationId, Schema};
use std::fmt;

/// Glyph printed between the two sides of a join.
pub const JOIN_GLYPH: &str = "⋈";

/// Position of a group in its [`Forest`], starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GroupId(u32);

impl GroupId {
    /// Reserved id that never names a group.
    pub const NONE: GroupId = GroupId(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Leaf(RelationId),
    Join { left: GroupId, right: GroupId },
}

#[derive(Debug, Clone)]
pub struct Group {
    pub kind: GroupKind,
    pub members: RelSet,
}

pub struct Forest<'s> {
    schema: &'s Schema,
    groups: Vec<Group>,
}

impl<'s> Forest<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            groups: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn push(&mut self, group: Group) -> GroupId {
        self.groups.push(group);
        GroupId(self.groups.len() as u32)
    }

    pub fn group(&self, id: GroupId) -> Result<&Group> {
        if id.is_none() {
            return Err(OptimizerError::EmptyGroup);
        }
        self.groups
            .get(id.0 as usize - 1)
            .ok_or(OptimizerError::UnknownGroup(id))
    }

    pub fn add_leaf(&mut self, relation: RelationId) -> Result<GroupId> {
        self.schema.relation(relation)?;
        Ok(self.push(Group {
            kind: GroupKind::Leaf(relation),
            members: RelSet::singleton(relation),
        }))
    }

    /// Adds the join of two existing groups.
    ///
    /// The two sides must cover disjoint relation sets. This is not checked
    /// here; the optimizers only ever pair disjoint groups.
    pub fn add_join(&mut self, left: GroupId, right: GroupId) -> Result<GroupId> {
        let members = self.members(left)?.union(self.members(right)?);
        Ok(self.push(Group {
            kind: GroupKind::Join { left, right },
            members,
        }))
    }

    /// Builds the left-deep tree `((s0 ⋈ s1) ⋈ s2) ...` for a sequence.
    pub fn add_left_deep(&mut self, sequence: &[RelationId]) -> Result<GroupId> {
        let (first, rest) = sequence
            .split_first()
            .ok_or(OptimizerError::EmptySequence)?;
        let mut acc = self.add_leaf(*first)?;
        for &relation in rest {
            let leaf = self.add_leaf(relation)?;
            acc = self.add_join(acc, leaf)?;
        }
        Ok(acc)
    }

    pub fn members(&self, id: GroupId) -> Result<RelSet> {
        self.group(id).map(|g| g.members)
    }

    /// Renders the tree rooted at `id`, e.g. `((A ⋈ B) ⋈ C)`.
    pub fn format_string(&self, id: GroupId) -> Result<String> {
        let mut buf = String::new();
        self.format(id, &mut buf)?;
        Ok(buf)
    }

    fn format(&self, id: GroupId, buf: &mut String) -> Result<()> {
        match self.group(id)?.kind {
            GroupKind::Leaf(relation) => buf.push_str(self.schema.name(relation)?),
            GroupKind::Join { left, right } => {
                buf.push('(');
                self.format(left, buf)?;
                buf.push(' ');
                buf.push_str(JOIN_GLYPH);
                buf.push(' ');
                self.format(right, buf)?;
                buf.push(')');
            }
        }
        Ok(())
    }
}

/// One line per group: `G1 - [A]` for leaves, `G3 - G1 ⋈ G2` for joins.
impl fmt::Display for Forest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            let id = GroupId(i as u32 + 1);
            match group.kind {
                GroupKind::Leaf(relation) => {
                    let name = self.schema.name(relation).map_err(|_| fmt::Error)?;
                    writeln!(f, "{} - [{}]", id, name)?;
                }
                GroupKind::Join { left, right } => {
                    writeln!(f, "{} - {} {} {}", id, left, JOIN_GLYPH, right)?;
                }
            }
        }
        Ok(())
    }
}
