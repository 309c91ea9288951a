/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! A small catalog of example query graphs.

use crate::error::{OptimizerError, Result};
use shared::{Builder, Schema, SchemaError};

pub const QUERY_NAMES: &[&str] = &["bushy", "chain", "star", "three-way", "triangle"];

pub fn query_by_name(name: &str) -> Result<Schema> {
    let schema = match name {
        "bushy" => bushy(),
        "chain" => chain(),
        "star" => star(),
        "three-way" => three_way(),
        "triangle" => triangle(),
        _ => return Err(OptimizerError::UnknownQuery(name.to_string())),
    };
    Ok(schema?)
}

/// A query for which a bushy tree beats every left-deep order.
///
/// B - C
/// |   |
/// A   D
pub fn bushy() -> std::result::Result<Schema, SchemaError> {
    let mut builder = Builder::new();

    let a = builder.add_relation("A", 1000.0)?;
    let b = builder.add_relation("B", 900.0)?;
    let c = builder.add_relation("C", 800.0)?;
    let d = builder.add_relation("D", 700.0)?;

    builder.add_predicate(a, b, 0.01)?;
    builder.add_predicate(b, c, 0.5)?;
    builder.add_predicate(c, d, 0.01)?;

    Ok(builder.build())
}

/// Six relations in a tree.
///
/// A - B - D
///     |
///     C - E
///         |
///         F
pub fn chain() -> std::result::Result<Schema, SchemaError> {
    let mut builder = Builder::new();

    let a = builder.add_relation("A", 100.0)?;
    let b = builder.add_relation("B", 10.0)?;
    let c = builder.add_relation("C", 100.0)?;
    let d = builder.add_relation("D", 1000.0)?;
    let e = builder.add_relation("E", 10000.0)?;
    let f = builder.add_relation("F", 100000.0)?;

    builder.add_predicate(a, b, 0.01)?;
    builder.add_predicate(b, d, 0.0004)?;
    builder.add_predicate(b, c, 0.1)?;
    builder.add_predicate(c, e, 0.05)?;
    builder.add_predicate(e, f, 0.0001)?;

    Ok(builder.build())
}

/// Two hubs; IKKBZ only finds the best order from some roots.
///
/// B - A - C - D
///         |
///         E
pub fn star() -> std::result::Result<Schema, SchemaError> {
    let mut builder = Builder::new();

    let a = builder.add_relation("A", 100.0)?;
    let b = builder.add_relation("B", 1000000.0)?;
    let c = builder.add_relation("C", 1000.0)?;
    let d = builder.add_relation("D", 15000.0)?;
    let e = builder.add_relation("E", 50.0)?;

    builder.add_predicate(a, b, 0.01)?;
    builder.add_predicate(a, c, 1.0)?;
    builder.add_predicate(c, d, 0.0333)?;
    builder.add_predicate(c, e, 0.1)?;

    Ok(builder.build())
}

/// A - B - C
pub fn three_way() -> std::result::Result<Schema, SchemaError> {
    let mut builder = Builder::new();

    let a = builder.add_relation("A", 50.0)?;
    let b = builder.add_relation("B", 1000.0)?;
    let c = builder.add_relation("C", 50000.0)?;

    builder.add_predicate(a, b, 0.01)?;
    builder.add_predicate(b, c, 0.1)?;

    Ok(builder.build())
}

/// A cyclic graph, which IKKBZ must refuse.
///
/// A - B
///  \ /
///   C
pub fn triangle() -> std::result::Result<Schema, SchemaError> {
    let mut builder = Builder::new();

    let a = builder.add_relation("A", 10.0)?;
    let b = builder.add_relation("B", 20.0)?;
    let c = builder.add_relation("C", 30.0)?;

    builder.add_predicate(a, b, 0.1)?;
    builder.add_predicate(b, c, 0.2)?;
    builder.add_predicate(a, c, 0.3)?;

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in QUERY_NAMES {
            let schema = query_by_name(name).unwrap();
            assert!(schema.num_rels() >= 3, "{} is too small", name);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            query_by_name("nope"),
            Err(OptimizerError::UnknownQuery(name)) if name == "nope"
        ));
    }
}
