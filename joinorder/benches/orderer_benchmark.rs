/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate criterion;
extern crate joinorder;

use criterion::*;
use joinorder::forest::Forest;
use joinorder::optimizer::{order_with, Strategy};
use joinorder::queries;
use shared::{Builder, Schema};

// A path of `n` relations with mixed sizes
fn path_query(n: usize) -> Schema {
    let mut builder = Builder::new();
    let mut previous = None;
    for i in 0..n {
        let cardinality = 10.0 * (1 + (i * 7) % 13) as f64 * 100.0;
        let id = builder
            .add_relation(format!("R{}", i), cardinality)
            .expect("benchmark relation");
        if let Some(prev) = previous {
            builder
                .add_predicate(prev, id, 1.0 / (10.0 + i as f64))
                .expect("benchmark predicate");
        }
        previous = Some(id);
    }
    builder.build()
}

fn run(strategy: Strategy, schema: &Schema) {
    let mut forest = Forest::new(schema);
    black_box(order_with(strategy, &mut forest).expect("orderer failed"));
}

fn chain_benchmark(c: &mut Criterion) {
    let schema = queries::chain().expect("chain query");

    c.bench_function("chain: dpsize", |b| b.iter(|| run(Strategy::DpSize, &schema)));
    c.bench_function("chain: ikkbz", |b| b.iter(|| run(Strategy::Ikkbz, &schema)));
    c.bench_function("chain: brute force", |b| {
        b.iter(|| run(Strategy::BruteForce, &schema))
    });
}

/////////////////////////////////////////////////////////////////////////
// Longer paths, where DPSize grows much faster than IKKBZ
fn path_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("path");
    for n in [6usize, 10, 14] {
        let schema = path_query(n);
        group.bench_with_input(BenchmarkId::new("dpsize", n), &schema, |b, s| {
            b.iter(|| run(Strategy::DpSize, s))
        });
        group.bench_with_input(BenchmarkId::new("ikkbz", n), &schema, |b, s| {
            b.iter(|| run(Strategy::Ikkbz, s))
        });
    }
    group.finish();
}

criterion_group!(benches, chain_benchmark, path_benchmark);
criterion_main!(benches);
