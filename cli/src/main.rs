/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use joinorder::forest::Forest;
use joinorder::optimizer::{order_with, Strategy};
use joinorder::queries::{query_by_name, QUERY_NAMES};
use joinorder::query_file::QueryGraph;
use joinorder::OptimizerError;
use log::info;
use shared::Schema;

#[derive(Parser)]
#[command(
    name = "joinorder-cli",
    version = "0.1.0",
    author = "Volodymyr Kadzhaia <vkadzhaia@gmail.com>",
    author = "Pieter Bonte <pieter.bonte@kuleuven.be>",
    about = "Pick a join order for a query graph",
    long_about = "joinorder CLI - loads a query graph (a built-in example or a JSON file of relations and predicates), runs a cost-based join orderer over it and prints the chosen join tree."
)]
struct Args {
    #[arg(
        short,
        long,
        help = "Built-in query graph",
        value_name = "NAME",
        conflicts_with = "file",
        required_unless_present = "file"
    )]
    query: Option<String>,

    #[arg(short, long, help = "JSON query graph", value_name = "FILE")]
    file: Option<String>,

    #[arg(
        short,
        long,
        default_value = "auto",
        help = "Join orderer to run: dpsize, ikkbz, brute-force or auto",
        value_name = "ORDERER"
    )]
    orderer: Strategy,

    #[arg(short, long, help = "Also print every group in the memo")]
    memo: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More logging (-v, -vv)")]
    verbose: u8,
}

fn load_schema(args: &Args) -> Result<Schema, OptimizerError> {
    match (&args.query, &args.file) {
        (_, Some(path)) => QueryGraph::load(path)?.into_schema(),
        (Some(name), None) => query_by_name(name),
        (None, None) => Err(OptimizerError::UnknownQuery(String::new())),
    }
}

fn run(args: &Args) -> Result<(), OptimizerError> {
    let schema = load_schema(args)?;
    info!(
        "loaded {} relations, ordering with {}",
        schema.num_rels(),
        args.orderer
    );

    let mut forest = Forest::new(&schema);
    let root = order_with(args.orderer, &mut forest)?;

    println!("{}", forest.format_string(root)?);
    if args.memo {
        print!("{}", forest);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        if let OptimizerError::UnknownQuery(_) = err {
            eprintln!("Known queries: {}", QUERY_NAMES.join(", "));
        }
        std::process::exit(1);
    }
}
