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
pub mod forest;
pub mod optimizer;
pub mod queries;
pub mod query_file;

pub use error::{ErrorKind, OptimizerError};
pub use forest::{Forest, GroupId};
pub use optimizer::{order_with, JoinOrderer, Strategy};
