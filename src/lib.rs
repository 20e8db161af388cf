/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! Split-finding and data-indexing core for a random-forest /
//! gradient-boosting-tree ensemble trainer, following the RF-ACE
//! methodology: typed feature columns with paired permuted "contrast"
//! columns for per-feature significance testing, bootstrap sampling over
//! non-missing rows, and incremental-impurity split search over both
//! numerical and categorical features.
//!
//! This crate is the engine only: tabular file parsing, CLI handling and
//! the outer tree-growing/ensemble loop are external collaborators built
//! on top of `Dataset` and the `split` module.

pub type NumT = f64;
pub type CatT = u32;
pub const EPSILON: NumT = std::f64::EPSILON;
pub const POS_INF: NumT = std::f64::INFINITY;
pub const NEG_INF: NumT = std::f64::NEG_INFINITY;

pub fn into_cat(x: NumT) -> CatT {
    debug_assert!(x >= 0.0 && x.round() == x);
    x as CatT
}

pub mod column;
pub mod config;
pub mod dataset;
pub mod error;
pub mod numeric;
pub mod rng;
pub mod split;

pub use column::{FeatureColumn, FeatureKind};
pub use config::Config;
pub use dataset::{ColumnReplacement, Dataset, RawMatrix};
pub use error::{Error, Result};
pub use rng::Mt19937;
pub use split::{CategoricalSplit, NumericalSplit, SplitFinder, Target};
