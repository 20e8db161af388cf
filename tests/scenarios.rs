/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! Integration tests exercising the end-to-end `Dataset` + `SplitFinder`
//! pipeline against the worked scenarios and invariants this crate's
//! scope calls out, rather than the pure sweep functions `split.rs`'s own
//! unit tests already cover in isolation.

use rface_core::{
    Config, Dataset, FeatureKind, SplitFinder,
};
use rface_core::dataset::RawMatrix;

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn rows(mat: &[&[&str]]) -> Vec<Vec<String>> {
    mat.iter().map(|r| strings(r)).collect()
}

/// Scenario 2: inject a Missing at position 2 of the feature column; the
/// split must operate on the remaining 5 rows and return consistent
/// left+right counts.
#[test]
fn missing_feature_value_drops_one_row_end_to_end() {
    let matrix = rows(&[
        &["0", "0"],
        &["1", "1"],
        &["2", "NA"],
        &["3", "3"],
        &["4", "4"],
        &["5", "5"],
    ]);
    let config = Config::new();
    let names = strings(&["target", "feature"]);
    let kinds = vec![FeatureKind::Numerical, FeatureKind::Numerical];
    let samples = strings(&["a", "b", "c", "d", "e", "f"]);

    let dataset = Dataset::from_raw_matrix(&config, RawMatrix::RowMajor(&matrix), &names, &kinds, samples).unwrap();

    let candidates: Vec<usize> = (0..6).collect();
    let split = SplitFinder::split_numerical(&dataset, 0, 1, 1, &candidates).unwrap().unwrap();
    assert_eq!(split.left.len() + split.right.len(), 5);
    assert!(!split.left.contains(&2));
    assert!(!split.right.contains(&2));
}

/// Scenario 5: two Datasets built with the same explicit seed produce
/// byte-identical contrast permutations and bootstrap draws.
#[test]
fn same_seed_reproduces_contrasts_and_bootstrap() {
    let matrix = rows(&[
        &["1.0", "red", "10"],
        &["2.0", "green", "20"],
        &["3.0", "red", "NA"],
        &["4.0", "blue", "40"],
        &["5.0", "blue", "50"],
    ]);
    let names = strings(&["num", "color", "target"]);
    let kinds = vec![FeatureKind::Numerical, FeatureKind::Categorical, FeatureKind::Numerical];

    let mut config = Config::new();
    config.random_seed = 42;

    let mut a = Dataset::from_raw_matrix(&config, RawMatrix::RowMajor(&matrix), &names, &kinds, strings(&["s0", "s1", "s2", "s3", "s4"])).unwrap();
    let mut b = Dataset::from_raw_matrix(&config, RawMatrix::RowMajor(&matrix), &names, &kinds, strings(&["s0", "s1", "s2", "s3", "s4"])).unwrap();

    for col in 0..a.n_features() {
        let contrast_col = a.n_features() + col;
        assert_eq!(
            a.column_values(contrast_col).unwrap().into_owned(),
            b.column_values(contrast_col).unwrap().into_owned(),
        );
    }

    let bootstrap_a = a.bootstrap(true, 0.8, 0).unwrap();
    let bootstrap_b = b.bootstrap(true, 0.8, 0).unwrap();
    assert_eq!(bootstrap_a, bootstrap_b);
}

/// A node-splitting loop over a tiny dataset: bootstrap the in-bag rows,
/// then split twice on the two features in turn, the way an external
/// tree-growing loop would call into this crate.
#[test]
fn bootstrap_then_split_pipeline() {
    let matrix = rows(&[
        &["10", "A", "1"],
        &["20", "A", "2"],
        &["30", "B", "3"],
        &["40", "B", "4"],
        &["50", "C", "5"],
        &["60", "C", "6"],
    ]);
    let names = strings(&["feature_num", "feature_cat", "target"]);
    let kinds = vec![FeatureKind::Numerical, FeatureKind::Categorical, FeatureKind::Numerical];
    let samples = strings(&["r0", "r1", "r2", "r3", "r4", "r5"]);

    let mut config = Config::new();
    config.random_seed = 7;

    let mut dataset = Dataset::from_raw_matrix(&config, RawMatrix::RowMajor(&matrix), &names, &kinds, samples).unwrap();

    let (in_bag, out_of_bag) = dataset.bootstrap(false, 1.0, 2).unwrap();
    assert_eq!(in_bag.len(), 6);
    assert!(out_of_bag.is_empty());

    let numerical_split = SplitFinder::split_numerical(&dataset, 2, 0, 1, &in_bag).unwrap().unwrap();
    assert_eq!(numerical_split.left.len() + numerical_split.right.len(), 6);
    assert!(numerical_split.fitness > 0.0);

    let categorical_split = SplitFinder::split_categorical(&dataset, 2, 1, 1, &in_bag).unwrap().unwrap();
    assert_eq!(categorical_split.left.len() + categorical_split.right.len(), 6);
    assert!(categorical_split.left_categories.len() >= 1);
    assert!(categorical_split.right_categories.len() >= 1);
}

/// Whitelisting down to one feature keeps its paired contrast reachable
/// and keeps split-finding working against the surviving column index.
#[test]
fn whitelist_then_split_still_works() {
    let matrix = rows(&[
        &["1", "10"],
        &["2", "20"],
        &["3", "30"],
        &["4", "40"],
    ]);
    let names = strings(&["feature", "target"]);
    let kinds = vec![FeatureKind::Numerical, FeatureKind::Numerical];
    let samples = strings(&["a", "b", "c", "d"]);
    let config = Config::new();

    let mut dataset = Dataset::from_raw_matrix(&config, RawMatrix::RowMajor(&matrix), &names, &kinds, samples).unwrap();
    dataset.whitelist(&["feature".to_string()]).unwrap();
    assert_eq!(dataset.n_features(), 1);
    assert_eq!(dataset.column_name(0).unwrap(), "feature");
    assert_eq!(dataset.column_name(1).unwrap(), "feature_CONTRAST");

    // a column split against itself is degenerate in the sense that the
    // feature and target are the same values, but index resolution after
    // the rebuild must still be internally consistent end to end.
    let candidates: Vec<usize> = (0..dataset.n_samples()).collect();
    let split = SplitFinder::split_numerical(&dataset, 0, 0, 1, &candidates).unwrap().unwrap();
    assert_eq!(split.left.len() + split.right.len(), 4);
    assert!((split.fitness - 1.0).abs() < 1e-9);
}
