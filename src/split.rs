/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! The two split-search entry points (§4.4, §4.5): numerical-feature
//! split by incremental sweep over sorted thresholds, and
//! categorical-feature split by greedy category-transfer. Both work on
//! already filter-paired, non-missing slices — `Dataset::filtered_pair`
//! is the caller's job — and both branch on whether the target column is
//! numerical (variance reduction) or categorical (squared-frequency /
//! Gini reduction).

use crate::dataset::Dataset;
use crate::error::Error;
use crate::numeric::{sse_from_moments, stable_argsort, MeanSse, SquaredFreq};
use crate::{CatT, NumT};

/// Dataset-aware entry point matching the external interface (§6):
/// resolves target/feature kinds and filters the candidate set through
/// `Dataset` before delegating to the pure sweep/greedy-transfer
/// algorithms below.
pub struct SplitFinder;

impl SplitFinder {
    pub fn split_numerical(
        dataset: &Dataset,
        target_idx: usize,
        feature_idx: usize,
        min_samples: usize,
        candidates: &[usize],
    ) -> Result<Option<NumericalSplit>, Error> {
        if !dataset.is_numerical(feature_idx)? {
            return Err(Error::precondition("SplitFinder::split_numerical", "feature column must be numerical"));
        }
        let (tv, fv, rows) = dataset.filtered_pair(target_idx, feature_idx, candidates)?;
        let target = if dataset.is_numerical(target_idx)? {
            Target::Numerical(&tv)
        } else {
            Target::Categorical { codes: &tv, n_categories: dataset.n_categories(target_idx)? }
        };
        split_numerical(&target, &fv, &rows, min_samples)
    }

    pub fn split_categorical(
        dataset: &Dataset,
        target_idx: usize,
        feature_idx: usize,
        min_samples: usize,
        candidates: &[usize],
    ) -> Result<Option<CategoricalSplit>, Error> {
        if dataset.is_numerical(feature_idx)? {
            return Err(Error::precondition("SplitFinder::split_categorical", "feature column must be categorical"));
        }
        let (tv, fv, rows) = dataset.filtered_pair(target_idx, feature_idx, candidates)?;
        let target = if dataset.is_numerical(target_idx)? {
            Target::Numerical(&tv)
        } else {
            Target::Categorical { codes: &tv, n_categories: dataset.n_categories(target_idx)? }
        };
        let n_feature_categories = dataset.n_categories(feature_idx)?;
        split_categorical(&target, &fv, n_feature_categories, &rows, min_samples)
    }
}

/// The target column driving a split search, already reduced to the rows
/// that survived filtering against the feature column.
pub enum Target<'a> {
    Numerical(&'a [NumT]),
    Categorical { codes: &'a [NumT], n_categories: usize },
}

impl<'a> Target<'a> {
    fn len(&self) -> usize {
        match self {
            Target::Numerical(v) => v.len(),
            Target::Categorical { codes, .. } => codes.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumericalSplit {
    pub threshold: NumT,
    pub fitness: NumT,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct CategoricalSplit {
    pub left_categories: Vec<CatT>,
    pub right_categories: Vec<CatT>,
    pub fitness: NumT,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

/// Numerical-feature split search (§4.4). `rows` carries the original
/// dataset row index for each entry of `feature`/`target`, all three
/// already paired and filtered to rows non-missing in both columns.
pub fn split_numerical(
    target: &Target,
    feature: &[NumT],
    rows: &[usize],
    min_samples: usize,
) -> Result<Option<NumericalSplit>, Error> {
    let n = feature.len();
    if target.len() != n || rows.len() != n {
        return Err(Error::precondition(
            "split_numerical",
            "target, feature and rows must have equal length",
        ));
    }
    if min_samples == 0 {
        return Err(Error::precondition("split_numerical", "minSamples must be >= 1"));
    }
    if n < 2 * min_samples {
        return Ok(None);
    }

    let (fv_sorted, perm) = stable_argsort(feature);

    let best = match target {
        Target::Numerical(tv) => {
            let tv_sorted: Vec<NumT> = perm.iter().map(|&i| tv[i]).collect();
            best_numerical_boundary(&tv_sorted, &fv_sorted, min_samples)
        }
        Target::Categorical { codes, n_categories } => {
            let codes_sorted: Vec<NumT> = perm.iter().map(|&i| codes[i]).collect();
            best_categorical_boundary(&codes_sorted, *n_categories, &fv_sorted, min_samples)
        }
    };

    let (b, fitness) = match best {
        Some(x) => x,
        None => return Ok(None),
    };

    let left: Vec<usize> = perm[..=b].iter().map(|&i| rows[i]).collect();
    let right: Vec<usize> = perm[b + 1..].iter().map(|&i| rows[i]).collect();

    Ok(Some(NumericalSplit {
        threshold: fv_sorted[b],
        fitness,
        left,
        right,
    }))
}

/// `b` is the index of the last row sent left (rows `0..=b` left,
/// `b+1..n` right, all against the sorted-by-feature order). Returns the
/// best admissible boundary and its fitness.
fn best_numerical_boundary(tv_sorted: &[NumT], fv_sorted: &[NumT], min_samples: usize) -> Option<(usize, NumT)> {
    let n = tv_sorted.len();

    let mut prefix_sse = Vec::with_capacity(n);
    let mut left = MeanSse::new();
    for &x in tv_sorted {
        left.add(x);
        prefix_sse.push(left.sse());
    }
    let s_tot = prefix_sse[n - 1];
    if s_tot <= 0.0 {
        return None;
    }

    let mut right = MeanSse::new();
    let mut best: Option<(usize, NumT)> = None;
    for idx in (1..n).rev() {
        right.add(tv_sorted[idx]);
        let b = idx - 1;
        let n_l = b + 1;
        let n_r = n - idx;
        if n_l < min_samples || n_r < min_samples {
            continue;
        }
        if fv_sorted[b] == fv_sorted[b + 1] {
            continue;
        }
        let cost = prefix_sse[b] + right.sse();
        if best.map_or(true, |(_, best_cost)| cost < best_cost) {
            best = Some((b, cost));
        }
    }

    best.map(|(b, cost)| (b, (s_tot - cost) / s_tot))
}

fn best_categorical_boundary(codes_sorted: &[NumT], n_categories: usize, fv_sorted: &[NumT], min_samples: usize) -> Option<(usize, NumT)> {
    let n = codes_sorted.len();

    let mut prefix_sf = Vec::with_capacity(n);
    let mut left = SquaredFreq::new(n_categories);
    for &code in codes_sorted {
        left.add(code as usize);
        prefix_sf.push(left.sum_sq());
    }
    let sf_tot = prefix_sf[n - 1];
    let denom = (n * n) as NumT - sf_tot;
    if denom <= 0.0 {
        return None;
    }

    let mut right = SquaredFreq::new(n_categories);
    let mut best_nsf: Option<(usize, NumT)> = None;
    for idx in (1..n).rev() {
        right.add(codes_sorted[idx] as usize);
        let b = idx - 1;
        let n_l = (b + 1) as NumT;
        let n_r = (n - idx) as NumT;
        if (b + 1) < min_samples || (n - idx) < min_samples {
            continue;
        }
        if fv_sorted[b] == fv_sorted[b + 1] {
            continue;
        }
        let nsf = prefix_sf[b] / n_l + right.sum_sq() / n_r;
        if best_nsf.map_or(true, |(_, best_so_far)| nsf > best_so_far) {
            best_nsf = Some((b, nsf));
        }
    }

    best_nsf.map(|(b, nsf)| {
        let fitness = (-sf_tot + n as NumT * nsf) / denom;
        (b, fitness)
    })
}

struct NumMoments {
    n: usize,
    sum: NumT,
    sum_sq: NumT,
}

impl NumMoments {
    fn zero() -> NumMoments {
        NumMoments { n: 0, sum: 0.0, sum_sq: 0.0 }
    }

    fn from_values(values: &[NumT]) -> NumMoments {
        NumMoments {
            n: values.len(),
            sum: values.iter().sum(),
            sum_sq: values.iter().map(|&x| x * x).sum(),
        }
    }

    fn plus(&self, other: &NumMoments) -> NumMoments {
        NumMoments {
            n: self.n + other.n,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
        }
    }

    fn minus(&self, other: &NumMoments) -> NumMoments {
        NumMoments {
            n: self.n - other.n,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    fn sse(&self) -> NumT {
        sse_from_moments(self.n, self.sum, self.sum_sq)
    }
}

struct CatMoments {
    n: usize,
    freq: Vec<u32>,
    sum_sq: i64,
}

impl CatMoments {
    fn zero(n_target_categories: usize) -> CatMoments {
        CatMoments { n: 0, freq: vec![0; n_target_categories], sum_sq: 0 }
    }

    fn from_codes(codes: &[NumT], n_target_categories: usize) -> CatMoments {
        let mut freq = vec![0u32; n_target_categories];
        for &c in codes {
            freq[c as usize] += 1;
        }
        let sum_sq = freq.iter().map(|&f| (f as i64) * (f as i64)).sum();
        CatMoments { n: codes.len(), freq, sum_sq }
    }

    fn sf(&self) -> NumT {
        self.sum_sq as NumT
    }

    /// sf after adding `delta` (per-target-category counts) to this group,
    /// computed from the closed-form expansion, without mutating `self`.
    fn trial_add_sf(&self, delta: &[u32]) -> NumT {
        let mut cross: i64 = 0;
        let mut delta_sq: i64 = 0;
        for (f, d) in self.freq.iter().zip(delta.iter()) {
            cross += (*f as i64) * (*d as i64);
            delta_sq += (*d as i64) * (*d as i64);
        }
        (self.sum_sq + 2 * cross + delta_sq) as NumT
    }

    fn trial_remove_sf(&self, delta: &[u32]) -> NumT {
        let mut cross: i64 = 0;
        let mut delta_sq: i64 = 0;
        for (f, d) in self.freq.iter().zip(delta.iter()) {
            cross += (*f as i64) * (*d as i64);
            delta_sq += (*d as i64) * (*d as i64);
        }
        (self.sum_sq - 2 * cross + delta_sq) as NumT
    }

    fn add(&mut self, delta: &[u32]) {
        self.sum_sq = self.trial_add_sf(delta) as i64;
        self.n += delta.iter().map(|&d| d as usize).sum::<usize>();
        for (f, d) in self.freq.iter_mut().zip(delta.iter()) {
            *f += d;
        }
    }

    fn remove(&mut self, delta: &[u32]) {
        self.sum_sq = self.trial_remove_sf(delta) as i64;
        self.n -= delta.iter().map(|&d| d as usize).sum::<usize>();
        for (f, d) in self.freq.iter_mut().zip(delta.iter()) {
            *f -= d;
        }
    }
}

/// Categorical-feature split search (§4.5): greedy category-transfer
/// using closed-form trial deltas (no mutate-then-revert).
pub fn split_categorical(
    target: &Target,
    feature_codes: &[NumT],
    n_feature_categories: usize,
    rows: &[usize],
    min_samples: usize,
) -> Result<Option<CategoricalSplit>, Error> {
    let n = feature_codes.len();
    if target.len() != n || rows.len() != n {
        return Err(Error::precondition(
            "split_categorical",
            "target, feature and rows must have equal length",
        ));
    }
    if min_samples == 0 {
        return Err(Error::precondition("split_categorical", "minSamples must be >= 1"));
    }
    if n < 2 * min_samples {
        return Ok(None);
    }

    let mut bucket: Vec<Vec<usize>> = vec![Vec::new(); n_feature_categories];
    for (pos, &code) in feature_codes.iter().enumerate() {
        bucket[code as usize].push(pos);
    }
    let mut remaining: Vec<CatT> = (0..n_feature_categories as CatT).filter(|&c| !bucket[c as usize].is_empty()).collect();

    if remaining.len() < 2 {
        return Ok(None);
    }

    let mut committed: Vec<CatT> = Vec::new();

    let result = match target {
        Target::Numerical(tv) => {
            let total = NumMoments::from_values(tv);
            let per_cat: Vec<NumMoments> = bucket
                .iter()
                .map(|positions| NumMoments::from_values(&positions.iter().map(|&p| tv[p]).collect::<Vec<_>>()))
                .collect();

            let mut left = NumMoments::zero();
            let mut right = NumMoments::from_values(tv);
            let mut current_best = NumT::INFINITY;

            loop {
                if remaining.len() <= 1 {
                    break;
                }
                let mut best_trial: Option<(usize, NumT)> = None;
                for (pos, &c) in remaining.iter().enumerate() {
                    let cm = &per_cat[c as usize];
                    let trial_left = left.plus(cm);
                    let trial_right = right.minus(cm);
                    let trial_cost = trial_left.sse() + trial_right.sse();
                    if best_trial.map_or(true, |(_, v)| trial_cost < v) {
                        best_trial = Some((pos, trial_cost));
                    }
                }
                let (pos, trial_cost) = best_trial.unwrap();
                if trial_cost < current_best {
                    let c = remaining.remove(pos);
                    let cm = &per_cat[c as usize];
                    left = left.plus(cm);
                    right = right.minus(cm);
                    committed.push(c);
                    current_best = trial_cost;
                } else {
                    break;
                }
            }

            if left.n < min_samples || right.n < min_samples {
                None
            } else {
                let s_tot = total.sse();
                if s_tot <= 0.0 {
                    None
                } else {
                    let fitness = (s_tot - (left.sse() + right.sse())) / s_tot;
                    Some((left.n, right.n, fitness))
                }
            }
        }
        Target::Categorical { codes, n_categories } => {
            let per_cat: Vec<CatMoments> = bucket
                .iter()
                .map(|positions| CatMoments::from_codes(&positions.iter().map(|&p| codes[p]).collect::<Vec<_>>(), *n_categories))
                .collect();
            let sf_tot = CatMoments::from_codes(codes, *n_categories).sf();

            let mut left = CatMoments::zero(*n_categories);
            let mut right = CatMoments::from_codes(codes, *n_categories);
            let mut current_best = NumT::NEG_INFINITY;

            loop {
                if remaining.len() <= 1 {
                    break;
                }
                let mut best_trial: Option<(usize, NumT)> = None;
                for (pos, &c) in remaining.iter().enumerate() {
                    let cm = &per_cat[c as usize];
                    let trial_left_n = left.n + cm.n;
                    let trial_right_n = right.n - cm.n;
                    let trial_left_sf = left.trial_add_sf(&cm.freq);
                    let trial_right_sf = right.trial_remove_sf(&cm.freq);
                    let nsf = nsf_of(trial_left_sf, trial_left_n, trial_right_sf, trial_right_n);
                    if best_trial.map_or(true, |(_, v)| nsf > v) {
                        best_trial = Some((pos, nsf));
                    }
                }
                let (pos, trial_nsf) = best_trial.unwrap();
                if trial_nsf > current_best {
                    let c = remaining.remove(pos);
                    let cm = &per_cat[c as usize];
                    left.add(&cm.freq);
                    right.remove(&cm.freq);
                    committed.push(c);
                    current_best = trial_nsf;
                } else {
                    break;
                }
            }

            if left.n < min_samples || right.n < min_samples {
                None
            } else {
                let denom = (n * n) as NumT - sf_tot;
                if denom <= 0.0 {
                    None
                } else {
                    let nsf_final = nsf_of(left.sf(), left.n, right.sf(), right.n);
                    let fitness = (-sf_tot + n as NumT * nsf_final) / denom;
                    Some((left.n, right.n, fitness))
                }
            }
        }
    };

    let (n_l, n_r, fitness) = match result {
        Some(x) => x,
        None => return Ok(None),
    };
    debug_assert_eq!(n_l + n_r, n);

    let left_set: std::collections::HashSet<CatT> = committed.iter().copied().collect();
    let left_rows: Vec<usize> = feature_codes
        .iter()
        .enumerate()
        .filter(|&(_, &code)| left_set.contains(&(code as CatT)))
        .map(|(pos, _)| rows[pos])
        .collect();
    let right_rows: Vec<usize> = feature_codes
        .iter()
        .enumerate()
        .filter(|&(_, &code)| !left_set.contains(&(code as CatT)))
        .map(|(pos, _)| rows[pos])
        .collect();

    Ok(Some(CategoricalSplit {
        left_categories: committed,
        right_categories: remaining,
        fitness,
        left: left_rows,
        right: right_rows,
    }))
}

fn nsf_of(sf: NumT, n: usize, other_sf: NumT, other_n: usize) -> NumT {
    let a = if n > 0 { sf / n as NumT } else { 0.0 };
    let b = if other_n > 0 { other_sf / other_n as NumT } else { 0.0 };
    a + b
}
