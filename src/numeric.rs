/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! Numeric primitives shared by the column/dataset/split-finder layers
//! (§4.1): the Missing sentinel, a stable argsort, incremental mean/SSE
//! (Welford) and squared-frequency accumulators, plus plain mean/variance
//! and Pearson correlation for callers that just want a descriptive
//! statistic.

use crate::NumT;
use crate::error::Error;

/// `x` is the Missing sentinel iff it is not equal to itself.
#[inline]
pub fn is_missing(x: NumT) -> bool {
    x != x
}

/// Sort `values` ascending, dropping Missing entries first, and return the
/// sorted values together with the index permutation `perm` such that
/// `sorted[i] == values[perm[i]]`. Ties break by original position
/// (`sort_by` is a stable sort and `perm` starts in ascending index order,
/// so equal keys keep their relative order).
pub fn stable_argsort(values: &[NumT]) -> (Vec<NumT>, Vec<usize>) {
    let mut perm: Vec<usize> = (0..values.len()).filter(|&i| !is_missing(values[i])).collect();
    perm.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).expect("missing values were filtered"));
    let sorted = perm.iter().map(|&i| values[i]).collect();
    (sorted, perm)
}

/// Incremental mean + sum-of-squared-errors accumulator (Welford).
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSse {
    n: usize,
    mean: NumT,
    sse: NumT,
}

impl MeanSse {
    pub fn new() -> MeanSse {
        MeanSse::default()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn mean(&self) -> NumT {
        self.mean
    }

    pub fn sse(&self) -> NumT {
        self.sse
    }

    /// Add `x`, with current count `n-1` becoming `n`.
    pub fn add(&mut self, x: NumT) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as NumT;
        self.sse += delta * (x - self.mean);
    }

    /// Remove `x`, the exact inverse of `add`. Fails if the accumulator is
    /// empty, or if removing `x` would leave it with zero samples (the
    /// recurrence's denominator would be zero).
    pub fn remove(&mut self, x: NumT) -> Result<(), Error> {
        if self.n == 0 {
            return Err(Error::precondition("MeanSse::remove", "cannot decrement an empty accumulator"));
        }
        if self.n == 1 {
            return Err(Error::precondition(
                "MeanSse::remove",
                "decrementing below one sample is undefined",
            ));
        }
        let delta = x - self.mean;
        self.n -= 1;
        self.mean -= delta / self.n as NumT;
        self.sse -= delta * (x - self.mean);
        Ok(())
    }
}

/// Incremental `Σ fc²` accumulator over a small-integer category alphabet.
#[derive(Debug, Clone)]
pub struct SquaredFreq {
    freq: Vec<u32>,
    sum_sq: i64,
    n: usize,
}

impl SquaredFreq {
    pub fn new(n_categories: usize) -> SquaredFreq {
        SquaredFreq {
            freq: vec![0; n_categories],
            sum_sq: 0,
            n: 0,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn sum_sq(&self) -> NumT {
        self.sum_sq as NumT
    }

    pub fn freq(&self) -> &[u32] {
        &self.freq
    }

    pub fn add(&mut self, category: usize) {
        let fc = self.freq[category] as i64;
        self.sum_sq += 2 * fc + 1;
        self.freq[category] += 1;
        self.n += 1;
    }

    pub fn remove(&mut self, category: usize) -> Result<(), Error> {
        if self.freq[category] == 0 {
            return Err(Error::precondition(
                "SquaredFreq::remove",
                format!("category {} has zero count", category),
            ));
        }
        let fc = self.freq[category] as i64;
        self.sum_sq += -2 * fc + 1;
        self.freq[category] -= 1;
        self.n -= 1;
        Ok(())
    }
}

/// SSE computed from raw moments: `Σx² - (Σx)²/n`. Equivalent to, but
/// cheaper to recombine than, a `MeanSse` built incrementally, when all you
/// have are pooled sums (used by the categorical split finder's
/// closed-form category moves).
pub fn sse_from_moments(n: usize, sum: NumT, sum_sq: NumT) -> NumT {
    if n == 0 {
        0.0
    } else {
        sum_sq - sum * sum / n as NumT
    }
}

/// One-shot mean over a full slice of already-non-missing values.
pub fn mean(xs: &[NumT]) -> Option<NumT> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<NumT>() / xs.len() as NumT)
    }
}

/// One-shot population variance (divides by `n`, matching the SSE/n
/// convention the fitness formulas use elsewhere in this crate).
pub fn variance(xs: &[NumT]) -> Option<NumT> {
    let mu = mean(xs)?;
    Some(xs.iter().map(|&x| (x - mu) * (x - mu)).sum::<NumT>() / xs.len() as NumT)
}

/// Pearson correlation over the non-missing-in-both pairs of `xs`/`ys`.
/// Returns `None` when fewer than two such pairs exist, or when either
/// side is constant (zero variance).
pub fn pearson_correlation(xs: &[NumT], ys: &[NumT]) -> Option<NumT> {
    let pairs: Vec<(NumT, NumT)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|&(&x, &y)| !is_missing(x) && !is_missing(y))
        .map(|(&x, &y)| (x, y))
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as NumT;
    let mean_x = pairs.iter().map(|p| p.0).sum::<NumT>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<NumT>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        None
    } else {
        Some(cov / (var_x.sqrt() * var_y.sqrt()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_is_self_unequal() {
        let m = NumT::NAN;
        assert!(is_missing(m));
        assert!(!is_missing(0.0));
        assert!(!is_missing(-1.5));
    }

    #[test]
    fn argsort_filters_missing_and_is_stable() {
        let values = vec![3.0, 1.0, NumT::NAN, 1.0, 2.0];
        let (sorted, perm) = stable_argsort(&values);
        assert_eq!(sorted, vec![1.0, 1.0, 2.0, 3.0]);
        assert_eq!(perm, vec![1, 3, 4, 0]);
    }

    #[test]
    fn mean_sse_matches_scenario_one() {
        let mut acc = MeanSse::new();
        for &x in &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            acc.add(x);
        }
        assert_eq!(acc.n(), 6);
        assert!((acc.sse() - 17.5).abs() < 1e-9);
    }

    #[test]
    fn mean_sse_remove_is_inverse_of_add() {
        let mut acc = MeanSse::new();
        for &x in &[1.0, 2.0, 3.0, 4.0, 5.0] {
            acc.add(x);
        }
        let snapshot = (acc.n(), acc.mean(), acc.sse());
        acc.add(42.0);
        acc.remove(42.0).unwrap();
        assert_eq!(acc.n(), snapshot.0);
        assert!((acc.mean() - snapshot.1).abs() < 1e-9);
        assert!((acc.sse() - snapshot.2).abs() < 1e-9);
    }

    #[test]
    fn mean_sse_remove_below_one_errors() {
        let mut acc = MeanSse::new();
        acc.add(5.0);
        assert!(acc.remove(5.0).is_err());
    }

    #[test]
    fn mean_sse_remove_empty_errors() {
        let mut acc = MeanSse::new();
        assert!(acc.remove(5.0).is_err());
    }

    #[test]
    fn squared_freq_add_remove_inverse() {
        let mut sf = SquaredFreq::new(3);
        sf.add(0);
        sf.add(0);
        sf.add(1);
        assert_eq!(sf.sum_sq(), 5.0); // 2^2 + 1^2
        sf.remove(0).unwrap();
        assert_eq!(sf.sum_sq(), 2.0); // 1^2 + 1^2
    }

    #[test]
    fn squared_freq_remove_zero_errors() {
        let mut sf = SquaredFreq::new(2);
        assert!(sf.remove(0).is_err());
    }

    #[test]
    fn sse_from_moments_matches_incremental() {
        let mut acc = MeanSse::new();
        let xs = [10.0, 10.0, 20.0, 20.0, 30.0, 30.0];
        for &x in &xs {
            acc.add(x);
        }
        let sum: NumT = xs.iter().sum();
        let sum_sq: NumT = xs.iter().map(|x| x * x).sum();
        let from_moments = sse_from_moments(xs.len(), sum, sum_sq);
        assert!((from_moments - acc.sse()).abs() < 1e-9);
    }

    #[test]
    fn pearson_perfect_correlation() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        let ys = vec![2.0, 4.0, 6.0, 8.0];
        let r = pearson_correlation(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_ignores_missing_pairs() {
        let xs = vec![1.0, NumT::NAN, 3.0, 4.0];
        let ys = vec![2.0, 4.0, 6.0, 8.0];
        let r = pearson_correlation(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mean_and_variance() {
        let xs = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&xs).unwrap() - 5.0).abs() < 1e-9);
        assert!((variance(&xs).unwrap() - 4.0).abs() < 1e-9);
    }
}
