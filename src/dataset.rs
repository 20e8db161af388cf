/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! `Dataset`: an ordered collection of `FeatureColumn`s plus their
//! "contrast" (permuted-noise) shadow columns, sample identifiers and a
//! name index (§3). Shadow columns are not materialised copies: each user
//! column owns one stored permutation, and a shadow column's value at
//! sample `s` is the user column's value at `perm[s]` (the redesign this
//! spec's design notes call for). The public index arithmetic — user
//! column `i` paired with contrast column `F+i` — is preserved exactly, so
//! callers following the spec's index contract see identical behaviour.

use std::borrow::Cow;
use std::collections::HashSet;

use fnv::FnvHashMap;
use log::{debug, info, warn};

use crate::column::{FeatureColumn, FeatureKind};
use crate::config::Config;
use crate::error::Error;
use crate::numeric::is_missing;
use crate::rng::Mt19937;
use crate::NumT;

pub const CONTRAST_SUFFIX: &str = "_CONTRAST";

/// How an already-parsed 2-D string matrix is laid out. Indexing is done
/// with index math rather than a full transpose copy (§9 design note).
pub enum RawMatrix<'a> {
    /// One entry per sample; each inner slice holds the `F` feature
    /// values for that sample, in column order.
    RowMajor(&'a [Vec<String>]),
    /// One entry per feature column; each inner slice holds the `N`
    /// sample values for that column.
    ColumnMajor(&'a [Vec<String>]),
}

impl<'a> RawMatrix<'a> {
    fn cell(&self, row: usize, col: usize) -> &str {
        match self {
            RawMatrix::RowMajor(rows) => &rows[row][col],
            RawMatrix::ColumnMajor(cols) => &cols[col][row],
        }
    }
}

/// Wholesale replacement payload for `Dataset::replace_column`.
pub enum ColumnReplacement {
    Numerical(Vec<NumT>),
    Raw(Vec<String>),
}

pub struct Dataset {
    samples: Vec<String>,
    user: Vec<FeatureColumn>,
    /// `contrast_perm[c][s]` is the row of `user[c]` that contrast column
    /// `F+c` reads at sample `s`.
    contrast_perm: Vec<Vec<usize>>,
    name_index: FnvHashMap<String, usize>,
    rng: Mt19937,
}

impl Dataset {
    pub fn from_raw_matrix(
        config: &Config,
        matrix: RawMatrix,
        names: &[String],
        kinds: &[FeatureKind],
        samples: Vec<String>,
    ) -> Result<Dataset, Error> {
        if names.len() != kinds.len() {
            return Err(Error::precondition(
                "Dataset::from_raw_matrix",
                "names and kinds must have the same length",
            ));
        }
        if names.is_empty() {
            return Err(Error::precondition("Dataset::from_raw_matrix", "no input features"));
        }
        let n = samples.len();
        if n == 0 {
            return Err(Error::precondition("Dataset::from_raw_matrix", "dataset has zero samples"));
        }

        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(Error::precondition(
                    "Dataset::from_raw_matrix",
                    format!("duplicate column name '{}'", name),
                ));
            }
        }

        let f = names.len();
        let mut user = Vec::with_capacity(f);
        for col in 0..f {
            let raw: Vec<String> = (0..n).map(|row| matrix.cell(row, col).to_string()).collect();
            let column = match kinds[col] {
                FeatureKind::Numerical => FeatureColumn::from_raw_numerical(names[col].clone(), &raw)?,
                FeatureKind::Categorical => FeatureColumn::from_raw_categorical(names[col].clone(), &raw)?,
            };
            user.push(column);
        }

        let mut rng = Mt19937::from_seed_or_time(config.random_seed);
        let mut contrast_perm: Vec<Vec<usize>> = (0..f).map(|_| (0..n).collect()).collect();
        for perm in contrast_perm.iter_mut() {
            rng.shuffle(perm);
        }

        info!("dataset with {} features and {} samples", f, n);

        let mut dataset = Dataset {
            samples,
            user,
            contrast_perm,
            name_index: FnvHashMap::default(),
            rng,
        };
        dataset.rebuild_name_index();
        Ok(dataset)
    }

    fn rebuild_name_index(&mut self) {
        let f = self.user.len();
        let mut index = FnvHashMap::default();
        for (i, col) in self.user.iter().enumerate() {
            index.insert(col.name().to_string(), i);
            index.insert(format!("{}{}", col.name(), CONTRAST_SUFFIX), f + i);
        }
        self.name_index = index;
    }

    pub fn n_features(&self) -> usize {
        self.user.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_id(&self, s: usize) -> &str {
        &self.samples[s]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn column_name(&self, i: usize) -> Result<String, Error> {
        let f = self.n_features();
        if i < f {
            Ok(self.user[i].name().to_string())
        } else if i < 2 * f {
            Ok(format!("{}{}", self.user[i - f].name(), CONTRAST_SUFFIX))
        } else {
            Err(Error::precondition("Dataset::column_name", format!("column index {} out of range", i)))
        }
    }

    fn user_index(&self, i: usize) -> Result<usize, Error> {
        let f = self.n_features();
        if i < f {
            Ok(i)
        } else if i < 2 * f {
            Ok(i - f)
        } else {
            Err(Error::precondition("Dataset::user_index", format!("column index {} out of range", i)))
        }
    }

    pub fn is_numerical(&self, i: usize) -> Result<bool, Error> {
        Ok(self.user[self.user_index(i)?].is_numerical())
    }

    pub fn n_categories(&self, i: usize) -> Result<usize, Error> {
        Ok(self.user[self.user_index(i)?].n_categories())
    }

    pub fn categories(&self, i: usize) -> Result<&[String], Error> {
        Ok(self.user[self.user_index(i)?].categories())
    }

    /// Resolve a global column/sample pair to the underlying user column
    /// and the row it actually reads (identity for a user column, the
    /// stored permutation for a contrast column).
    fn resolve(&self, i: usize, s: usize) -> Result<(usize, usize), Error> {
        let f = self.n_features();
        if s >= self.n_samples() {
            return Err(Error::precondition("Dataset::resolve", format!("sample {} out of range", s)));
        }
        if i < f {
            Ok((i, s))
        } else if i < 2 * f {
            let col = i - f;
            Ok((col, self.contrast_perm[col][s]))
        } else {
            Err(Error::precondition("Dataset::resolve", format!("column index {} out of range", i)))
        }
    }

    pub fn value(&self, i: usize, s: usize) -> Result<NumT, Error> {
        let (col, row) = self.resolve(i, s)?;
        Ok(self.user[col].values()[row])
    }

    pub fn raw_value(&self, i: usize, s: usize) -> Result<String, Error> {
        let (col, row) = self.resolve(i, s)?;
        self.user[col].raw_value(row)
    }

    /// All `N` values of column `i`, materialising the permutation for a
    /// contrast column on demand.
    pub fn column_values(&self, i: usize) -> Result<Cow<[NumT]>, Error> {
        let f = self.n_features();
        if i < f {
            Ok(Cow::Borrowed(self.user[i].values()))
        } else if i < 2 * f {
            let col = i - f;
            let perm = &self.contrast_perm[col];
            let values = self.user[col].values();
            Ok(Cow::Owned(perm.iter().map(|&r| values[r]).collect()))
        } else {
            Err(Error::precondition("Dataset::column_values", format!("column index {} out of range", i)))
        }
    }

    pub fn n_real_samples(&self, i: usize) -> Result<usize, Error> {
        let values = self.column_values(i)?;
        Ok(values.iter().filter(|&&v| !is_missing(v)).count())
    }

    pub fn n_real_samples_pair(&self, i: usize, j: usize) -> Result<usize, Error> {
        let a = self.column_values(i)?;
        let b = self.column_values(j)?;
        Ok(a.iter().zip(b.iter()).filter(|&(&x, &y)| !is_missing(x) && !is_missing(y)).count())
    }

    /// Rows in `candidates` where both columns `a` and `b` are non-missing,
    /// as `(values_a, values_b, original_row_index)`, preserving the order
    /// of `candidates`.
    pub fn filtered_pair(&self, a: usize, b: usize, candidates: &[usize]) -> Result<(Vec<NumT>, Vec<NumT>, Vec<usize>), Error> {
        let va = self.column_values(a)?;
        let vb = self.column_values(b)?;
        let mut out_a = Vec::with_capacity(candidates.len());
        let mut out_b = Vec::with_capacity(candidates.len());
        let mut out_idx = Vec::with_capacity(candidates.len());
        for &row in candidates {
            let x = *va.get(row).ok_or_else(|| Error::precondition("Dataset::filtered_pair", format!("row {} out of range", row)))?;
            let y = *vb.get(row).ok_or_else(|| Error::precondition("Dataset::filtered_pair", format!("row {} out of range", row)))?;
            if !is_missing(x) && !is_missing(y) {
                out_a.push(x);
                out_b.push(y);
                out_idx.push(row);
            }
        }
        Ok((out_a, out_b, out_idx))
    }

    /// Rows in `candidates` where column `a` is non-missing, as
    /// `(values, original_row_index)`.
    pub fn filtered_single(&self, a: usize, candidates: &[usize]) -> Result<(Vec<NumT>, Vec<usize>), Error> {
        let va = self.column_values(a)?;
        let mut out_v = Vec::with_capacity(candidates.len());
        let mut out_idx = Vec::with_capacity(candidates.len());
        for &row in candidates {
            let x = *va.get(row).ok_or_else(|| Error::precondition("Dataset::filtered_single", format!("row {} out of range", row)))?;
            if !is_missing(x) {
                out_v.push(x);
                out_idx.push(row);
            }
        }
        Ok((out_v, out_idx))
    }

    /// Bootstrap over the non-missing rows of reference column `ref_col`
    /// (§4.3). Returns `(in_bag, out_of_bag)`, both ascending.
    pub fn bootstrap(&mut self, with_replacement: bool, sample_fraction: f64, ref_col: usize) -> Result<(Vec<usize>, Vec<usize>), Error> {
        if sample_fraction <= 0.0 {
            return Err(Error::precondition("Dataset::bootstrap", "sampleFraction must be > 0"));
        }
        if !with_replacement && sample_fraction > 1.0 {
            return Err(Error::precondition(
                "Dataset::bootstrap",
                "sampleFraction must be <= 1 when sampling without replacement",
            ));
        }

        let values = self.column_values(ref_col)?;
        let real: Vec<usize> = (0..self.n_samples()).filter(|&s| !is_missing(values[s])).collect();
        let r = real.len();
        let k = (sample_fraction * r as f64).floor() as usize;

        let mut in_bag = Vec::with_capacity(k);
        if with_replacement {
            for _ in 0..k {
                let pick = self.rng.uniform_below(r);
                in_bag.push(real[pick]);
            }
        } else {
            let mut shuffled = real.clone();
            self.rng.shuffle(&mut shuffled);
            in_bag.extend_from_slice(&shuffled[..k]);
        }
        in_bag.sort_unstable();

        let in_bag_set: HashSet<usize> = in_bag.iter().copied().collect();
        let out_of_bag: Vec<usize> = real.iter().copied().filter(|s| !in_bag_set.contains(s)).collect();

        debug!(
            "bootstrap: {} real rows, drew {} in-bag ({} replacement), {} out-of-bag",
            r, in_bag.len(), if with_replacement { "with" } else { "without" }, out_of_bag.len()
        );

        Ok((in_bag, out_of_bag))
    }

    /// Keep only the named user columns (and their paired contrasts).
    pub fn whitelist(&mut self, names: &[String]) -> Result<(), Error> {
        let keep: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();
        for name in &keep {
            if !self.user.iter().any(|c| c.name() == *name) {
                return Err(Error::precondition("Dataset::whitelist", format!("unknown column '{}'", name)));
            }
        }
        let mut new_user = Vec::new();
        let mut new_perm = Vec::new();
        for (col, perm) in self.user.iter().zip(self.contrast_perm.iter()) {
            if keep.contains(col.name()) {
                new_user.push(col.clone());
                new_perm.push(perm.clone());
            }
        }
        info!("whitelist: kept {} of {} features", new_user.len(), self.user.len());
        self.user = new_user;
        self.contrast_perm = new_perm;
        self.rebuild_name_index();
        Ok(())
    }

    /// Drop the named user columns (and their paired contrasts).
    pub fn blacklist(&mut self, names: &[String]) -> Result<(), Error> {
        let drop: HashSet<&str> = names.iter().map(|s| s.as_str()).collect();
        for name in &drop {
            if !self.user.iter().any(|c| c.name() == *name) {
                return Err(Error::precondition("Dataset::blacklist", format!("unknown column '{}'", name)));
            }
        }
        let mut new_user = Vec::new();
        let mut new_perm = Vec::new();
        for (col, perm) in self.user.iter().zip(self.contrast_perm.iter()) {
            if !drop.contains(col.name()) {
                new_user.push(col.clone());
                new_perm.push(perm.clone());
            }
        }
        info!("blacklist: dropped {} features", self.user.len() - new_user.len());
        self.user = new_user;
        self.contrast_perm = new_perm;
        self.rebuild_name_index();
        Ok(())
    }

    /// Wholesale replacement of a single *user* column's values. Contrast
    /// columns cannot be replaced directly (see DESIGN.md); replacing a
    /// user column re-draws its contrast permutation, since the old
    /// permutation no longer corresponds to a meaningful shuffle of the
    /// new values' positions.
    pub fn replace_column(&mut self, i: usize, replacement: ColumnReplacement) -> Result<(), Error> {
        let f = self.n_features();
        if i >= f {
            return Err(Error::precondition(
                "Dataset::replace_column",
                "only user columns (index < nFeatures) may be replaced",
            ));
        }
        match replacement {
            ColumnReplacement::Numerical(values) => self.user[i].replace_numerical(values)?,
            ColumnReplacement::Raw(raw) => self.user[i].replace_raw_categorical(&raw)?,
        }
        let n = self.n_samples();
        self.contrast_perm[i] = (0..n).collect();
        self.rng.shuffle(&mut self.contrast_perm[i]);
        warn!("replaced column {} ('{}'); its contrast was re-permuted", i, self.user[i].name());
        Ok(())
    }

    /// Re-shuffle every contrast column's permutation in place.
    pub fn permute_contrasts(&mut self) {
        for perm in self.contrast_perm.iter_mut() {
            self.rng.shuffle(perm);
        }
    }
}
