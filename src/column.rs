/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

//! `FeatureColumn`: a typed column of `N` samples, either numerical or
//! categorical (categories encoded as small integers with a bidirectional
//! label map), with missing values represented uniformly by the Missing
//! sentinel (§3).

use fnv::FnvHashMap;

use crate::error::Error;
use crate::numeric::is_missing;
use crate::{CatT, NumT};

pub const MISSING_SPELLING: &str = "NA";

/// Case-folded spellings that the loader (and `FeatureColumn` construction
/// from raw strings) recognises as Missing (§6).
fn is_missing_spelling(s: &str) -> bool {
    match s.trim().to_ascii_uppercase().as_str() {
        "" | "NA" | "NAN" | "N/A" | "NULL" | "?" | "#N/A" => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Numerical,
    Categorical,
}

#[derive(Debug, Clone)]
pub struct FeatureColumn {
    name: String,
    kind: FeatureKind,
    values: Vec<NumT>,
    forward: FnvHashMap<String, CatT>,
    reverse: Vec<String>,
}

impl FeatureColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn is_numerical(&self) -> bool {
        self.kind == FeatureKind::Numerical
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[NumT] {
        &self.values
    }

    pub fn n_real_samples(&self) -> usize {
        self.values.iter().filter(|&&v| !is_missing(v)).count()
    }

    /// Ordered category labels indexed by code; empty for numerical columns.
    pub fn categories(&self) -> &[String] {
        &self.reverse
    }

    pub fn n_categories(&self) -> usize {
        self.reverse.len()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Formatted value for sample `s`: the number as a string for a
    /// numerical column, the category label for a categorical column, or
    /// the canonical Missing spelling.
    pub fn raw_value(&self, s: usize) -> Result<String, Error> {
        let v = *self
            .values
            .get(s)
            .ok_or_else(|| Error::precondition("FeatureColumn::raw_value", format!("sample {} out of range", s)))?;
        if is_missing(v) {
            return Ok(MISSING_SPELLING.to_string());
        }
        match self.kind {
            FeatureKind::Numerical => Ok(format!("{}", v)),
            FeatureKind::Categorical => {
                let code = v as usize;
                self.reverse.get(code).cloned().ok_or_else(|| {
                    Error::precondition("FeatureColumn::raw_value", format!("unknown category code {}", code))
                })
            }
        }
    }

    pub fn from_raw_numerical(name: impl Into<String>, raw: &[String]) -> Result<FeatureColumn, Error> {
        let mut values = Vec::with_capacity(raw.len());
        for s in raw {
            values.push(parse_numeric_or_missing(s)?);
        }
        Ok(FeatureColumn {
            name: name.into(),
            kind: FeatureKind::Numerical,
            values,
            forward: FnvHashMap::default(),
            reverse: Vec::new(),
        })
    }

    /// Categorical codes are assigned in first-seen order (§3 Lifecycle).
    pub fn from_raw_categorical(name: impl Into<String>, raw: &[String]) -> Result<FeatureColumn, Error> {
        let mut forward = FnvHashMap::default();
        let mut reverse = Vec::new();
        let mut values = Vec::with_capacity(raw.len());
        for s in raw {
            if is_missing_spelling(s) {
                values.push(NumT::NAN);
                continue;
            }
            let code = *forward.entry(s.clone()).or_insert_with(|| {
                let code = reverse.len() as CatT;
                reverse.push(s.clone());
                code
            });
            values.push(code as NumT);
        }
        Ok(FeatureColumn {
            name: name.into(),
            kind: FeatureKind::Categorical,
            values,
            forward,
            reverse,
        })
    }

    /// Wholesale replacement with numerical values. Must preserve length;
    /// clears any category maps.
    pub fn replace_numerical(&mut self, values: Vec<NumT>) -> Result<(), Error> {
        if values.len() != self.values.len() {
            return Err(Error::precondition(
                "FeatureColumn::replace_numerical",
                format!("length mismatch: column has {} samples, got {}", self.values.len(), values.len()),
            ));
        }
        self.kind = FeatureKind::Numerical;
        self.values = values;
        self.forward.clear();
        self.reverse.clear();
        Ok(())
    }

    /// Wholesale replacement with raw string values, re-encoded as fresh
    /// categories in first-seen order. Must preserve length.
    pub fn replace_raw_categorical(&mut self, raw: &[String]) -> Result<(), Error> {
        if raw.len() != self.values.len() {
            return Err(Error::precondition(
                "FeatureColumn::replace_raw_categorical",
                format!("length mismatch: column has {} samples, got {}", self.values.len(), raw.len()),
            ));
        }
        let replacement = FeatureColumn::from_raw_categorical(self.name.clone(), raw)?;
        *self = replacement;
        Ok(())
    }
}

fn parse_numeric_or_missing(s: &str) -> Result<NumT, Error> {
    if is_missing_spelling(s) {
        return Ok(NumT::NAN);
    }
    s.trim()
        .parse::<NumT>()
        .map_err(|_| Error::precondition("FeatureColumn::from_raw_numerical", format!("cannot parse '{}' as a number", s)))
}

/// The feature-header convention consumed by external loaders and
/// surfaced here so the core can validate it: a name prefixed with `N` +
/// `delimiter` is numerical, `C` or `B` + `delimiter` is categorical,
/// anything else is invalid.
pub fn parse_header_kind(name: &str, delimiter: char) -> Result<FeatureKind, Error> {
    let mut chars = name.chars();
    let tag = chars.next();
    let sep = chars.next();
    match (tag, sep) {
        (Some('N'), Some(d)) if d == delimiter => Ok(FeatureKind::Numerical),
        (Some('C'), Some(d)) | (Some('B'), Some(d)) if d == delimiter => Ok(FeatureKind::Categorical),
        _ => Err(Error::precondition(
            "parse_header_kind",
            format!("invalid feature header '{}'", name),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn strs(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numerical_column_parses_missing_spellings() {
        let raw = strs(&["1.0", "NA", "3.5", "?", ""]);
        let col = FeatureColumn::from_raw_numerical("x", &raw).unwrap();
        assert_eq!(col.len(), 5);
        assert_eq!(col.n_real_samples(), 2);
        assert!(is_missing(col.values()[1]));
        assert!(is_missing(col.values()[3]));
        assert!(is_missing(col.values()[4]));
    }

    #[test]
    fn categorical_column_first_seen_order() {
        let raw = strs(&["red", "green", "red", "blue", "NULL"]);
        let col = FeatureColumn::from_raw_categorical("color", &raw).unwrap();
        assert_eq!(col.categories(), &["red", "green", "blue"]);
        assert_eq!(col.values()[0], 0.0);
        assert_eq!(col.values()[1], 1.0);
        assert_eq!(col.values()[2], 0.0);
        assert_eq!(col.values()[3], 2.0);
        assert!(is_missing(col.values()[4]));
        assert_eq!(col.n_real_samples(), 4);
    }

    #[test]
    fn forward_reverse_are_mutual_inverses() {
        let raw = strs(&["a", "b", "c", "a", "b"]);
        let col = FeatureColumn::from_raw_categorical("x", &raw).unwrap();
        for (code, label) in col.categories().iter().enumerate() {
            assert_eq!(col.forward[label], code as CatT);
        }
    }

    #[test]
    fn raw_value_round_trips() {
        let raw = strs(&["red", "green", "NA"]);
        let col = FeatureColumn::from_raw_categorical("color", &raw).unwrap();
        assert_eq!(col.raw_value(0).unwrap(), "red");
        assert_eq!(col.raw_value(1).unwrap(), "green");
        assert_eq!(col.raw_value(2).unwrap(), MISSING_SPELLING);
    }

    #[test]
    fn replace_numerical_rejects_length_mismatch() {
        let raw = strs(&["1", "2", "3"]);
        let mut col = FeatureColumn::from_raw_numerical("x", &raw).unwrap();
        assert!(col.replace_numerical(vec![1.0, 2.0]).is_err());
        assert!(col.replace_numerical(vec![9.0, 9.0, 9.0]).is_ok());
        assert_eq!(col.values(), &[9.0, 9.0, 9.0]);
    }

    #[test]
    fn replace_raw_categorical_changes_kind() {
        let raw = strs(&["1", "2", "3"]);
        let mut col = FeatureColumn::from_raw_numerical("x", &raw).unwrap();
        assert!(col.is_numerical());
        col.replace_raw_categorical(&strs(&["a", "b", "a"])).unwrap();
        assert!(!col.is_numerical());
        assert_eq!(col.categories(), &["a", "b"]);
    }

    #[test]
    fn header_convention() {
        assert_eq!(parse_header_kind("N:age", ':').unwrap(), FeatureKind::Numerical);
        assert_eq!(parse_header_kind("C:sex", ':').unwrap(), FeatureKind::Categorical);
        assert_eq!(parse_header_kind("B:flag", ':').unwrap(), FeatureKind::Categorical);
        assert!(parse_header_kind("age", ':').is_err());
        assert!(parse_header_kind("X:age", ':').is_err());
    }
}
