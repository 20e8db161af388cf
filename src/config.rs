/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

/// Shared knobs for dataset construction, bagging and split-finding.
///
/// External loaders (AFM/ARFF parsing, CLI flag handling) build one of
/// these and pass it through to `Dataset::from_raw_matrix`; the core
/// itself never reads a file or a command line flag.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lower bound on samples per child node for both split finders.
    pub min_samples: usize,

    /// Fraction of the non-missing reference column to draw in a bootstrap.
    pub sample_fraction: f64,

    /// Draw the bootstrap with or without replacement.
    pub with_replacement: bool,

    /// Seed for the dataset's Mersenne-Twister-equivalent RNG. A negative
    /// value means "derive a seed from the wall clock" (see `rng`).
    pub random_seed: i64,

    /// Delimiter separating the type-tag prefix (`N`/`C`/`B`) from the rest
    /// of a feature header, per the feature-header convention.
    pub header_delimiter: char,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            min_samples: 3,
            sample_fraction: 1.0,
            with_replacement: true,
            random_seed: -1,
            header_delimiter: ':',
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::new();
        assert!(config.min_samples >= 1);
        assert!(config.sample_fraction > 0.0);
    }
}
