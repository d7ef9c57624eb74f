//! Similarity metrics and the per-pair statistics they are computed from.
//!
//! Every metric is restricted to the users who interacted with both items.
//! For one pair the engine accumulates a `PairStats` while walking those
//! users, then turns it into a single score.

use crate::error::SimilarityError;
use crate::matrix::Representation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which similarity algorithm to build the item-item structure with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Cosine of co-rated strength vectors, dense output
    Cosine,
    /// Mean-centered cosine over the co-rated set, dense output
    #[default]
    Pearson,
    /// Cosine over co-occurring pairs only, sparse row-list output
    #[serde(alias = "sklearn")]
    Sparse,
}

impl SimilarityMetric {
    /// Physical representation this metric produces
    pub fn representation(&self) -> Representation {
        match self {
            SimilarityMetric::Cosine | SimilarityMetric::Pearson => Representation::Dense,
            SimilarityMetric::Sparse => Representation::Sparse,
        }
    }

    pub(crate) fn kernel(&self) -> Kernel {
        match self {
            SimilarityMetric::Cosine | SimilarityMetric::Sparse => Kernel::Cosine,
            SimilarityMetric::Pearson => Kernel::Pearson,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::Pearson => "pearson",
            SimilarityMetric::Sparse => "sparse",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMetric {
    type Err = SimilarityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(SimilarityMetric::Cosine),
            "pearson" => Ok(SimilarityMetric::Pearson),
            "sparse" | "sklearn" => Ok(SimilarityMetric::Sparse),
            _ => Err(SimilarityError::UnsupportedMetric {
                name: s.to_string(),
            }),
        }
    }
}

/// Scoring formula applied to accumulated pair statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kernel {
    Cosine,
    Pearson,
}

/// Running sums for one (i, j) pair over the users who rated both.
///
/// Sums are kept in `f64`. Every formula below is symmetric in (i, j) using
/// only commutative operations, so the score computed from row i equals the
/// score computed from row j bit for bit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PairStats {
    pub count: u32,
    pub prod: f64,
    pub sum_i: f64,
    pub sum_j: f64,
    pub sq_i: f64,
    pub sq_j: f64,
}

impl PairStats {
    pub fn add(&mut self, r_i: f32, r_j: f32) {
        let (r_i, r_j) = (r_i as f64, r_j as f64);
        self.count += 1;
        self.prod += r_i * r_j;
        self.sum_i += r_i;
        self.sum_j += r_j;
        self.sq_i += r_i * r_i;
        self.sq_j += r_j * r_j;
    }

    /// Similarity score, exactly 0.0 below `min_support` co-ratings
    pub fn score(&self, kernel: Kernel, min_support: u32) -> f32 {
        if self.count == 0 || self.count < min_support {
            return 0.0;
        }

        let value = match kernel {
            Kernel::Cosine => {
                let denom = (self.sq_i * self.sq_j).sqrt();
                if denom > 0.0 { self.prod / denom } else { 0.0 }
            }
            Kernel::Pearson => {
                let n = self.count as f64;
                let var_i = n * self.sq_i - self.sum_i * self.sum_i;
                let var_j = n * self.sq_j - self.sum_j * self.sum_j;
                if var_i <= 0.0 || var_j <= 0.0 {
                    0.0
                } else {
                    (n * self.prod - self.sum_i * self.sum_j) / (var_i * var_j).sqrt()
                }
            }
        };

        (value as f32).clamp(-1.0, 1.0)
    }
}
