//! Error types for the similarity crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    /// Metric name did not match any supported metric
    #[error("Unsupported similarity metric '{name}' (expected cosine, pearson or sparse)")]
    UnsupportedMetric { name: String },

    /// Deserialized similarity data violates the layout invariants
    #[error("Malformed similarity matrix: {reason}")]
    MalformedMatrix { reason: String },
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
