//! Error types for the item-cf crate.
//!
//! Only failures a caller can act on are errors. Unknown users or items and
//! empty neighborhoods are handled inside the prediction engine by falling
//! back to the global mean (see [`Fallback`](crate::Fallback)).

use interaction_store::{StoreError, UserId};
use similarity::SimilarityError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemCfError {
    /// Rejected before any training work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Weighted-random recommendation found nothing at or above the like threshold
    #[error(
        "Not enough candidates for user {user} with score >= {like_threshold}, try lowering the like threshold"
    )]
    InsufficientCandidates { user: UserId, like_threshold: f32 },

    /// The sampler rejected the candidate weights
    #[error("Weighted sampling failed: {0}")]
    Sampling(String),

    /// Training snapshot broke the store's encoding contract
    #[error("Interaction store error: {0}")]
    Store(#[from] StoreError),
}

/// An unsupported metric name is a configuration problem
impl From<SimilarityError> for ItemCfError {
    fn from(err: SimilarityError) -> Self {
        ItemCfError::InvalidConfiguration(err.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ItemCfError>;
