//! Error types for the interaction-store crate.
//!
//! The store is fed already-encoded records, so the only failures are
//! records that break the encoding contract (item ids outside the catalog,
//! non-finite or out-of-bounds strengths) and malformed bounds.

use crate::types::ItemId;
use thiserror::Error;

/// Errors raised while building or validating an [`InteractionStore`](crate::InteractionStore)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Item ids are dense indices, so anything at or past the catalog size is invalid
    #[error("Item {item} is outside the catalog of {item_count} items")]
    ItemOutOfRange { item: ItemId, item_count: usize },

    /// A field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Strength bounds must be finite with lower <= upper
    #[error("Invalid strength bounds: lower {lower} > upper {upper} or not finite")]
    InvalidBounds { lower: f32, upper: f32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
