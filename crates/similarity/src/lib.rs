//! # Similarity Crate
//!
//! This crate computes the item-item similarity structure that the
//! neighborhood recommender reads its neighbors from.
//!
//! ## Components
//!
//! ### Metrics
//! - **Cosine**: dot product of co-rated strengths over the product of their norms
//! - **Pearson**: the same ratio after mean-centering over the co-rated users
//! - **Sparse**: cosine that only ever visits co-occurring pairs and keeps
//!   only nonzero entries, for catalogs too large for an items² array
//!
//! ### Matrix
//! `SimilarityMatrix` is an enum over the dense and sparse layouts with one
//! interface (`neighbors_of`, `value_at`, `top_k_neighbors`), so callers
//! never branch on the layout.
//!
//! ## Example Usage
//!
//! ```
//! use interaction_store::{Interaction, InteractionStore};
//! use similarity::{compute_similarity, SimilarityMetric};
//!
//! let store = InteractionStore::from_interactions(
//!     3,
//!     None,
//!     vec![
//!         Interaction::new(1, 0, 5.0),
//!         Interaction::new(1, 1, 4.0),
//!         Interaction::new(2, 0, 3.0),
//!         Interaction::new(2, 1, 3.0),
//!     ],
//! )
//! .unwrap();
//!
//! let metric: SimilarityMetric = "cosine".parse().unwrap();
//! let matrix = compute_similarity(&store, metric, 1);
//!
//! assert!(matrix.value_at(0, 1) > 0.9);
//! assert_eq!(matrix.neighbors_of(0).len(), 1);
//! ```
//!
//! ## Performance
//!
//! Construction is the dominant training cost: O(items²) memory for the
//! dense layout, proportional to the number of co-rating pairs for the
//! sparse one. Rows are built in parallel with rayon.

// Public modules
pub mod error;
pub mod metric;
pub mod matrix;
pub mod engine;

// Re-export commonly used types
pub use engine::{compute_similarity, DENSE_ITEM_WARN_THRESHOLD};
pub use error::{Result, SimilarityError};
pub use matrix::{
    compare_neighbors, DenseSimilarity, Representation, SimilarityMatrix, SparseSimilarity,
};
pub use metric::SimilarityMetric;
