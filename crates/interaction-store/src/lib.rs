//! # Interaction Store Crate
//!
//! This crate holds the training snapshot the recommender reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Interaction, Bounds, InteractionStore)
//! - **index**: Build the store, compute statistics, validate it
//! - **error**: Error types for store construction
//!
//! ## Example Usage
//!
//! ```
//! use interaction_store::{Interaction, InteractionStore, Bounds};
//!
//! let store = InteractionStore::from_interactions(
//!     3,
//!     Some(Bounds::new(1.0, 5.0)),
//!     vec![
//!         Interaction::new(1, 0, 5.0),
//!         Interaction::new(1, 2, 3.0),
//!         Interaction::new(2, 0, 4.0),
//!     ],
//! )?;
//!
//! assert_eq!(store.user_history(1).map(|h| h.len()), Some(2));
//! assert!((store.global_mean() - 4.0).abs() < 1e-6);
//! # Ok::<(), interaction_store::StoreError>(())
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use types::{Bounds, Interaction, InteractionStore, ItemId, Strength, UserId};
