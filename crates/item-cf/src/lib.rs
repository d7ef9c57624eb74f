//! # Item-CF Crate
//!
//! Item-based neighborhood collaborative filtering on top of the
//! `interaction-store` and `similarity` crates.
//!
//! ## Components
//!
//! - **config**: `ItemCfConfig`, the task switch and baseline settings
//! - **baseline**: per-user and per-item bias terms (ALS or SGD)
//! - **model**: `ItemCf::fit`, the batch training pass
//! - **predict**: k-nearest-neighbor scoring of a (user, item) pair
//! - **recommend**: top-n or weighted-random recommendation lists
//! - **shared**: `SharedModel`, an `Arc` handle that can be swapped after retraining
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use interaction_store::{Bounds, Interaction, InteractionStore};
//! use item_cf::{ItemCf, ItemCfConfig, SamplingMode};
//! use similarity::SimilarityMetric;
//!
//! let store = InteractionStore::from_interactions(
//!     3,
//!     Some(Bounds::new(1.0, 5.0)),
//!     vec![
//!         Interaction::new(1, 0, 5.0),
//!         Interaction::new(1, 1, 4.0),
//!         Interaction::new(2, 0, 5.0),
//!         Interaction::new(2, 1, 5.0),
//!         Interaction::new(2, 2, 2.0),
//!         Interaction::new(3, 2, 4.0),
//!     ],
//! )?;
//!
//! let config = ItemCfConfig::new()
//!     .with_metric(SimilarityMetric::Cosine)
//!     .with_k(10)
//!     .with_baseline(false);
//! let model = ItemCf::fit(Arc::new(store), config)?;
//!
//! let score = model.predict(1, 2);
//! assert!((1.0..=5.0).contains(&score));
//!
//! let recs = model.recommend(1, 5, 4.0, SamplingMode::Ranked)?;
//! assert_eq!(recs.first().map(|r| r.0), Some(2));
//! # Ok::<(), item_cf::ItemCfError>(())
//! ```
//!
//! Training is a one-shot batch step. Everything after it is read-only, so
//! a trained model can be shared freely between threads.

// Public modules
pub mod error;
pub mod config;
pub mod baseline;
pub mod model;
pub mod predict;
pub mod recommend;
pub mod shared;

// Re-export commonly used types
pub use baseline::{estimate_baselines, BaselineTerms};
pub use config::{BaselineConfig, ItemCfConfig, Task};
pub use error::{ItemCfError, Result};
pub use model::ItemCf;
pub use predict::{Fallback, Prediction};
pub use recommend::SamplingMode;
pub use shared::SharedModel;
