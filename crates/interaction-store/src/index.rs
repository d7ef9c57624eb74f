//! Building and validating an InteractionStore.
//!
//! Record decoding happens upstream; this module takes encoded
//! interactions and turns them into a checked, ready-to-train store:
//! - insert records into both views
//! - compute aggregate statistics (global mean)
//! - validate the encoding contract

use crate::error::{Result, StoreError};
use crate::types::*;
use tracing::debug;

impl InteractionStore {
    /// Build a store from encoded interactions in one step.
    ///
    /// Steps:
    /// 1. Insert every record (last strength wins for duplicates)
    /// 2. Compute statistics
    /// 3. Validate ids, strengths and bounds
    pub fn from_interactions<I>(
        item_count: usize,
        bounds: Option<Bounds>,
        interactions: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Interaction>,
    {
        let mut store = InteractionStore::new(item_count);
        store.bounds = bounds;

        for interaction in interactions {
            store.insert(interaction);
        }

        store.compute_stats();
        store.validate()?;

        let (users, items, interactions) = store.counts();
        debug!(
            "Built interaction store: {} users, {} items, {} interactions, global mean {:.4}",
            users, items, interactions, store.global_mean()
        );
        Ok(store)
    }

    /// Recompute aggregate statistics
    pub fn compute_stats(&mut self) {
        self.global_mean = self.mean_strength();
        self.interaction_count = self.user_items.values().map(|items| items.len()).sum();
        self.stats_stale = false;
    }

    /// Mean strength accumulated in `f64` in ascending (user, item) order
    pub(crate) fn mean_strength(&self) -> f32 {
        let (total, count) = self
            .user_items
            .values()
            .flat_map(|items| items.values())
            .fold((0.0f64, 0usize), |(sum, n), &strength| {
                (sum + strength as f64, n + 1)
            });

        if count > 0 {
            (total / count as f64) as f32
        } else {
            0.0
        }
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Bounds, if any, are finite with lower <= upper
    /// - Every item id is inside the catalog
    /// - Every strength is finite and, with bounds, inside them
    pub fn validate(&self) -> Result<()> {
        if let Some(bounds) = self.bounds {
            if !bounds.is_well_formed() {
                return Err(StoreError::InvalidBounds {
                    lower: bounds.lower,
                    upper: bounds.upper,
                });
            }
        }

        for interaction in self.interactions() {
            if !self.contains_item(interaction.item_id) {
                return Err(StoreError::ItemOutOfRange {
                    item: interaction.item_id,
                    item_count: self.item_count,
                });
            }
            if !interaction.strength.is_finite() {
                return Err(StoreError::InvalidValue {
                    field: "strength".to_string(),
                    value: interaction.strength.to_string(),
                });
            }
            if let Some(bounds) = self.bounds {
                if !bounds.contains(interaction.strength) {
                    return Err(StoreError::InvalidValue {
                        field: "strength".to_string(),
                        value: interaction.strength.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
