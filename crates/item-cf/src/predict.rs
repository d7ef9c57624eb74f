//! Prediction Engine - k-nearest-neighbor scoring of one (user, item) pair
//!
//! ## Algorithm
//! 1. Take the item's nonzero-similarity neighbors (never the item itself)
//! 2. Keep the neighbors the user interacted with, as (neighbor, sim, strength)
//! 3. Sort by similarity descending (ties: lower item id) and keep the top k
//! 4. Rating task: similarity-weighted average over positively similar
//!    neighbors, bias-corrected when baselines are enabled, clipped to bounds
//! 5. Ranking task: sum of the positive similarities
//!
//! Unknown users or items and empty neighborhoods are not errors. They fall
//! back to the global mean (rating) or 0.0 (ranking), and `Fallback` records
//! which path was taken.

use interaction_store::{ItemId, Strength, UserId};
use similarity::compare_neighbors;
use tracing::trace;

use crate::config::Task;
use crate::model::ItemCf;

/// Why a prediction used the fallback score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fallback {
    /// User has no training interactions
    UnknownUser,
    /// Item id is outside the catalog
    UnknownItem,
    /// None of the item's neighbors were rated by the user
    EmptyNeighborhood,
    /// No kept neighbor had a positive similarity (rating task)
    ZeroWeight,
}

/// A score plus how it was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub score: f32,
    /// Neighbors that contributed to the score
    pub neighbors_used: usize,
    pub fallback: Option<Fallback>,
}

impl ItemCf {
    /// Predicted affinity of `user` for `item`
    pub fn predict(&self, user: UserId, item: ItemId) -> f32 {
        self.predict_detailed(user, item).score
    }

    /// Like `predict`, but also reports neighbor usage and fallbacks
    pub fn predict_detailed(&self, user: UserId, item: ItemId) -> Prediction {
        let Some(history) = self.store.user_history(user) else {
            return self.fallback(user, item, Fallback::UnknownUser);
        };
        if !self.store.contains_item(item) {
            return self.fallback(user, item, Fallback::UnknownItem);
        }

        let mut neighbors: Vec<(ItemId, f32, Strength)> = self
            .similarity
            .neighbors_of(item)
            .into_iter()
            .filter_map(|(j, sim)| history.get(&j).map(|&strength| (j, sim, strength)))
            .collect();

        if neighbors.is_empty() {
            return self.fallback(user, item, Fallback::EmptyNeighborhood);
        }

        neighbors.sort_by(|a, b| compare_neighbors(&(a.0, a.1), &(b.0, b.1)));
        neighbors.truncate(self.config.k);

        match self.config.task {
            Task::Rating => self.rating_score(user, item, &neighbors),
            Task::Ranking => {
                let positive = neighbors.iter().filter(|n| n.1 > 0.0);
                Prediction {
                    score: positive.clone().map(|n| n.1).sum(),
                    neighbors_used: positive.count(),
                    fallback: None,
                }
            }
        }
    }

    fn rating_score(
        &self,
        user: UserId,
        item: ItemId,
        neighbors: &[(ItemId, f32, Strength)],
    ) -> Prediction {
        let baselines = self.baselines.as_ref();

        let mut weighted = 0.0f32;
        let mut weight_sum = 0.0f32;
        let mut used = 0;
        for &(j, sim, strength) in neighbors {
            if sim <= 0.0 {
                continue;
            }
            let target = match baselines {
                Some(b) => strength - b.estimate(user, j),
                None => strength,
            };
            weighted += sim * target;
            weight_sum += sim;
            used += 1;
        }

        if weight_sum <= 0.0 {
            return self.fallback(user, item, Fallback::ZeroWeight);
        }

        let mut score = weighted / weight_sum;
        if let Some(b) = baselines {
            score += b.estimate(user, item);
        }
        if let Some(bounds) = self.bounds {
            score = bounds.clip(score);
        }

        Prediction {
            score,
            neighbors_used: used,
            fallback: None,
        }
    }

    fn fallback(&self, user: UserId, item: ItemId, reason: Fallback) -> Prediction {
        trace!(user, item, ?reason, "prediction fell back");
        let score = match self.config.task {
            Task::Rating => self.global_mean,
            Task::Ranking => 0.0,
        };
        Prediction {
            score,
            neighbors_used: 0,
            fallback: Some(reason),
        }
    }
}
