//! Recommendation Generator - "items similar to what you liked"
//!
//! ## Algorithm
//! 1. Seed items: for the rating task the user's items rated at or above
//!    `like_threshold`, for the ranking task every item they interacted with
//! 2. For each seed, take its top-k neighbors (seeds with no neighbor
//!    besides themselves contribute nothing)
//! 3. Score every neighbor the user has not interacted with through the
//!    prediction engine, keeping one entry per item
//! 4. Either rank the candidates by score, or sample from the ones at or
//!    above `like_threshold` with probability proportional to their score

use std::collections::HashMap;

use interaction_store::{ItemId, UserId};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use similarity::compare_neighbors;
use tracing::{debug, instrument};

use crate::config::Task;
use crate::error::{ItemCfError, Result};
use crate::model::ItemCf;

/// How the final list is produced from the scored candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Highest scores first
    #[default]
    Ranked,
    /// Sample without replacement, weighted by score
    WeightedRandom,
}

impl ItemCf {
    /// Recommend up to `n` items the user has not interacted with yet.
    ///
    /// Weighted-random mode draws from the thread-local RNG; use
    /// `recommend_with_rng` for reproducible draws.
    pub fn recommend(
        &self,
        user: UserId,
        n: usize,
        like_threshold: f32,
        mode: SamplingMode,
    ) -> Result<Vec<(ItemId, f32)>> {
        self.recommend_with_rng(user, n, like_threshold, mode, &mut rand::rng())
    }

    #[instrument(skip(self, rng), fields(user_id = user))]
    pub fn recommend_with_rng<R: Rng + ?Sized>(
        &self,
        user: UserId,
        n: usize,
        like_threshold: f32,
        mode: SamplingMode,
        rng: &mut R,
    ) -> Result<Vec<(ItemId, f32)>> {
        let candidates = self.collect_candidates(user, like_threshold);
        debug!("Collected {} candidates for user {}", candidates.len(), user);

        match mode {
            SamplingMode::Ranked => Ok(rank_candidates(candidates, n)),
            SamplingMode::WeightedRandom => {
                sample_candidates(user, candidates, n, like_threshold, rng)
            }
        }
    }

    /// Score every unseen top-k neighbor of the user's seed items
    fn collect_candidates(&self, user: UserId, like_threshold: f32) -> HashMap<ItemId, f32> {
        let mut candidates: HashMap<ItemId, f32> = HashMap::new();

        let Some(history) = self.store.user_history(user) else {
            debug!("User {} has no training interactions", user);
            return candidates;
        };

        for (&seed, &strength) in history {
            if self.config.task == Task::Rating && strength < like_threshold {
                continue;
            }

            let neighbors = self.similarity.top_k_neighbors(seed, self.config.k);
            if neighbors.is_empty() {
                continue;
            }

            for (candidate, _) in neighbors {
                if history.contains_key(&candidate) {
                    continue;
                }
                candidates
                    .entry(candidate)
                    .or_insert_with(|| self.predict(user, candidate));
            }
        }

        candidates
    }
}

/// Sort by score descending (ties: lower item id) and keep the first `n`
fn rank_candidates<I>(candidates: I, n: usize) -> Vec<(ItemId, f32)>
where
    I: IntoIterator<Item = (ItemId, f32)>,
{
    let mut ranked: Vec<(ItemId, f32)> = candidates.into_iter().collect();
    ranked.sort_by(compare_neighbors);
    ranked.truncate(n);
    ranked
}

fn sample_candidates<R: Rng + ?Sized>(
    user: UserId,
    candidates: HashMap<ItemId, f32>,
    n: usize,
    like_threshold: f32,
    rng: &mut R,
) -> Result<Vec<(ItemId, f32)>> {
    let insufficient = || ItemCfError::InsufficientCandidates {
        user,
        like_threshold,
    };

    // Ranked first so a seeded rng always sees the same order
    let qualifying = rank_candidates(
        candidates
            .into_iter()
            .filter(|&(_, score)| score >= like_threshold),
        usize::MAX,
    );

    if qualifying.is_empty() {
        return Err(insufficient());
    }
    if qualifying.len() <= n {
        return Ok(qualifying);
    }

    // Only positive scores can carry probability mass
    let positive = qualifying.iter().filter(|&&(_, score)| score > 0.0).count();
    if positive == 0 {
        return Err(insufficient());
    }

    let chosen = qualifying
        .choose_multiple_weighted(rng, n.min(positive), |&(_, score)| score.max(0.0))
        .map_err(|e| ItemCfError::Sampling(e.to_string()))?
        .copied()
        .collect();
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidates(pairs: &[(ItemId, f32)]) -> HashMap<ItemId, f32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_rank_candidates() {
        let ranked = rank_candidates(candidates(&[(4, 3.0), (1, 4.5), (2, 3.0), (9, 1.0)]), 3);
        assert_eq!(ranked, vec![(1, 4.5), (2, 3.0), (4, 3.0)]);
    }

    #[test]
    fn test_sample_requires_qualifying_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = sample_candidates(1, candidates(&[(1, 2.0), (2, 3.5)]), 5, 4.0, &mut rng);
        assert_eq!(
            result,
            Err(ItemCfError::InsufficientCandidates {
                user: 1,
                like_threshold: 4.0
            })
        );
    }

    #[test]
    fn test_sample_returns_all_when_few() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = sample_candidates(
            1,
            candidates(&[(1, 4.0), (2, 4.5), (3, 1.0)]),
            5,
            4.0,
            &mut rng,
        )
        .unwrap();
        assert_eq!(result, vec![(2, 4.5), (1, 4.0)]);
    }

    #[test]
    fn test_sample_subset_of_qualifying() {
        let pool: Vec<(ItemId, f32)> = (0..20).map(|i| (i, 3.0 + (i % 3) as f32)).collect();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let result = sample_candidates(1, candidates(&pool), 4, 4.0, &mut rng).unwrap();
            assert_eq!(result.len(), 4);
            let mut ids: Vec<ItemId> = result.iter().map(|&(i, _)| i).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), 4, "sampled without replacement");
            for (item, score) in result {
                assert!(score >= 4.0);
                assert_eq!(score, 3.0 + (item % 3) as f32);
            }
        }
    }

    #[test]
    fn test_sample_seeded_is_reproducible() {
        let pool: Vec<(ItemId, f32)> = (0..30).map(|i| (i, 1.0 + i as f32 / 10.0)).collect();
        let first =
            sample_candidates(1, candidates(&pool), 5, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        let second =
            sample_candidates(1, candidates(&pool), 5, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_skips_zero_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = candidates(&[(1, 0.0), (2, 0.0), (3, 0.5), (4, 0.0)]);
        let result = sample_candidates(1, pool, 2, 0.0, &mut rng).unwrap();
        assert_eq!(result, vec![(3, 0.5)]);

        let pool = candidates(&[(1, 0.0), (2, 0.0), (3, 0.0)]);
        let result = sample_candidates(1, pool, 2, 0.0, &mut rng);
        assert!(matches!(result, Err(ItemCfError::InsufficientCandidates { .. })));
    }
}
