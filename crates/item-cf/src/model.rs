//! # Trained item-based CF model
//!
//! `ItemCf::fit` runs the whole batch training pass:
//! 1. Validate the configuration and the interaction snapshot
//! 2. Build the item-item similarity structure
//! 3. Fit bias terms (rating task with baseline enabled only)
//!
//! The result is immutable. Prediction and recommendation only take `&self`,
//! so one model can be shared across threads behind an `Arc`.

use std::sync::Arc;
use std::time::Instant;

use interaction_store::{Bounds, InteractionStore};
use similarity::{compute_similarity, SimilarityMatrix};
use tracing::{debug, info, instrument};

use crate::baseline::{estimate_baselines, BaselineTerms};
use crate::config::{ItemCfConfig, Task};
use crate::error::Result;

/// Item-based neighborhood recommender after training
#[derive(Debug, Clone)]
pub struct ItemCf {
    pub(crate) config: ItemCfConfig,
    /// Shared training snapshot (read-only, so no Mutex needed)
    pub(crate) store: Arc<InteractionStore>,
    pub(crate) similarity: SimilarityMatrix,
    /// Present only when `config.uses_baseline()`
    pub(crate) baselines: Option<BaselineTerms>,
    pub(crate) global_mean: f32,
    pub(crate) bounds: Option<Bounds>,
}

impl ItemCf {
    /// Train a model on `store`.
    ///
    /// Fails with `InvalidConfiguration` or a store error before any
    /// similarity work starts.
    #[instrument(skip(store, config), fields(metric = %config.metric, k = config.k))]
    pub fn fit(mut store: Arc<InteractionStore>, config: ItemCfConfig) -> Result<Self> {
        config.validate()?;
        store.validate()?;

        if store.stats_stale() {
            debug!("Refreshing stale store statistics before training");
            Arc::make_mut(&mut store).compute_stats();
        }

        let start = Instant::now();
        let (users, items, interactions) = store.counts();
        info!(
            "Training item-cf on {} users, {} items, {} interactions",
            users, items, interactions
        );

        let similarity = compute_similarity(&store, config.metric, config.min_support);

        let baselines = if config.uses_baseline() {
            Some(estimate_baselines(&store, &config.baseline))
        } else {
            if config.use_baseline && config.task == Task::Ranking {
                debug!("Baseline correction is ignored for the ranking task");
            }
            None
        };

        let global_mean = store.global_mean();
        let bounds = store.bounds();

        info!("Trained item-cf model in {:.2?}", start.elapsed());
        Ok(Self {
            config,
            store,
            similarity,
            baselines,
            global_mean,
            bounds,
        })
    }

    pub fn config(&self) -> &ItemCfConfig {
        &self.config
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn baselines(&self) -> Option<&BaselineTerms> {
        self.baselines.as_ref()
    }

    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaselineConfig;
    use crate::error::ItemCfError;
    use interaction_store::Interaction;
    use similarity::{Representation, SimilarityMetric};

    fn store() -> Arc<InteractionStore> {
        let records = vec![
            Interaction::new(1, 0, 4.0),
            Interaction::new(1, 1, 5.0),
            Interaction::new(2, 0, 2.0),
            Interaction::new(2, 1, 3.0),
        ];
        Arc::new(InteractionStore::from_interactions(2, Some(Bounds::new(1.0, 5.0)), records).unwrap())
    }

    #[test]
    fn test_fit_rating_with_baseline() {
        let model = ItemCf::fit(store(), ItemCfConfig::default()).unwrap();
        assert!(model.baselines().is_some());
        assert_eq!(model.bounds(), Some(Bounds::new(1.0, 5.0)));
        assert!((model.global_mean() - 3.5).abs() < 1e-6);
        assert_eq!(model.similarity().representation(), Representation::Dense);
    }

    #[test]
    fn test_fit_ranking_skips_baseline() {
        let config = ItemCfConfig::new()
            .with_task(Task::Ranking)
            .with_metric(SimilarityMetric::Sparse);
        let model = ItemCf::fit(store(), config).unwrap();
        assert!(model.baselines().is_none());
        assert_eq!(model.similarity().representation(), Representation::Sparse);
    }

    #[test]
    fn test_fit_rejects_invalid_config() {
        let result = ItemCf::fit(store(), ItemCfConfig::new().with_k(0));
        assert!(matches!(result, Err(ItemCfError::InvalidConfiguration(_))));

        let config = ItemCfConfig::new().with_baseline_config(BaselineConfig::Als {
            n_epochs: 0,
            reg_user: 15.0,
            reg_item: 10.0,
        });
        assert!(ItemCf::fit(store(), config).is_err());
    }

    #[test]
    fn test_fit_store_built_by_insert() {
        let mut store = InteractionStore::new(3).with_bounds(1.0, 5.0);
        store.insert(Interaction::new(1, 0, 4.0));
        store.insert(Interaction::new(2, 1, 4.0));

        let model = ItemCf::fit(Arc::new(store), ItemCfConfig::default()).unwrap();
        assert!(!model.store().stats_stale());
        assert!((model.global_mean() - 4.0).abs() < 1e-6);
        assert!((model.baselines().unwrap().global_mean() - 4.0).abs() < 1e-6);
        assert!((model.predict(99, 0) - 4.0).abs() < 1e-6);
        assert!((model.predict(1, 2) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_rejects_invalid_store() {
        // Built by hand and never validated
        let mut store = InteractionStore::new(1);
        store.insert(Interaction::new(1, 5, 3.0));
        let result = ItemCf::fit(Arc::new(store), ItemCfConfig::default());
        assert!(matches!(result, Err(ItemCfError::Store(_))));
    }
}
