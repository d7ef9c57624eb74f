//! Hot-swappable model handle.
//!
//! Readers clone the current `Arc<ItemCf>` and keep serving from it while a
//! retrained model is built off to the side and swapped in. In-flight calls
//! finish on the model they started with.

use std::sync::Arc;

use interaction_store::InteractionStore;
use parking_lot::RwLock;
use tracing::{info, instrument};

use crate::error::Result;
use crate::model::ItemCf;

#[derive(Debug)]
pub struct SharedModel {
    inner: RwLock<Arc<ItemCf>>,
}

impl SharedModel {
    pub fn new(model: ItemCf) -> Self {
        Self {
            inner: RwLock::new(Arc::new(model)),
        }
    }

    /// Snapshot of the model currently being served
    pub fn current(&self) -> Arc<ItemCf> {
        Arc::clone(&self.inner.read())
    }

    /// Swap in `model` and return the one it replaced
    pub fn replace(&self, model: ItemCf) -> Arc<ItemCf> {
        self.swap(Arc::new(model))
    }

    fn swap(&self, model: Arc<ItemCf>) -> Arc<ItemCf> {
        std::mem::replace(&mut *self.inner.write(), model)
    }

    /// Train on a new snapshot with the current configuration, then swap.
    ///
    /// On failure the served model is left untouched.
    #[instrument(skip(self, store))]
    pub fn retrain(&self, store: Arc<InteractionStore>) -> Result<Arc<ItemCf>> {
        let config = self.current().config().clone();
        let model = Arc::new(ItemCf::fit(store, config)?);
        self.swap(Arc::clone(&model));
        info!("Swapped in retrained item-cf model");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemCfConfig;
    use interaction_store::Interaction;
    use std::thread;

    fn store(strength: f32) -> Arc<InteractionStore> {
        let records = vec![
            Interaction::new(1, 0, strength),
            Interaction::new(1, 1, strength),
            Interaction::new(2, 0, strength),
        ];
        Arc::new(InteractionStore::from_interactions(2, None, records).unwrap())
    }

    fn model(strength: f32) -> ItemCf {
        ItemCf::fit(store(strength), ItemCfConfig::default()).unwrap()
    }

    #[test]
    fn test_replace_returns_previous() {
        let shared = SharedModel::new(model(2.0));
        let before = shared.current();
        let previous = shared.replace(model(4.0));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(previous.global_mean(), 2.0);
        assert_eq!(shared.current().global_mean(), 4.0);
    }

    #[test]
    fn test_retrain_keeps_config() {
        let config = ItemCfConfig::new().with_k(7).with_baseline(false);
        let shared = SharedModel::new(ItemCf::fit(store(3.0), config.clone()).unwrap());

        let retrained = shared.retrain(store(5.0)).unwrap();
        assert_eq!(retrained.config(), &config);
        assert_eq!(retrained.global_mean(), 5.0);
        assert!(Arc::ptr_eq(&retrained, &shared.current()));
    }

    #[test]
    fn test_failed_retrain_keeps_model() {
        let shared = SharedModel::new(model(3.0));
        let mut bad = InteractionStore::new(1);
        bad.insert(Interaction::new(1, 9, 3.0));

        assert!(shared.retrain(Arc::new(bad)).is_err());
        assert_eq!(shared.current().global_mean(), 3.0);
    }

    #[test]
    fn test_retrain_returns_the_model_it_trained() {
        let shared = SharedModel::new(model(3.0));
        let retrained = shared.retrain(store(5.0)).unwrap();

        // A later swap does not change what the retrain call handed back
        shared.replace(model(1.0));
        assert_eq!(retrained.global_mean(), 5.0);
        assert_eq!(shared.current().global_mean(), 1.0);
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedModel::new(model(3.0)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let score = shared.current().predict(1, 0);
                        assert!(score.is_finite());
                    }
                })
            })
            .collect();

        shared.replace(model(4.0));
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
