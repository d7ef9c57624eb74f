//! Baseline Estimator - per-user and per-item bias terms
//!
//! Fits `global_mean + b_u + b_i` to the observed strengths by minimizing
//! the regularized squared error. Two optimizers are available:
//!
//! ## ALS
//! Each epoch first solves every item bias in closed form with the user
//! biases fixed, then every user bias with the item biases fixed:
//! - `b_i = Σ_u (r_ui - μ - b_u) / (reg_item + |U_i|)`
//! - `b_u = Σ_i (r_ui - μ - b_i) / (reg_user + |I_u|)`
//!
//! ## SGD
//! Sweeps interactions in ascending (user, item) order:
//! - `err = r_ui - (μ + b_u + b_i)`
//! - `b_u += lr * (err - reg * b_u)`, `b_i += lr * (err - reg * b_i)`
//!
//! Both walk the store's sorted maps, so equal inputs give bitwise-equal biases.

use crate::config::BaselineConfig;
use interaction_store::{InteractionStore, ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Fitted bias terms. Ids unseen in training have a bias of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineTerms {
    global_mean: f32,
    user_bias: HashMap<UserId, f32>,
    item_bias: HashMap<ItemId, f32>,
}

impl BaselineTerms {
    pub fn user(&self, user: UserId) -> f32 {
        self.user_bias.get(&user).copied().unwrap_or(0.0)
    }

    pub fn item(&self, item: ItemId) -> f32 {
        self.item_bias.get(&item).copied().unwrap_or(0.0)
    }

    /// Expected strength of `user` on `item` without neighborhood information
    pub fn estimate(&self, user: UserId, item: ItemId) -> f32 {
        self.global_mean + self.user(user) + self.item(item)
    }

    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn user_biases(&self) -> &HashMap<UserId, f32> {
        &self.user_bias
    }

    pub fn item_biases(&self) -> &HashMap<ItemId, f32> {
        &self.item_bias
    }
}

/// Fit bias terms for every user and item in the store
#[instrument(skip(store), fields(interactions = store.interaction_count()))]
pub fn estimate_baselines(store: &InteractionStore, config: &BaselineConfig) -> BaselineTerms {
    let mu = store.global_mean() as f64;
    let mut user_bias: HashMap<UserId, f64> = store.users().map(|(user, _)| (user, 0.0)).collect();
    let mut item_bias: HashMap<ItemId, f64> = store.items().map(|(item, _)| (item, 0.0)).collect();

    match *config {
        BaselineConfig::Als {
            n_epochs,
            reg_user,
            reg_item,
        } => {
            for epoch in 0..n_epochs {
                for (item, raters) in store.items() {
                    let dev: f64 = raters
                        .iter()
                        .map(|(user, &r)| r as f64 - mu - user_bias[user])
                        .sum();
                    item_bias.insert(item, dev / (reg_item as f64 + raters.len() as f64));
                }
                for (user, items) in store.users() {
                    let dev: f64 = items
                        .iter()
                        .map(|(item, &r)| r as f64 - mu - item_bias[item])
                        .sum();
                    user_bias.insert(user, dev / (reg_user as f64 + items.len() as f64));
                }
                trace!("ALS epoch {} done", epoch + 1);
            }
        }
        BaselineConfig::Sgd {
            n_epochs,
            learning_rate,
            reg,
        } => {
            let (lr, reg) = (learning_rate as f64, reg as f64);
            for epoch in 0..n_epochs {
                for interaction in store.interactions() {
                    let bu = user_bias.entry(interaction.user_id).or_insert(0.0);
                    let bi = item_bias.entry(interaction.item_id).or_insert(0.0);
                    let err = interaction.strength as f64 - (mu + *bu + *bi);
                    *bu += lr * (err - reg * *bu);
                    *bi += lr * (err - reg * *bi);
                }
                trace!("SGD epoch {} done", epoch + 1);
            }
        }
    }

    let terms = BaselineTerms {
        global_mean: mu as f32,
        user_bias: user_bias.into_iter().map(|(u, b)| (u, b as f32)).collect(),
        item_bias: item_bias.into_iter().map(|(i, b)| (i, b as f32)).collect(),
    };

    debug!(
        "Fitted baselines for {} users and {} items, training rmse {:.4}",
        terms.user_bias.len(),
        terms.item_bias.len(),
        training_rmse(store, &terms)
    );
    terms
}

fn training_rmse(store: &InteractionStore, terms: &BaselineTerms) -> f64 {
    let (sq_err, n) = store.interactions().fold((0.0f64, 0usize), |(acc, n), i| {
        let err = (i.strength - terms.estimate(i.user_id, i.item_id)) as f64;
        (acc + err * err, n + 1)
    });
    if n == 0 { 0.0 } else { (sq_err / n as f64).sqrt() }
}
