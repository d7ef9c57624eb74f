//! Example: Train an item-cf model and recommend for a few users
//!
//! Run with: cargo run --package item-cf --example recommend_demo
//!
//! This example shows how to:
//! 1. Build an interaction store from a synthetic ratings catalog
//! 2. Train a model with each similarity metric
//! 3. Explain a single prediction
//! 4. Produce ranked and weighted-random recommendations
//! 5. Retrain and swap the served model

use interaction_store::{Bounds, Interaction, InteractionStore};
use item_cf::{ItemCf, ItemCfConfig, SamplingMode, SharedModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use similarity::SimilarityMetric;
use std::sync::Arc;
use std::time::Instant;

const USERS: u32 = 500;
const ITEMS: u32 = 200;

/// Users belong to one of four taste groups; each group rates its own
/// quarter of the catalog high and everything else low.
fn synthetic_catalog(seed: u64, users: u32) -> Vec<Interaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::new();
    for user in 0..users {
        let group = user % 4;
        for item in 0..ITEMS {
            if !rng.random_bool(0.08) {
                continue;
            }
            let liked = item % 4 == group;
            let strength = if liked {
                rng.random_range(4..=5)
            } else {
                rng.random_range(1..=3)
            };
            records.push(Interaction::new(user, item, strength as f32));
        }
    }
    records
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== Item-CF Recommendation Example ===\n");

    let start = Instant::now();
    let store = Arc::new(InteractionStore::from_interactions(
        ITEMS as usize,
        Some(Bounds::new(1.0, 5.0)),
        synthetic_catalog(7, USERS),
    )?);
    let (users, items, interactions) = store.counts();
    println!(
        "Built store in {:?}: {} users, {} items, {} interactions (mean {:.2})\n",
        start.elapsed(),
        users,
        items,
        interactions,
        store.global_mean()
    );

    let user_id = 1;

    for metric in [
        SimilarityMetric::Cosine,
        SimilarityMetric::Pearson,
        SimilarityMetric::Sparse,
    ] {
        let config = ItemCfConfig::new().with_metric(metric).with_k(30);
        let start = Instant::now();
        let model = ItemCf::fit(Arc::clone(&store), config)?;
        println!(
            "[{}] trained in {:?}, {} nonzero similarities",
            metric,
            start.elapsed(),
            model.similarity().nnz()
        );

        let recs = model.recommend(user_id, 5, 4.0, SamplingMode::Ranked)?;
        println!("  Top 5 for user {}:", user_id);
        for (i, (item, score)) in recs.iter().enumerate() {
            let group = if item % 4 == user_id % 4 { "in-group" } else { "other" };
            println!("    {}. item {} ({:.3}, {})", i + 1, item, score, group);
        }
        println!();
    }

    // Explain one prediction
    let model = ItemCf::fit(Arc::clone(&store), ItemCfConfig::default())?;
    let target = 5;
    let prediction = model.predict_detailed(user_id, target);
    println!("Prediction for user {} on item {}:", user_id, target);
    println!("  Score: {:.3}", prediction.score);
    println!("  Neighbors used: {}", prediction.neighbors_used);
    if let Some(reason) = prediction.fallback {
        println!("  Fallback: {:?}", reason);
    }
    println!();

    // Weighted-random sampling, reproducible with a seeded rng
    let mut rng = StdRng::seed_from_u64(42);
    match model.recommend_with_rng(user_id, 5, 4.0, SamplingMode::WeightedRandom, &mut rng) {
        Ok(sampled) => {
            println!("Weighted sample for user {}:", user_id);
            for (item, score) in sampled {
                println!("  item {} ({:.3})", item, score);
            }
        }
        Err(e) => println!("Weighted sampling unavailable: {}", e),
    }
    println!();

    // Serve, then retrain on a larger snapshot and swap
    let shared = SharedModel::new(model);
    let bigger = Arc::new(InteractionStore::from_interactions(
        ITEMS as usize,
        Some(Bounds::new(1.0, 5.0)),
        synthetic_catalog(8, USERS * 2),
    )?);
    let start = Instant::now();
    let retrained = shared.retrain(bigger)?;
    println!(
        "Retrained on {} interactions in {:?}",
        retrained.store().interaction_count(),
        start.elapsed()
    );
    let recs = shared
        .current()
        .recommend(user_id, 5, 4.0, SamplingMode::Ranked)?;
    println!("New top 5 for user {}: {:?}", user_id, recs);

    Ok(())
}
