//! Similarity Engine - builds the item-item structure from an InteractionStore
//!
//! ## Algorithm
//! For every item i (one rayon task per row):
//! 1. Walk the users who interacted with i, in ascending user id order
//! 2. For each such user, walk the other items they interacted with
//! 3. Accumulate `PairStats` for every (i, j) met along the way
//! 4. Score each pair with the metric's kernel, zeroing pairs below min_support
//!
//! Each row is owned by exactly one task and accumulated in a fixed order,
//! so the result does not depend on thread scheduling. The pair (i, j) sees
//! the same users in the same order from row i and from row j, which makes
//! the structure symmetric bit for bit.

use crate::matrix::{DenseSimilarity, Representation, SimilarityMatrix, SparseSimilarity};
use crate::metric::{Kernel, PairStats, SimilarityMetric};
use interaction_store::{InteractionStore, ItemId};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Dense catalogs above this size get a memory warning
pub const DENSE_ITEM_WARN_THRESHOLD: usize = 20_000;

/// Build the similarity structure for every item in the store's catalog
#[instrument(skip(store), fields(items = store.item_count()))]
pub fn compute_similarity(
    store: &InteractionStore,
    metric: SimilarityMetric,
    min_support: u32,
) -> SimilarityMatrix {
    let start = Instant::now();
    let kernel = metric.kernel();

    let matrix = match metric.representation() {
        Representation::Dense => SimilarityMatrix::Dense(build_dense(store, kernel, min_support)),
        Representation::Sparse => {
            SimilarityMatrix::Sparse(build_sparse(store, kernel, min_support))
        }
    };

    info!(
        "Built {} similarity for {} items in {:.2?} ({} nonzero entries)",
        metric,
        matrix.item_count(),
        start.elapsed(),
        matrix.nnz()
    );
    matrix
}

/// Feed every co-rating of `item` with another item to `f(other, r_item, r_other)`
fn for_each_co_rating(store: &InteractionStore, item: ItemId, mut f: impl FnMut(ItemId, f32, f32)) {
    let Some(raters) = store.item_history(item) else {
        return;
    };
    for (&user, &r_item) in raters {
        let Some(history) = store.user_history(user) else {
            continue;
        };
        for (&other, &r_other) in history {
            if other != item {
                f(other, r_item, r_other);
            }
        }
    }
}

fn build_dense(store: &InteractionStore, kernel: Kernel, min_support: u32) -> DenseSimilarity {
    let n = store.item_count();
    if n > DENSE_ITEM_WARN_THRESHOLD {
        warn!(
            "Dense similarity over {} items needs {} MiB; consider the sparse metric",
            n,
            n * n * std::mem::size_of::<f32>() / (1024 * 1024)
        );
    }

    let mut values = vec![0.0f32; n * n];
    if n == 0 {
        return DenseSimilarity::from_raw(0, values);
    }

    values
        .par_chunks_mut(n)
        .enumerate()
        .for_each_init(
            // One accumulator per worker, reset slot by slot after each row
            || (vec![PairStats::default(); n], Vec::new()),
            |(stats, touched), (i, row)| {
                for_each_co_rating(store, i as ItemId, |j, r_i, r_j| {
                    if let Some(pair) = stats.get_mut(j as usize) {
                        if pair.count == 0 {
                            touched.push(j as usize);
                        }
                        pair.add(r_i, r_j);
                    }
                });

                row[i] = 1.0;
                for j in touched.drain(..) {
                    row[j] = stats[j].score(kernel, min_support);
                    stats[j] = PairStats::default();
                }
            },
        );

    debug!("Dense similarity rows complete");
    DenseSimilarity::from_raw(n, values)
}

fn build_sparse(store: &InteractionStore, kernel: Kernel, min_support: u32) -> SparseSimilarity {
    let n = store.item_count() as ItemId;

    let rows: Vec<Vec<(ItemId, f32)>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut stats: BTreeMap<ItemId, PairStats> = BTreeMap::new();
            for_each_co_rating(store, i, |j, r_i, r_j| {
                stats.entry(j).or_default().add(r_i, r_j)
            });

            let mut row: Vec<(ItemId, f32)> = stats
                .into_iter()
                .map(|(j, pair)| (j, pair.score(kernel, min_support)))
                .filter(|&(_, score)| score != 0.0)
                .collect();
            // Diagonal goes in at its sorted position
            let pos = row.partition_point(|&(j, _)| j < i);
            row.insert(pos, (i, 1.0));
            row
        })
        .collect();

    debug!("Sparse similarity rows complete");
    SparseSimilarity::from_rows(rows)
}
