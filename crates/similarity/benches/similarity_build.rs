//! Benchmarks for similarity construction
//!
//! Run with: cargo bench --package similarity
//!
//! Builds a synthetic interaction store (seeded, so every run sees the same
//! data) and times the dense and sparse construction paths on it.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use interaction_store::{Interaction, InteractionStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use similarity::{compute_similarity, SimilarityMetric};

const USERS: u32 = 2_000;
const ITEMS: usize = 1_500;
const PER_USER: usize = 40;

fn synthetic_store() -> InteractionStore {
    let mut rng = StdRng::seed_from_u64(0x5EED_1234);
    let mut records = Vec::with_capacity(USERS as usize * PER_USER);
    for user in 0..USERS {
        for _ in 0..PER_USER {
            let item = rng.random_range(0..ITEMS as u32);
            let strength = rng.random_range(1..=5) as f32;
            records.push(Interaction::new(user, item, strength));
        }
    }
    InteractionStore::from_interactions(ITEMS, None, records).expect("synthetic store is valid")
}

fn bench_dense_pearson(c: &mut Criterion) {
    let store = synthetic_store();

    c.bench_function("similarity_dense_pearson", |b| {
        b.iter(|| {
            let matrix = compute_similarity(black_box(&store), SimilarityMetric::Pearson, 1);
            black_box(matrix)
        })
    });
}

fn bench_sparse_cosine(c: &mut Criterion) {
    let store = synthetic_store();

    c.bench_function("similarity_sparse_cosine", |b| {
        b.iter(|| {
            let matrix = compute_similarity(black_box(&store), SimilarityMetric::Sparse, 1);
            black_box(matrix)
        })
    });
}

fn bench_top_k_lookup(c: &mut Criterion) {
    let store = synthetic_store();
    let matrix = compute_similarity(&store, SimilarityMetric::Sparse, 2);

    c.bench_function("similarity_top_k_neighbors", |b| {
        b.iter(|| {
            let neighbors = matrix.top_k_neighbors(black_box(42), black_box(50));
            black_box(neighbors)
        })
    });
}

criterion_group!(
    benches,
    bench_dense_pearson,
    bench_sparse_cosine,
    bench_top_k_lookup
);
criterion_main!(benches);
