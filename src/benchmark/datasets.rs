//! Seeded synthetic corpora for tests and benches.
//!
//! Uniform data is the adversarial baseline; projected shingle corpora are
//! closer to the clustered generator (recordings of the same work land near
//! each other), which is what makes approximate search shine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::Corpus;
use crate::error::Result;

/// Corpus of `n` items uniformly distributed in `[0, 1]^dimension`.
pub fn uniform_corpus(n: usize, dimension: usize, seed: u64) -> Result<Corpus> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f32> = (0..n * dimension).map(|_| rng.random::<f32>()).collect();
    Corpus::from_flat(dimension, data)
}

/// Corpus sampled around `n_clusters` uniform centers with Gaussian noise of
/// standard deviation `spread`.
pub fn clustered_corpus(
    n: usize,
    dimension: usize,
    n_clusters: usize,
    spread: f32,
    seed: u64,
) -> Result<Corpus> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Vec<f32>> = (0..n_clusters.max(1))
        .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
        .collect();

    let mut data = Vec::with_capacity(n * dimension);
    for _ in 0..n {
        let center = &centers[rng.random_range(0..centers.len())];
        for &c in center {
            data.push(c + gaussian(&mut rng) * spread);
        }
    }
    Corpus::from_flat(dimension, data)
}

/// `n` query vectors uniformly distributed in `[0, 1]^dimension`.
pub fn uniform_queries(n: usize, dimension: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
        .collect()
}

/// Standard normal sample via Box-Muller.
fn gaussian(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.random::<f32>().max(f32::MIN_POSITIVE);
    let u2: f32 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}
