//! Seeded fixtures shared by the test modules.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `n` vectors with `dim` components drawn uniformly from [0, 1).
pub fn random_rows(n: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.random::<f64>()).collect())
        .collect()
}

/// File-name style labels, one per vector.
pub fn file_labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("img_{:04}.jpg", i)).collect()
}

pub fn is_permutation(values: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    values.len() == n
        && values.iter().all(|&v| {
            if v >= n || seen[v] {
                false
            } else {
                seen[v] = true;
                true
            }
        })
}
