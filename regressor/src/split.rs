//! Deterministic held-out split: a seeded index shuffle, reproducible
//! across runs and machines.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Partitions `0..n_rows` into (train, test) index sets.
///
/// The same `(n_rows, test_fraction, seed)` triple always yields the
/// same partition. At least one row lands on each side.
///
/// # Panics
/// If `test_fraction` is outside `(0, 1)` or `n_rows < 2`.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    assert!(
        test_fraction > 0.0 && test_fraction < 1.0,
        "test_fraction must lie in (0, 1)"
    );
    assert!(n_rows >= 2, "need at least two rows to split");

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_rows as f64 * test_fraction).round() as usize).clamp(1, n_rows - 1);
    let train = indices.split_off(n_test);
    (train, indices)
}
