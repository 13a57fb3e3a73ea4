// ============================================================
// Layer 4 — Evaluation Subset Sampler
// ============================================================
// Full benchmark sets run to thousands of triplets. For quick
// checks we shuffle with a fixed seed and keep the first
// `limit` items, so two runs with the same seed score the same
// subset and their numbers are comparable.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// seeded StdRng.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `items` with `seed` and keep at most `limit`.
/// `None` keeps every item in its original order.
pub fn sample_subset<T>(mut items: Vec<T>, limit: Option<usize>, seed: u64) -> Vec<T> {
    let Some(limit) = limit else {
        return items;
    };
    if limit >= items.len() {
        return items;
    }

    let total = items.len();
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    items.truncate(limit);

    tracing::debug!("Sampled {} of {} items (seed {})", items.len(), total, seed);
    items
}
