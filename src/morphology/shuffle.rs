// src/morphology/shuffle.rs

use rand::Rng;

/// In-place Fisher-Yates shuffle (Knuth's Algorithm P).
///
/// Walks `j` from the last index down to 1, draws `U` uniform in `[0,1)`
/// and swaps position `j` with `floor(j * U)`.  Every run of the engine
/// draws from the caller's generator, so two runs seeded identically
/// consume identical permutation streams.
pub(crate) fn shuffle<T, R: Rng>(data: &mut [T], rng: &mut R) {
    if data.is_empty() {
        return;
    }
    let mut j = data.len() - 1;
    while j > 0 {
        let u: f64 = rng.gen_range(0.0..1.0);
        let k = ((j as f64) * u).floor() as usize;
        data.swap(j, k);
        j -= 1;
    }
}
