// ============================================================
// Layer 4: Train/Validation Chunk Splitter
// ============================================================
// Holds back a share of the chunk collection for validation.
//
// The split is done at chunk granularity: a validation window
// must never overlap text the model trained on, and windows
// never cross chunks, so whole chunks are the safe unit.
//
// Chunks are shuffled first because ingestion order follows
// file order, and neighbouring files are often near-duplicates.
// The random source is passed in so a seed reproduces the split.

use rand::{seq::SliceRandom, Rng};

/// Shuffle `chunks` and split into (train, validation).
///
/// `train_fraction` is clamped to `0.0..=1.0`; e.g. 0.9 keeps 90%
/// of the chunks (rounded) for training.
pub fn split_train_val<T, R: Rng + ?Sized>(
    mut chunks:     Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    chunks.shuffle(rng);

    let total    = chunks.len();
    let fraction = train_fraction.clamp(0.0, 1.0);
    let split_at = ((total as f64) * fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) leaves [0..n) in `chunks` and returns [n..total)
    let val = chunks.split_off(split_at);

    tracing::debug!(
        "Chunk split: {} training, {} validation",
        chunks.len(),
        val.len(),
    );

    (chunks, val)
}
