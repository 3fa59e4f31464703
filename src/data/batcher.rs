// ============================================================
// Layer 4: Window Batcher
// ============================================================
// Builds training batches out of sampled windows.
//
// A training step wants `batch_size` windows of `seq_len`
// tokens each. The batcher draws them one by one from the
// sampler and lays them out row-major in a single flat buffer,
// the shape an int tensor of [batch_size, seq_len] expects:
//
//   [w0_t0, w0_t1, ..., w0_tS, w1_t0, ..., wN_tS] → [N, S]
//
// The accepted position of each row is kept next to the
// tokens so a batch can be traced back to its source chunks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::sampler::Sampler;
use crate::domain::errors::Result;
use crate::domain::window::WindowPosition;

/// `batch_size` windows of `seq_len` tokens, flattened row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBatch {
    /// Token IDs, `batch_size * seq_len` of them
    pub tokens: Vec<u32>,

    /// Where each row was sampled from
    pub positions: Vec<WindowPosition>,

    pub batch_size: usize,
    pub seq_len:    usize,
}

impl TokenBatch {
    /// Tokens of row `i`.
    pub fn row(&self, i: usize) -> &[u32] {
        &self.tokens[i * self.seq_len..(i + 1) * self.seq_len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.batch_size).map(move |i| self.row(i))
    }

    /// `[batch_size, seq_len]`
    pub fn shape(&self) -> [usize; 2] {
        [self.batch_size, self.seq_len]
    }
}

/// Draws fixed-shape batches from a sampler.
#[derive(Clone, Copy, Debug)]
pub struct WindowBatcher {
    batch_size: usize,
    seq_len:    usize,
}

impl WindowBatcher {
    pub fn new(batch_size: usize, seq_len: usize) -> Self {
        Self { batch_size, seq_len }
    }

    /// Draw one batch. Fails without drawing anything if `seq_len`
    /// is too long for the sampler's corpus.
    pub fn next_batch<C, R>(&self, sampler: &mut Sampler<'_, C, R>) -> Result<TokenBatch>
    where
        C: AsRef<[u32]>,
        R: Rng,
    {
        sampler.check_length(self.seq_len)?;

        let mut tokens    = Vec::with_capacity(self.batch_size * self.seq_len);
        let mut positions = Vec::with_capacity(self.batch_size);

        for _ in 0..self.batch_size {
            let pos = sampler.sample_position(self.seq_len)?;
            tokens.extend_from_slice(sampler.window(pos, self.seq_len));
            positions.push(pos);
        }

        Ok(TokenBatch {
            tokens,
            positions,
            batch_size: self.batch_size,
            seq_len:    self.seq_len,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SamplerError;

    fn chunks() -> Vec<Vec<u32>> {
        vec![(0..40).collect(), (100..160).collect(), (200..230).collect()]
    }

    #[test]
    fn test_batch_shape() {
        let chunks  = chunks();
        let mut s   = Sampler::seeded(&chunks, 11).unwrap();
        let batch   = WindowBatcher::new(4, 8).next_batch(&mut s).unwrap();

        assert_eq!(batch.shape(), [4, 8]);
        assert_eq!(batch.tokens.len(), 32);
        assert_eq!(batch.positions.len(), 4);
        assert_eq!(batch.rows().count(), 4);
    }

    #[test]
    fn test_rows_match_positions() {
        let chunks = chunks();
        let mut s  = Sampler::seeded(&chunks, 12).unwrap();
        let batch  = WindowBatcher::new(16, 5).next_batch(&mut s).unwrap();

        for (row, pos) in batch.rows().zip(&batch.positions) {
            assert_eq!(row, &chunks[pos.chunk][pos.offset..pos.offset + 5]);
        }
    }

    #[test]
    fn test_rows_are_contiguous_tokens() {
        let chunks = chunks();
        let mut s  = Sampler::seeded(&chunks, 13).unwrap();
        let batch  = WindowBatcher::new(8, 6).next_batch(&mut s).unwrap();

        // Every chunk holds consecutive integers, so rows must too
        for row in batch.rows() {
            assert!(row.windows(2).all(|w| w[1] == w[0] + 1), "row {row:?} crosses a chunk");
        }
    }

    #[test]
    fn test_too_long_window_fails() {
        let chunks = chunks();
        let mut s  = Sampler::seeded(&chunks, 14).unwrap();

        // mean chunk size is 130 / 3 = 43
        let err = WindowBatcher::new(2, 43).next_batch(&mut s).unwrap_err();
        assert_eq!(err, SamplerError::InsufficientData { length: 43, threshold: 43 });
    }

    #[test]
    fn test_empty_batch_still_checks_length() {
        let chunks = chunks();
        let mut s  = Sampler::seeded(&chunks, 15).unwrap();

        let err = WindowBatcher::new(0, 43).next_batch(&mut s).unwrap_err();
        assert_eq!(err, SamplerError::InsufficientData { length: 43, threshold: 43 });

        let batch = WindowBatcher::new(0, 42).next_batch(&mut s).unwrap();
        assert!(batch.tokens.is_empty());
    }
}
