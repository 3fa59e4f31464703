// ============================================================
// Layer 4: Fair Window Sampler
// ============================================================
// Draws fixed-length windows of tokens from a collection of
// variably sized chunks.
//
// "Fair" means every window that fits inside a single chunk is
// equally likely: the same distribution as sampling a start
// position uniformly from one long concatenated stream and
// throwing away any window that crosses a chunk boundary.
//
//   concatenation:  | chunk 0 ...... | chunk 1 ... | chunk 2 ........ |
//   draw start:                   ^--window--^        ← crosses, redraw
//   draw start:          ^--window--^                 ← accepted
//
// Chunks are borrowed, never copied. The random source is owned
// by the sampler so a fixed seed always replays the same windows.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::boundary::BoundaryIndex;
use crate::domain::errors::{Result, SamplerError};
use crate::domain::window::WindowPosition;

/// Fairly samples contiguous windows from a borrowed chunk collection.
///
/// `C` is any token buffer (`Vec<u32>`, `&[u32]`, ...); `R` is the
/// random source, `StdRng` unless a test injects its own.
#[derive(Debug)]
pub struct Sampler<'a, C, R = StdRng> {
    chunks: &'a [C],
    index:  BoundaryIndex,
    rng:    R,
}

impl<'a, C: AsRef<[u32]>> Sampler<'a, C, StdRng> {
    /// Build a sampler with a `StdRng` seeded from `seed`.
    pub fn seeded(chunks: &'a [C], seed: u64) -> Result<Self> {
        Self::new(chunks, StdRng::seed_from_u64(seed))
    }

    /// Build a sampler with a `StdRng` seeded from OS entropy.
    pub fn from_entropy(chunks: &'a [C]) -> Result<Self> {
        Self::new(chunks, StdRng::from_entropy())
    }
}

impl<'a, C: AsRef<[u32]>, R: Rng> Sampler<'a, C, R> {
    /// Build a sampler over `chunks`, drawing randomness from `rng`.
    ///
    /// The boundary table is computed once here; the chunk order
    /// must not change for the lifetime of the sampler.
    pub fn new(chunks: &'a [C], rng: R) -> Result<Self> {
        if chunks.is_empty() {
            return Err(SamplerError::EmptyCollection);
        }

        Ok(Self {
            chunks,
            index: BoundaryIndex::new(chunks),
            rng,
        })
    }

    pub fn boundary_index(&self) -> &BoundaryIndex {
        &self.index
    }

    pub fn num_chunks(&self) -> usize {
        self.index.num_chunks()
    }

    pub fn total_size(&self) -> usize {
        self.index.total_size()
    }

    /// Mean chunk size (integer division). Requested windows must be
    /// strictly shorter than this.
    pub fn threshold(&self) -> usize {
        self.index.total_size() / self.index.num_chunks()
    }

    /// Largest window length `sample` accepts, if any.
    pub fn max_window(&self) -> Option<usize> {
        self.threshold().checked_sub(1)
    }

    /// Draw one window of exactly `length` tokens.
    ///
    /// The returned slice borrows the source chunk read-only.
    pub fn sample(&mut self, length: usize) -> Result<&'a [u32]> {
        let pos = self.sample_position(length)?;
        Ok(self.window(pos, length))
    }

    /// The tokens of a window at `pos`, as reported by `sample_position`.
    ///
    /// # Panics
    /// Panics if the window does not fit inside chunk `pos.chunk`.
    pub fn window(&self, pos: WindowPosition, length: usize) -> &'a [u32] {
        let chunks: &'a [C] = self.chunks;
        &chunks[pos.chunk].as_ref()[pos.offset..pos.end(length)]
    }

    /// Draw one window and copy it out.
    pub fn sample_owned(&mut self, length: usize) -> Result<Vec<u32>> {
        self.sample(length).map(<[u32]>::to_vec)
    }

    /// Draw `count` independent windows of `length` tokens.
    pub fn sample_batch(&mut self, count: usize, length: usize) -> Result<Vec<&'a [u32]>> {
        self.check_length(length)?;
        (0..count).map(|_| self.sample(length)).collect()
    }

    /// Draw one window and report where it starts instead of its tokens.
    ///
    /// Rejection loop: pick a start uniformly from
    /// `0..=total_size - length - 1`, keep it only if the window fits
    /// inside the chunk that start lands in. There is no retry cap.
    /// A draw is rejected only when it lands in the last `length`
    /// tokens of a chunk, so with `length` below the mean chunk size
    /// the expected number of draws stays small.
    pub fn sample_position(&mut self, length: usize) -> Result<WindowPosition> {
        self.check_length(length)?;

        // length < total / n <= total, so this cannot underflow
        let max_start = self.index.total_size() - length - 1;

        loop {
            let start = self.rng.gen_range(0..=max_start);
            if let Some(pos) = self.accept(start, length) {
                return Ok(pos);
            }
        }
    }

    pub(crate) fn check_length(&self, length: usize) -> Result<()> {
        let threshold = self.threshold();
        if length >= threshold {
            return Err(SamplerError::InsufficientData { length, threshold });
        }
        Ok(())
    }

    /// Accept a global start offset iff the whole window stays in its chunk.
    fn accept(&self, start: usize, length: usize) -> Option<WindowPosition> {
        let i = self.index.locate(start);
        if self.index.chunk_end(i) >= start + length {
            Some(WindowPosition::new(i, start - self.index.chunk_start(i)))
        } else {
            None
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn numbered_chunks(lengths: &[usize]) -> Vec<Vec<u32>> {
        // Every token is unique so a window identifies its own position
        let mut next = 0u32;
        lengths
            .iter()
            .map(|&len| {
                let chunk: Vec<u32> = (next..next + len as u32).collect();
                next += len as u32;
                chunk
            })
            .collect()
    }

    #[test]
    fn test_empty_collection_is_rejected() {
        let chunks: Vec<Vec<u32>> = Vec::new();
        let err = Sampler::seeded(&chunks, 0).unwrap_err();
        assert_eq!(err, SamplerError::EmptyCollection);
    }

    #[test]
    fn test_length_equal_to_mean_fails() {
        let chunks = numbered_chunks(&[10, 10, 10]);
        let mut sampler = Sampler::seeded(&chunks, 1).unwrap();

        let err = sampler.sample(10).unwrap_err();
        assert_eq!(err, SamplerError::InsufficientData { length: 10, threshold: 10 });
    }

    #[test]
    fn test_length_below_mean_succeeds() {
        let chunks = numbered_chunks(&[10, 10, 10]);
        let mut sampler = Sampler::seeded(&chunks, 1).unwrap();

        let window = sampler.sample(9).unwrap();
        assert_eq!(window.len(), 9);
    }

    #[test]
    fn test_length_above_mean_fails() {
        let chunks = numbered_chunks(&[4, 100]);
        let mut sampler = Sampler::seeded(&chunks, 1).unwrap();

        // mean is 52 even though the second chunk alone could fit 60
        assert!(matches!(
            sampler.sample(60),
            Err(SamplerError::InsufficientData { length: 60, threshold: 52 })
        ));
        assert_eq!(sampler.max_window(), Some(51));
    }

    #[test]
    fn test_all_empty_chunks_fail_every_length() {
        let chunks: Vec<Vec<u32>> = vec![vec![], vec![]];
        let mut sampler = Sampler::seeded(&chunks, 1).unwrap();

        assert!(sampler.sample(0).is_err());
        assert_eq!(sampler.max_window(), None);
    }

    #[test]
    fn test_windows_never_cross_chunks() {
        let chunks = numbered_chunks(&[7, 0, 13, 3, 25, 0, 12]);
        let mut sampler = Sampler::seeded(&chunks, 42).unwrap();

        for _ in 0..2_000 {
            let window = sampler.sample(3).unwrap();
            assert_eq!(window.len(), 3);

            // Unique tokens: the window must be a contiguous run of one chunk
            let owner: Vec<_> = chunks
                .iter()
                .filter(|c| c.windows(3).any(|w| w == window))
                .collect();
            assert_eq!(owner.len(), 1, "window {window:?} not inside exactly one chunk");
        }
    }

    #[test]
    fn test_position_matches_returned_tokens() {
        let chunks = numbered_chunks(&[5, 9, 6]);
        let mut a = Sampler::seeded(&chunks, 7).unwrap();
        let mut b = Sampler::seeded(&chunks, 7).unwrap();

        for _ in 0..200 {
            let pos    = a.sample_position(4).unwrap();
            let window = b.sample(4).unwrap();
            assert_eq!(window, &chunks[pos.chunk][pos.offset..pos.offset + 4]);
        }
    }

    #[test]
    fn test_same_seed_replays_same_windows() {
        let chunks = numbered_chunks(&[20, 31, 17, 8]);
        let mut a = Sampler::seeded(&chunks, 1234).unwrap();
        let mut b = Sampler::seeded(&chunks, 1234).unwrap();

        let run_a = a.sample_batch(50, 5).unwrap();
        let run_b = b.sample_batch(50, 5).unwrap();
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_chunk_exactly_window_length_is_sampleable() {
        // mean is 14, chunk 0 is exactly 4 tokens long
        let chunks = numbered_chunks(&[4, 20, 20]);
        let sampler = Sampler::seeded(&chunks, 0).unwrap();
        assert_eq!(sampler.accept(0, 4), Some(WindowPosition::new(0, 0)));

        let mut sampler = Sampler::seeded(&chunks, 0).unwrap();
        let hit = (0..5_000)
            .map(|_| sampler.sample_position(4).unwrap())
            .any(|p| p.chunk == 0);
        assert!(hit, "a chunk of exactly `length` tokens was never drawn");
    }

    #[test]
    fn test_max_start_accepted_when_it_fits() {
        // total 10, length 4: max start 5 lies at the head of chunk 1 (3..10)
        let chunks = numbered_chunks(&[3, 7]);
        let sampler = Sampler::seeded(&chunks, 0).unwrap();
        assert_eq!(sampler.accept(5, 4), Some(WindowPosition::new(1, 2)));
    }

    #[test]
    fn test_max_start_rejected_when_it_crosses() {
        // total 24, length 6: max start 17 lies in chunk 1 (10..20) and would end at 23
        let chunks = numbered_chunks(&[10, 10, 4]);
        let sampler = Sampler::seeded(&chunks, 0).unwrap();
        assert_eq!(sampler.accept(17, 6), None);
    }

    #[test]
    fn test_window_ending_on_boundary_is_accepted() {
        let chunks = numbered_chunks(&[10, 10, 10]);
        let sampler = Sampler::seeded(&chunks, 0).unwrap();

        assert_eq!(sampler.accept(1, 9), Some(WindowPosition::new(0, 1)));
        assert_eq!(sampler.accept(2, 9), None);
    }

    #[test]
    fn test_never_samples_from_empty_chunks() {
        let chunks = numbered_chunks(&[0, 8, 0, 0, 8, 0]);
        let mut sampler = Sampler::seeded(&chunks, 99).unwrap();

        for _ in 0..1_000 {
            let pos = sampler.sample_position(1).unwrap();
            assert!(pos.chunk == 1 || pos.chunk == 4, "drew from empty chunk {}", pos.chunk);
        }
    }

    #[test]
    fn test_distribution_is_uniform_over_valid_windows() {
        let lengths = [6, 0, 9, 3, 12];
        let length  = 3;
        let chunks  = numbered_chunks(&lengths);
        let mut sampler = Sampler::seeded(&chunks, 2024).unwrap();

        // Enumerate every start the sampler can draw and accept
        let max_start = sampler.total_size() - length - 1;
        let valid: Vec<WindowPosition> = (0..=max_start)
            .filter_map(|start| sampler.accept(start, length))
            .collect();
        assert_eq!(valid.len(), 21);

        let per_bin = 10_000usize;
        let draws   = valid.len() * per_bin;
        let mut counts: HashMap<WindowPosition, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(sampler.sample_position(length).unwrap()).or_insert(0) += 1;
        }

        // Nothing outside the valid set
        assert_eq!(counts.len(), valid.len());

        // Each bin within 5% of its expectation (~5 standard deviations)
        for pos in &valid {
            let seen = counts.get(pos).copied().unwrap_or(0);
            let diff = seen.abs_diff(per_bin);
            assert!(diff < per_bin / 20, "{pos:?}: {seen} draws, expected ~{per_bin}");
        }
    }

    #[test]
    fn test_sample_owned_is_a_copy() {
        let chunks = numbered_chunks(&[12, 12]);
        let mut sampler = Sampler::seeded(&chunks, 3).unwrap();

        let mut window = sampler.sample_owned(5).unwrap();
        let first      = window[0];
        window[0]      = u32::MAX;
        assert!(chunks.iter().all(|c| !c.contains(&u32::MAX)));
        assert!(chunks.iter().any(|c| c.contains(&first)));
    }

    #[test]
    fn test_accepts_borrowed_slices() {
        let a = [1u32, 2, 3, 4, 5, 6];
        let b = [7u32, 8, 9, 10, 11, 12];
        let chunks: [&[u32]; 2] = [&a, &b];
        let mut sampler = Sampler::seeded(&chunks, 5).unwrap();

        let window = sampler.sample(2).unwrap();
        assert_eq!(window.len(), 2);
    }
}
