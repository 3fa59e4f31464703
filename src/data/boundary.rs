// ============================================================
// Layer 4: Boundary Index
// ============================================================
// Maps a global token offset in the virtual concatenation of
// all chunks back to the chunk that holds it.
//
// The table has one entry per chunk plus a leading zero:
//
//   chunk lengths:  [ 4,  0,  3 ]
//   boundaries:     [ 0,  4,  4,  7 ]
//
// Chunk i covers the half-open range boundaries[i]..boundaries[i+1].
// Empty chunks produce repeated boundary values and cover nothing.

/// Cumulative chunk boundaries with O(log n) offset lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryIndex {
    /// Always `num_chunks + 1` entries, starting at 0
    boundaries: Vec<usize>,
}

impl BoundaryIndex {
    /// Build the table from a chunk collection.
    pub fn new<C: AsRef<[u32]>>(chunks: &[C]) -> Self {
        Self::from_lengths(chunks.iter().map(|c| c.as_ref().len()))
    }

    /// Build the table from chunk lengths alone.
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let lengths    = lengths.into_iter();
        let mut bounds = Vec::with_capacity(lengths.size_hint().0 + 1);
        let mut total  = 0usize;

        bounds.push(total);
        for len in lengths {
            total += len;
            bounds.push(total);
        }

        Self { boundaries: bounds }
    }

    /// The full cumulative table (`num_chunks + 1` entries).
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn num_chunks(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Sum of all chunk lengths.
    pub fn total_size(&self) -> usize {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Global offset of the first token of chunk `i`.
    pub fn chunk_start(&self, i: usize) -> usize {
        self.boundaries[i]
    }

    /// Global offset one past the last token of chunk `i`.
    pub fn chunk_end(&self, i: usize) -> usize {
        self.boundaries[i + 1]
    }

    /// Index of the chunk containing global `offset`.
    ///
    /// Finds the first boundary strictly greater than `offset` and
    /// steps back one. That skips any run of empty chunks, so the
    /// returned chunk always has `chunk_start(i) <= offset < chunk_end(i)`.
    ///
    /// # Panics
    /// Panics if `offset >= total_size()`; callers must only pass
    /// offsets that lie inside the concatenation.
    pub fn locate(&self, offset: usize) -> usize {
        assert!(
            offset < self.total_size(),
            "offset {} is outside the indexed range 0..{}",
            offset,
            self.total_size()
        );

        // boundaries[0] == 0 <= offset, and the last boundary > offset,
        // so the partition point lies in 1..=num_chunks.
        let first_greater = self.boundaries.partition_point(|&b| b <= offset);
        first_greater - 1
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let idx = BoundaryIndex::from_lengths([4, 0, 3]);
        assert_eq!(idx.boundaries(), &[0, 4, 4, 7]);
        assert_eq!(idx.num_chunks(), 3);
        assert_eq!(idx.total_size(), 7);
    }

    #[test]
    fn test_table_matches_chunk_lengths() {
        let chunks: Vec<Vec<u32>> = vec![vec![1; 5], vec![], vec![2; 2], vec![3; 9]];
        let idx = BoundaryIndex::new(&chunks);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(idx.chunk_end(i) - idx.chunk_start(i), chunk.len());
        }
        assert_eq!(idx.total_size(), 16);
    }

    #[test]
    fn test_locate_every_offset() {
        let idx = BoundaryIndex::from_lengths([3, 1, 5, 2]);

        for offset in 0..idx.total_size() {
            let i = idx.locate(offset);
            assert!(idx.chunk_start(i) <= offset, "offset {offset} before chunk {i}");
            assert!(offset < idx.chunk_end(i), "offset {offset} after chunk {i}");
        }
    }

    #[test]
    fn test_locate_skips_empty_chunks() {
        // Chunks 0, 2, 3 and 5 are empty
        let idx = BoundaryIndex::from_lengths([0, 2, 0, 0, 3, 0]);

        assert_eq!(idx.locate(0), 1);
        assert_eq!(idx.locate(1), 1);
        assert_eq!(idx.locate(2), 4);
        assert_eq!(idx.locate(4), 4);
    }

    #[test]
    fn test_locate_first_and_last_offset() {
        let idx = BoundaryIndex::from_lengths([10, 10, 10]);
        assert_eq!(idx.locate(0), 0);
        assert_eq!(idx.locate(9), 0);
        assert_eq!(idx.locate(10), 1);
        assert_eq!(idx.locate(29), 2);
    }

    #[test]
    #[should_panic(expected = "outside the indexed range")]
    fn test_locate_past_end_panics() {
        let idx = BoundaryIndex::from_lengths([2, 2]);
        let _ = idx.locate(4);
    }

    #[test]
    #[should_panic]
    fn test_locate_on_empty_table_panics() {
        let idx = BoundaryIndex::from_lengths(Vec::new());
        let _ = idx.locate(0);
    }
}
