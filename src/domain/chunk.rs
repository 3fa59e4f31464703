// ============================================================
// Layer 3: Token Chunk Domain Type
// ============================================================
// A chunk is one contiguous run of token IDs produced by the
// ingestion layer: a packed slab of encoded text, or one array
// out of a pre-encoded .npy/.npz file.
//
// The sampler never looks inside a chunk except to slice it,
// so chunk contents are opaque here.

use serde::{Deserialize, Serialize};

/// One immutable run of token IDs.
pub type TokenChunk = Vec<u32>;

/// Summary numbers for a chunk collection.
///
/// `max_window` is the largest window length the sampler will accept
/// for this collection, or `None` if no length passes the mean-size guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub num_chunks:      usize,
    pub total_tokens:    usize,
    pub mean_chunk_size: usize,
    pub largest_chunk:   usize,
    pub empty_chunks:    usize,
    pub max_window:      Option<usize>,
}

impl CorpusStats {
    /// Compute stats for any collection of token buffers.
    pub fn from_chunks<C: AsRef<[u32]>>(chunks: &[C]) -> Self {
        let num_chunks   = chunks.len();
        let total_tokens = chunks.iter().map(|c| c.as_ref().len()).sum::<usize>();

        let mean_chunk_size = if num_chunks == 0 { 0 } else { total_tokens / num_chunks };

        Self {
            num_chunks,
            total_tokens,
            mean_chunk_size,
            largest_chunk: chunks.iter().map(|c| c.as_ref().len()).max().unwrap_or(0),
            empty_chunks:  chunks.iter().filter(|c| c.as_ref().is_empty()).count(),
            max_window:    mean_chunk_size.checked_sub(1),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_for_equal_chunks() {
        let chunks: Vec<TokenChunk> = vec![vec![0; 10], vec![1; 10], vec![2; 10]];
        let stats = CorpusStats::from_chunks(&chunks);

        assert_eq!(stats.num_chunks, 3);
        assert_eq!(stats.total_tokens, 30);
        assert_eq!(stats.mean_chunk_size, 10);
        // 10 is not < 10, so the largest accepted window is 9
        assert_eq!(stats.max_window, Some(9));
    }

    #[test]
    fn test_stats_count_empty_chunks() {
        let chunks: Vec<TokenChunk> = vec![vec![], vec![7; 5], vec![]];
        let stats = CorpusStats::from_chunks(&chunks);

        assert_eq!(stats.empty_chunks, 2);
        assert_eq!(stats.largest_chunk, 5);
        assert_eq!(stats.mean_chunk_size, 1);
        assert_eq!(stats.max_window, Some(0));
    }

    #[test]
    fn test_stats_for_empty_collection() {
        let chunks: Vec<TokenChunk> = Vec::new();
        let stats = CorpusStats::from_chunks(&chunks);

        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.max_window, None);
    }
}
