// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The sampler only needs "a collection of token chunks". Where
// those chunks come from, and which tokenizer turned text into
// IDs, are hidden behind these two traits so the data layer
// can be tested with an in-memory encoder and literal chunks.

use anyhow::Result;
use crate::domain::chunk::TokenChunk;

// ─── ChunkSource ──────────────────────────────────────────────────────────────
/// Any component that can produce a chunk collection.
///
/// Implementations:
///   - DatasetLoader → reads .npz / .npy / .csv / plain text from disk
///   - Vec<TokenChunk> → already materialised chunks (tests, reloads)
pub trait ChunkSource {
    /// Load every chunk this source provides, in a stable order.
    fn load_chunks(&self) -> Result<Vec<TokenChunk>>;
}

impl ChunkSource for Vec<TokenChunk> {
    fn load_chunks(&self) -> Result<Vec<TokenChunk>> {
        Ok(self.clone())
    }
}

// ─── TokenEncoder ─────────────────────────────────────────────────────────────
/// Turns text into token IDs.
///
/// Implementations:
///   - TokenizerEncoder → wraps a HuggingFace `tokenizers::Tokenizer`
pub trait TokenEncoder {
    /// Encode a piece of text without adding model-specific special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// The ID appended after every encoded line of plain text.
    fn end_of_text(&self) -> u32;
}
