// ============================================================
// Layer 2: Dataset Use Case
// ============================================================
// Shared first step of every command:
//
//   Step 1: Load the tokenizer, if one exists   (Layer 5 - infra)
//   Step 2: Load and pack the dataset files     (Layer 4 - data)
//
// The tokenizer is optional because a pre-encoded .npz/.npy
// corpus needs none. If text turns up without a tokenizer the
// loader fails and names the file.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::loader::{DatasetLoader, DEFAULT_COMBINE};
use crate::domain::chunk::{CorpusStats, TokenChunk};
use crate::domain::traits::{ChunkSource, TokenEncoder};
use crate::infra::tokenizer_store::{TokenizerEncoder, TokenizerStore};

// ─── Dataset Configuration ───────────────────────────────────────────────────
// Where the corpus lives and how text is packed.
// Serialisable so a run's dataset settings can be logged as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File, directory, or glob pattern
    pub dataset:   String,
    /// Path to a HuggingFace tokenizer.json
    pub tokenizer: String,
    /// Minimum tokens per packed text chunk
    pub combine:   usize,
    /// Show a progress bar while reading files
    pub progress:  bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset:   "data".to_string(),
            tokenizer: "tokenizer.json".to_string(),
            combine:   DEFAULT_COMBINE,
            progress:  false,
        }
    }
}

/// A loaded chunk collection plus the tokenizer used to build it.
pub struct LoadedCorpus {
    pub chunks:  Vec<TokenChunk>,
    pub encoder: Option<TokenizerEncoder>,
}

impl LoadedCorpus {
    pub fn stats(&self) -> CorpusStats {
        CorpusStats::from_chunks(&self.chunks)
    }
}

/// Load the tokenizer (if present) and every chunk of the dataset.
pub fn load_corpus(cfg: &DatasetConfig) -> Result<LoadedCorpus> {
    // ── Step 1: Tokenizer ─────────────────────────────────────────────────────
    let store   = TokenizerStore::new(&cfg.tokenizer);
    let encoder = if store.exists() {
        Some(store.load()?)
    } else {
        tracing::debug!(
            "No tokenizer at '{}', only pre-encoded files can be loaded",
            cfg.tokenizer
        );
        None
    };

    // ── Step 2: Chunks ────────────────────────────────────────────────────────
    let mut loader = DatasetLoader::new(&cfg.dataset)
        .with_combine(cfg.combine)
        .with_progress(cfg.progress);
    if let Some(enc) = &encoder {
        loader = loader.with_encoder(enc as &dyn TokenEncoder);
    }
    let chunks = loader.load_chunks()?;

    Ok(LoadedCorpus { chunks, encoder })
}

/// Load the dataset and summarise it.
pub fn corpus_stats(cfg: &DatasetConfig) -> Result<CorpusStats> {
    let stats = load_corpus(cfg)?.stats();
    tracing::info!(
        "{} chunks, {} tokens, mean chunk size {}",
        stats.num_chunks,
        stats.total_tokens,
        stats.mean_chunk_size
    );
    Ok(stats)
}
