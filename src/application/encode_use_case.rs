// ============================================================
// Layer 2: Encode Use Case
// ============================================================
// Tokenizes and packs a corpus once, then saves it as .npz so
// sampling runs can skip the tokenizer entirely:
//
//   Step 1: Load and pack the corpus           (dataset_use_case)
//   Step 2: Hold back validation chunks        (Layer 4 - data)
//   Step 3: Write train (and val) archives     (Layer 5 - infra)
//   Step 4: Write the manifest                 (Layer 5 - infra)

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::dataset_use_case::{load_corpus, DatasetConfig};
use crate::data::splitter::split_train_val;
use crate::domain::chunk::CorpusStats;
use crate::infra::corpus_store::CorpusStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeConfig {
    pub dataset:      DatasetConfig,
    /// Output archive; validation chunks go to `<stem>_val.npz`
    pub output:       String,
    /// Share of chunks held back for validation, 0 disables the split
    pub val_fraction: f64,
    /// Seed for the train/validation shuffle
    pub seed:         u64,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            dataset:      DatasetConfig::default(),
            output:       "corpus.npz".to_string(),
            val_fraction: 0.0,
            seed:         42,
        }
    }
}

/// What was written, saved alongside the archive as its manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeReport {
    pub train_path: PathBuf,
    pub train:      CorpusStats,
    pub val_path:   Option<PathBuf>,
    pub val:        Option<CorpusStats>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    config: &'a EncodeConfig,
    report: &'a EncodeReport,
}

pub struct EncodeUseCase {
    config: EncodeConfig,
}

impl EncodeUseCase {
    pub fn new(config: EncodeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EncodeReport> {
        let cfg = &self.config;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        let corpus = load_corpus(&cfg.dataset)?;
        tracing::info!("Packed {} chunks", corpus.chunks.len());

        // ── Step 2: Split ─────────────────────────────────────────────────────
        let (train, val) = if cfg.val_fraction > 0.0 {
            let mut rng = StdRng::seed_from_u64(cfg.seed);
            let (train, val) = split_train_val(corpus.chunks, 1.0 - cfg.val_fraction, &mut rng);
            (train, Some(val))
        } else {
            (corpus.chunks, None)
        };

        if train.is_empty() {
            tracing::warn!("No training chunks left to write");
        }

        // ── Step 3: Archives ──────────────────────────────────────────────────
        let store       = CorpusStore::new(&cfg.output);
        let train_stats = store.save(&train)?;

        let (val_path, val_stats) = match &val {
            Some(val) => {
                let val_store = store.sibling("_val");
                let stats     = val_store.save(val)?;
                (Some(val_store.path().to_path_buf()), Some(stats))
            }
            None => (None, None),
        };

        let report = EncodeReport {
            train_path: store.path().to_path_buf(),
            train:      train_stats,
            val_path,
            val:        val_stats,
        };

        // ── Step 4: Manifest ──────────────────────────────────────────────────
        store.save_manifest(&Manifest { config: cfg, report: &report })?;

        Ok(report)
    }
}
