// ============================================================
// Layer 2: Sample Use Case
// ============================================================
// Draws fixed-length token windows from a corpus:
//
//   Step 1: Load the corpus                    (dataset_use_case)
//   Step 2: Build the sampler, seeded or not   (Layer 4 - data)
//   Step 3: Draw `count` windows as one batch  (Layer 4 - data)
//   Step 4: Optionally decode them to text     (Layer 5 - infra)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::application::dataset_use_case::{load_corpus, DatasetConfig};
use crate::data::batcher::WindowBatcher;
use crate::data::sampler::Sampler;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    pub dataset: DatasetConfig,
    /// Tokens per window
    pub length:  usize,
    /// Number of windows to draw
    pub count:   usize,
    /// Fixed seed for a reproducible draw; entropy when absent
    pub seed:    Option<u64>,
    /// Decode windows back to text (needs a tokenizer)
    pub decode:  bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            length:  1024,
            count:   1,
            seed:    None,
            decode:  false,
        }
    }
}

/// One drawn window and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledWindow {
    pub chunk:  usize,
    pub offset: usize,
    pub tokens: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text:   Option<String>,
}

pub struct SampleUseCase {
    config: SampleConfig,
}

impl SampleUseCase {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Vec<SampledWindow>> {
        let cfg = &self.config;

        // ── Step 1: Load corpus ───────────────────────────────────────────────
        let corpus = load_corpus(&cfg.dataset)?;
        if cfg.decode && corpus.encoder.is_none() {
            bail!(
                "Decoding needs a tokenizer, none found at '{}'",
                cfg.dataset.tokenizer
            );
        }

        // ── Step 2: Sampler ───────────────────────────────────────────────────
        let mut sampler = match cfg.seed {
            Some(seed) => Sampler::seeded(&corpus.chunks, seed)?,
            None       => Sampler::from_entropy(&corpus.chunks)?,
        };
        tracing::info!(
            "Sampling {} window(s) of {} tokens from {} chunks ({} tokens, max window {:?})",
            cfg.count,
            cfg.length,
            sampler.num_chunks(),
            sampler.total_size(),
            sampler.max_window(),
        );

        // ── Step 3: Draw ──────────────────────────────────────────────────────
        let batch = WindowBatcher::new(cfg.count, cfg.length).next_batch(&mut sampler)?;

        // ── Step 4: Decode ────────────────────────────────────────────────────
        let mut windows = Vec::with_capacity(batch.batch_size);
        for (row, pos) in batch.rows().zip(&batch.positions) {
            let text = match (&corpus.encoder, cfg.decode) {
                (Some(enc), true) => Some(enc.decode(row)?),
                _                 => None,
            };
            windows.push(SampledWindow {
                chunk:  pos.chunk,
                offset: pos.offset,
                tokens: row.to_vec(),
                text,
            });
        }

        Ok(windows)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::npy::write_npz;
    use crate::domain::errors::SamplerError;
    use crate::infra::tokenizer_store::write_word_level_tokenizer;
    use std::fs::{self, File};
    use tempfile::{tempdir, TempDir};

    fn npz_dataset(chunks: &[Vec<u32>]) -> (TempDir, DatasetConfig) {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("corpus.npz");
        write_npz(File::create(&path).unwrap(), chunks).unwrap();

        let cfg = DatasetConfig {
            dataset:   path.to_str().unwrap().to_string(),
            tokenizer: dir.path().join("none.json").to_str().unwrap().to_string(),
            ..DatasetConfig::default()
        };
        (dir, cfg)
    }

    #[test]
    fn test_windows_come_from_their_chunk() {
        let chunks: Vec<Vec<u32>> = vec![(0..50).collect(), (1000..1080).collect()];
        let (_dir, dataset) = npz_dataset(&chunks);

        let windows = SampleUseCase::new(SampleConfig {
            dataset,
            length: 12,
            count:  20,
            seed:   Some(5),
            decode: false,
        })
        .execute()
        .unwrap();

        assert_eq!(windows.len(), 20);
        for w in &windows {
            assert_eq!(w.tokens, chunks[w.chunk][w.offset..w.offset + 12]);
            assert!(w.text.is_none());
        }
    }

    #[test]
    fn test_same_seed_same_windows() {
        let chunks: Vec<Vec<u32>> = vec![(0..64).collect(); 3];
        let (_dir, dataset) = npz_dataset(&chunks);
        let cfg = SampleConfig { dataset, length: 8, count: 5, seed: Some(42), decode: false };

        let a = SampleUseCase::new(cfg.clone()).execute().unwrap();
        let b = SampleUseCase::new(cfg).execute().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_long_window_is_reported() {
        let chunks: Vec<Vec<u32>> = vec![vec![7; 10]; 3];
        let (_dir, dataset) = npz_dataset(&chunks);
        let cfg = SampleConfig { dataset, length: 10, count: 1, seed: Some(1), decode: false };

        let err = SampleUseCase::new(cfg).execute().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SamplerError>(),
            Some(&SamplerError::InsufficientData { length: 10, threshold: 10 })
        );
    }

    #[test]
    fn test_decode_without_tokenizer_fails() {
        let chunks: Vec<Vec<u32>> = vec![vec![1; 30]];
        let (_dir, dataset) = npz_dataset(&chunks);
        let cfg = SampleConfig { dataset, length: 4, count: 1, seed: Some(1), decode: true };

        assert!(SampleUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_decode_with_tokenizer() {
        let dir       = tempdir().unwrap();
        let tokenizer = write_word_level_tokenizer(dir.path(), &["spam"]);
        let data      = dir.path().join("spam.txt");
        fs::write(&data, "spam spam spam spam\n").unwrap();

        let cfg = SampleConfig {
            dataset: DatasetConfig {
                dataset:   data.to_str().unwrap().to_string(),
                tokenizer: tokenizer.to_str().unwrap().to_string(),
                combine:   1,
                progress:  false,
            },
            length: 3,
            count:  2,
            seed:   Some(3),
            decode: true,
        };
        let windows = SampleUseCase::new(cfg).execute().unwrap();

        // chunk is [spam x4, eot]; a 3-token window starts at 0 or 1
        for w in &windows {
            let text = w.text.as_deref().unwrap();
            assert!(text.contains("spam"), "unexpected decode {text:?}");
        }
    }
}
