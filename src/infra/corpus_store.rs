// ============================================================
// Layer 5: Corpus Store
// ============================================================
// Persists an encoded corpus so later runs skip tokenization.
//
// What gets written for an output path `out/corpus.npz`:
//   1. out/corpus.npz   the chunks, one `arr_{i}.npy` member each
//   2. out/corpus.json  a manifest describing how they were built
//
// The manifest is free-form serde data; the encode use case
// stores its settings and the resulting corpus stats in it.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::data::npy::{read_npz, write_npz};
use crate::domain::chunk::{CorpusStats, TokenChunk};

pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `corpus.npz` → `corpus.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }

    /// A store next to this one with `suffix` appended to the file stem,
    /// e.g. `corpus.npz` + `_val` → `corpus_val.npz`.
    pub fn sibling(&self, suffix: &str) -> Self {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(self.path.with_file_name(format!("{stem}{suffix}.npz")))
    }

    /// Write `chunks` as an `.npz`, creating parent directories as needed.
    pub fn save<C: AsRef<[u32]>>(&self, chunks: &[C]) -> Result<CorpusStats> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Cannot create '{}'", self.path.display()))?;
        let mut writer = write_npz(BufWriter::new(file), chunks)
            .with_context(|| format!("Cannot write '{}'", self.path.display()))?;
        writer.flush()?;

        let stats = CorpusStats::from_chunks(chunks);
        tracing::info!(
            "Saved {} chunks ({} tokens) to '{}'",
            stats.num_chunks,
            stats.total_tokens,
            self.path.display()
        );
        Ok(stats)
    }

    pub fn load(&self) -> Result<Vec<TokenChunk>> {
        let file = File::open(&self.path).with_context(|| {
            format!("Cannot open '{}'. Has it been encoded yet?", self.path.display())
        })?;
        read_npz(BufReader::new(file))
            .with_context(|| format!("Cannot read '{}'", self.path.display()))
    }

    pub fn save_manifest<T: Serialize>(&self, manifest: &T) -> Result<()> {
        let path = self.manifest_path();
        let json = serde_json::to_string_pretty(manifest)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write manifest to '{}'", path.display()))?;

        tracing::debug!("Saved manifest to '{}'", path.display());
        Ok(())
    }

    pub fn load_manifest<T: DeserializeOwned>(&self) -> Result<T> {
        let path = self.manifest_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read manifest from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}
