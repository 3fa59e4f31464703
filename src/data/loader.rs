// ============================================================
// Layer 4: Dataset Loader
// ============================================================
// Reads every file a dataset path expands to and turns it into
// token chunks. The file extension decides how:
//
//   .npz   pre-encoded archive   → one chunk per array member
//   .npy   pre-encoded array     → one chunk
//   .csv   first column per row  → encoded, packed
//   other  plain text, per line  → encoded + <|endoftext|>, packed
//
// Pre-encoded arrays become chunks directly. Encoded text goes
// through the TokenPacker so many small files end up as a few
// chunks of at least `combine` tokens each.
//
// A tokenizer is only needed when text or CSV files are present,
// so a pure .npz corpus loads without one.

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use crate::data::{
    npy::{decode_npy, read_npz},
    packer::TokenPacker,
    paths::expand_paths,
    preprocessor::Preprocessor,
};
use crate::domain::chunk::TokenChunk;
use crate::domain::traits::{ChunkSource, TokenEncoder};

/// Default minimum tokens per packed text chunk.
pub const DEFAULT_COMBINE: usize = 50_000;

/// How a dataset file is read, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Npz,
    Npy,
    Csv,
    Text,
}

impl FileFormat {
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("npz") => FileFormat::Npz,
            Some("npy") => FileFormat::Npy,
            Some("csv") => FileFormat::Csv,
            _ => FileFormat::Text,
        }
    }
}

/// Loads a chunk collection from files on disk.
/// Implements the ChunkSource trait from Layer 3.
pub struct DatasetLoader<'e> {
    /// File, directory, or glob pattern
    path: String,
    /// Minimum tokens per packed text chunk
    combine: usize,
    /// Needed only for .csv and plain text files
    encoder: Option<&'e dyn TokenEncoder>,
    show_progress: bool,
}

impl<'e> DatasetLoader<'e> {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path:          path.into(),
            combine:       DEFAULT_COMBINE,
            encoder:       None,
            show_progress: false,
        }
    }

    pub fn with_combine(mut self, combine: usize) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_encoder(mut self, encoder: &'e dyn TokenEncoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Draw a progress bar over files on stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self, files: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(
            "Files {pos}/{len} [{elapsed_precise}] {bar:40.cyan/blue} {msg}",
        )
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        ProgressBar::new(files as u64).with_style(style)
    }

    fn encoder_for(&self, path: &Path) -> Result<&'e dyn TokenEncoder> {
        self.encoder.ok_or_else(|| {
            anyhow!(
                "'{}' needs to be tokenized but no tokenizer was provided",
                path.display()
            )
        })
    }

    /// Encode each line of a text file, followed by the end-of-text token.
    fn pack_text(&self, path: &Path, packer: &mut TokenPacker) -> Result<()> {
        let encoder = self.encoder_for(path)?;
        let bytes   = fs::read(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        let preprocessor = Preprocessor::new();
        let text         = preprocessor.decode(&bytes);

        for line in preprocessor.lines(&text) {
            let ids = encoder
                .encode(line)
                .with_context(|| format!("Cannot encode '{}'", path.display()))?;
            packer.extend(ids);
            packer.extend([encoder.end_of_text()]);
        }
        Ok(())
    }

    /// Encode the first column of each CSV row (header skipped),
    /// wrapped in start/end markers.
    fn pack_csv(&self, path: &Path, packer: &mut TokenPacker) -> Result<()> {
        let encoder = self.encoder_for(path)?;
        let bytes   = fs::read(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        let preprocessor = Preprocessor::new();
        let text         = preprocessor.decode(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        for (row, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Bad CSV row {} in '{}'", row + 1, path.display()))?;

            let Some(field) = record.get(0) else {
                tracing::debug!("Skipping empty CSV row {} in '{}'", row + 1, path.display());
                continue;
            };

            let ids = encoder
                .encode(&preprocessor.csv_record(field))
                .with_context(|| format!("Cannot encode '{}'", path.display()))?;
            packer.extend(ids);
        }
        Ok(())
    }
}

impl ChunkSource for DatasetLoader<'_> {
    fn load_chunks(&self) -> Result<Vec<TokenChunk>> {
        let paths = expand_paths(&self.path)?;
        tracing::info!("Loading {} dataset file(s) from '{}'", paths.len(), self.path);

        let progress   = self.progress_bar(paths.len());
        let mut packer = TokenPacker::new(self.combine);
        let mut chunks = Vec::new();

        for path in &paths {
            progress.set_message(path.display().to_string());

            match FileFormat::of(path) {
                FileFormat::Npz => {
                    let file = File::open(path)
                        .with_context(|| format!("Cannot open '{}'", path.display()))?;
                    let arrays = read_npz(BufReader::new(file))
                        .with_context(|| format!("Cannot decode '{}'", path.display()))?;
                    tracing::debug!("{}: {} array(s)", path.display(), arrays.len());
                    chunks.extend(arrays);
                }
                FileFormat::Npy => {
                    let bytes = fs::read(path)
                        .with_context(|| format!("Cannot read '{}'", path.display()))?;
                    let array = decode_npy(&bytes)
                        .with_context(|| format!("Cannot decode '{}'", path.display()))?;
                    tracing::debug!("{}: {} tokens", path.display(), array.len());
                    chunks.push(array);
                }
                format @ (FileFormat::Csv | FileFormat::Text) => {
                    if format == FileFormat::Csv {
                        self.pack_csv(path, &mut packer)?;
                    } else {
                        self.pack_text(path, &mut packer)?;
                    }

                    if let Some(chunk) = packer.flush_if_full() {
                        tracing::debug!("Packed a chunk of {} tokens", chunk.len());
                        chunks.push(chunk);
                    }
                }
            }

            progress.inc(1);
        }
        progress.finish_and_clear();

        if let Some(rest) = packer.finish() {
            tracing::debug!("Packed a final chunk of {} tokens", rest.len());
            chunks.push(rest);
        }

        let total: usize = chunks.iter().map(Vec::len).sum();
        tracing::info!("Loaded {} chunks ({} tokens)", chunks.len(), total);
        Ok(chunks)
    }
}
