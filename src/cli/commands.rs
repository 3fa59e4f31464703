// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the three subcommands `stats`, `sample` and `encode`
// and all their configurable flags.
//
// Every command reads a dataset the same way, so those flags
// live in one `DatasetArgs` flattened into each command.

use clap::{Args, Subcommand};

use crate::application::{
    dataset_use_case::DatasetConfig,
    encode_use_case::EncodeConfig,
    sample_use_case::SampleConfig,
};
use crate::data::loader::DEFAULT_COMBINE;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarise a corpus: chunk count, token count, largest window
    Stats(StatsArgs),

    /// Draw random token windows that never cross a chunk boundary
    Sample(SampleArgs),

    /// Tokenize and pack a corpus into an .npz archive
    Encode(EncodeArgs),
}

/// Where the corpus is and how to read it.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// File, directory, or glob pattern (.npz, .npy, .csv or text)
    #[arg(long)]
    pub dataset: String,

    /// HuggingFace tokenizer.json, needed only for text and CSV files
    #[arg(long, default_value = "tokenizer.json")]
    pub tokenizer: String,

    /// Minimum number of text tokens packed into one chunk
    #[arg(long, default_value_t = DEFAULT_COMBINE)]
    pub combine: usize,

    /// Hide the per-file progress bar
    #[arg(long)]
    pub quiet: bool,
}

impl From<DatasetArgs> for DatasetConfig {
    fn from(a: DatasetArgs) -> Self {
        DatasetConfig {
            dataset:   a.dataset,
            tokenizer: a.tokenizer,
            combine:   a.combine,
            progress:  !a.quiet,
        }
    }
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Print the stats as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Tokens per window
    #[arg(long)]
    pub length: usize,

    /// Number of windows to draw
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Seed for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print decoded text instead of token IDs
    #[arg(long)]
    pub decode: bool,

    /// Print each window as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl From<SampleArgs> for SampleConfig {
    fn from(a: SampleArgs) -> Self {
        SampleConfig {
            dataset: a.dataset.into(),
            length:  a.length,
            count:   a.count,
            seed:    a.seed,
            decode:  a.decode,
        }
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output .npz path
    #[arg(long)]
    pub output: String,

    /// Share of chunks written to <stem>_val.npz instead
    #[arg(long, default_value_t = 0.0)]
    pub val_fraction: f64,

    /// Seed for the train/validation shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<EncodeArgs> for EncodeConfig {
    fn from(a: EncodeArgs) -> Self {
        EncodeConfig {
            dataset:      a.dataset.into(),
            output:       a.output,
            val_fraction: a.val_fraction,
            seed:         a.seed,
        }
    }
}
