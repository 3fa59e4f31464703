// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction, parsed by `clap`.
// All work is delegated to Layer 2 (application); this layer
// only routes and prints.
//
// Three commands are supported:
//   1. `stats`  summarises a corpus
//   2. `sample` draws token windows from it
//   3. `encode` packs it into an .npz for fast reloading

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EncodeArgs, SampleArgs, StatsArgs};

use crate::application::sample_use_case::SampledWindow;

#[derive(Parser, Debug)]
#[command(
    name = "token-sampler",
    version,
    about = "Sample fixed-length token windows that never cross chunk boundaries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Stats(args)  => run_stats(args),
            Commands::Sample(args) => run_sample(args),
            Commands::Encode(args) => run_encode(args),
        }
    }
}

fn run_stats(args: StatsArgs) -> Result<()> {
    use crate::application::dataset_use_case::corpus_stats;

    let json  = args.json;
    let stats = corpus_stats(&args.dataset.into())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("chunks:          {}", stats.num_chunks);
    println!("total tokens:    {}", stats.total_tokens);
    println!("mean chunk size: {}", stats.mean_chunk_size);
    println!("largest chunk:   {}", stats.largest_chunk);
    println!("empty chunks:    {}", stats.empty_chunks);
    match stats.max_window {
        Some(max) => println!("max window:      {max}"),
        None      => println!("max window:      none (corpus too small)"),
    }
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    use crate::application::sample_use_case::SampleUseCase;

    let json    = args.json;
    let windows = SampleUseCase::new(args.into()).execute()?;

    for window in &windows {
        println!("{}", format_window(window, json)?);
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    use crate::application::encode_use_case::EncodeUseCase;

    let report = EncodeUseCase::new(args.into()).execute()?;

    println!(
        "Wrote {} chunks ({} tokens) to {}",
        report.train.num_chunks,
        report.train.total_tokens,
        report.train_path.display()
    );
    if let (Some(path), Some(val)) = (&report.val_path, &report.val) {
        println!(
            "Wrote {} validation chunks ({} tokens) to {}",
            val.num_chunks,
            val.total_tokens,
            path.display()
        );
    }
    Ok(())
}

/// One output line per window: JSON, decoded text, or space-separated IDs.
fn format_window(window: &SampledWindow, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(window)?);
    }
    if let Some(text) = &window.text {
        return Ok(format!("# chunk {} offset {}\n{}", window.chunk, window.offset, text));
    }

    let ids: Vec<String> = window.tokens.iter().map(|t| t.to_string()).collect();
    Ok(ids.join(" "))
}
