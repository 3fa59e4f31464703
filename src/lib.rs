// ============================================================
// token-sampler
// ============================================================
// Loads tokenized corpora as collections of chunks and draws
// fixed-length windows from them. Every window lies inside one
// chunk, and every such window is equally likely.
//
// Layers, outermost first:
//   1. cli          argument parsing and printing
//   2. application  one use case per command
//   3. domain       plain types, errors and traits
//   4. data         ingestion, boundary index, sampler
//   5. infra        tokenizer and .npz persistence

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;

pub use data::boundary::BoundaryIndex;
pub use data::sampler::Sampler;
pub use domain::errors::SamplerError;
pub use domain::window::WindowPosition;
