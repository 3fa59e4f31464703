// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from files on disk to sampled training windows.
//
//   dataset path (file / dir / glob)
//       │
//       ▼
//   expand_paths      → sorted list of files
//       │
//       ▼
//   DatasetLoader     → .npz/.npy arrays become chunks directly,
//       │               text/CSV is decoded, encoded, and
//       │               packed by TokenPacker
//       ▼
//   Vec<TokenChunk>   → the chunk collection
//       │
//       ▼
//   BoundaryIndex     → cumulative offsets for O(log n) lookup
//       │
//       ▼
//   Sampler           → fair fixed-length windows
//       │
//       ▼
//   WindowBatcher     → [batch_size, seq_len] token batches

/// Cumulative chunk offsets and offset → chunk lookup
pub mod boundary;

/// Fair rejection sampler over a chunk collection
pub mod sampler;

/// Stacks sampled windows into fixed-shape batches
pub mod batcher;

/// Shuffles chunks and holds some back for validation
pub mod splitter;

/// Expands a file, directory, or glob into dataset files
pub mod paths;

/// Reads dataset files into chunks by extension
pub mod loader;

/// .npy / .npz token array codec
pub mod npy;

/// Buffers encoded text until it is large enough to be a chunk
pub mod packer;

/// Byte decoding and line splitting before encoding
pub mod preprocessor;
