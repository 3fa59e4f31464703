// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the system
// works with: token chunks, window positions, corpus stats,
// and the seams the ingestion layer plugs into.
//
// Rules for this layer:
//   - NO file I/O
//   - NO tokenizer or archive crates
//   - NO randomness
//
// Everything here can be unit tested with literal vectors.

// Token chunks and corpus-level statistics
pub mod chunk;

// Accepted window positions inside a chunk
pub mod window;

// Typed errors raised by the sampling core
pub mod errors;

// Core abstractions (traits) that other layers implement
pub mod traits;
