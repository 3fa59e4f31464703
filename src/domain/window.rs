// ============================================================
// Layer 3: Window Position
// ============================================================
// Where an accepted window starts: which chunk, and how far
// into that chunk. The sampler reports this alongside (or
// instead of) the tokens so callers can audit fairness.

use serde::{Deserialize, Serialize};

/// The start of an accepted window inside one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowPosition {
    /// Index of the chunk the window lies in
    pub chunk: usize,

    /// Offset of the first window token inside that chunk
    pub offset: usize,
}

impl WindowPosition {
    pub fn new(chunk: usize, offset: usize) -> Self {
        Self { chunk, offset }
    }

    /// Exclusive in-chunk end of a window of `length` tokens.
    pub fn end(&self, length: usize) -> usize {
        self.offset + length
    }
}
