// ============================================================
// Layer 4: Token Packer
// ============================================================
// Accumulates encoded text across files and cuts it into chunks.
//
// Small text files make poor chunks: the sampler refuses any
// window that is not shorter than the MEAN chunk size, so a
// corpus of many tiny files would only allow tiny windows.
// The packer keeps appending tokens until at least `combine`
// are buffered, then emits them all as a single chunk.
//
// Example with combine=5:
//   file a.txt → 3 tokens   buffer: 3          (keep going)
//   file b.txt → 4 tokens   buffer: 7  → emit chunk of 7
//   file c.txt → 2 tokens   buffer: 2
//   end of corpus           → emit remainder chunk of 2
//
// The full check only happens between files, so a chunk may
// be larger than `combine` but is never split mid-file.

use crate::domain::chunk::TokenChunk;

pub struct TokenPacker {
    /// Minimum number of buffered tokens before a chunk is emitted
    combine: usize,
    /// Tokens waiting to be emitted
    tokens: Vec<u32>,
}

impl TokenPacker {
    pub fn new(combine: usize) -> Self {
        Self { combine, tokens: Vec::new() }
    }

    /// Append encoded tokens to the buffer.
    pub fn extend<I: IntoIterator<Item = u32>>(&mut self, tokens: I) {
        self.tokens.extend(tokens);
    }

    /// Number of tokens currently buffered
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Emit the buffer as a chunk once it holds at least `combine` tokens.
    pub fn flush_if_full(&mut self) -> Option<TokenChunk> {
        if self.tokens.is_empty() || self.tokens.len() < self.combine {
            return None;
        }
        Some(std::mem::take(&mut self.tokens))
    }

    /// Emit whatever is left at the end of the corpus.
    pub fn finish(self) -> Option<TokenChunk> {
        if self.tokens.is_empty() {
            None
        } else {
            Some(self.tokens)
        }
    }
}
