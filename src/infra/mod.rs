// ============================================================
// Layer 5: Infrastructure Layer
// ============================================================
// Adapters around external libraries and the filesystem.
//
//   tokenizer_store.rs  loads a HuggingFace tokenizer.json and
//                       exposes it as a TokenEncoder, with the
//                       <|endoftext|> ID resolved up front
//   corpus_store.rs     writes/reads an encoded corpus as .npz
//                       plus a JSON manifest next to it
//
// The data layer never imports `tokenizers` directly; swapping
// tokenizer libraries only touches this layer.

/// Tokenizer loading and the TokenEncoder adapter
pub mod tokenizer_store;

/// Encoded corpus persistence
pub mod corpus_store;
