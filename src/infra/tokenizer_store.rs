// ============================================================
// Layer 5: Tokenizer Store
// ============================================================
// Loads a HuggingFace `tokenizer.json` and adapts it to the
// TokenEncoder trait the data layer encodes text through.
//
// The end-of-text token is looked up once at load time. A
// tokenizer without `<|endoftext|>` in its vocabulary cannot
// delimit lines, so loading fails instead of silently packing
// documents together with no separator.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::data::preprocessor::END_OF_TEXT;
use crate::domain::traits::TokenEncoder;

pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the tokenizer JSON and resolve its end-of-text token
    pub fn load(&self) -> Result<TokenizerEncoder> {
        let tokenizer = Tokenizer::from_file(&self.path).map_err(|e| {
            anyhow!("Cannot load tokenizer from '{}': {}", self.path.display(), e)
        })?;

        let encoder = TokenizerEncoder::new(tokenizer)?;
        tracing::info!(
            "Loaded tokenizer '{}' ({} tokens, {}={})",
            self.path.display(),
            encoder.vocab_size(),
            END_OF_TEXT,
            encoder.end_of_text(),
        );
        Ok(encoder)
    }
}

/// A `tokenizers::Tokenizer` with its end-of-text ID resolved.
pub struct TokenizerEncoder {
    tokenizer:   Tokenizer,
    end_of_text: u32,
}

impl TokenizerEncoder {
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        let end_of_text = tokenizer
            .token_to_id(END_OF_TEXT)
            .ok_or_else(|| anyhow!("Tokenizer has no '{}' token", END_OF_TEXT))?;

        Ok(Self { tokenizer, end_of_text })
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Turn token IDs back into text, special tokens included.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, false)
            .map_err(|e| anyhow!("Decoding error: {e}"))
    }
}

impl TokenEncoder for TokenizerEncoder {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;
        Ok(enc.get_ids().to_vec())
    }

    fn end_of_text(&self) -> u32 {
        self.end_of_text
    }
}

/// Write a whitespace word-level tokenizer JSON for tests.
///
/// IDs: [UNK]=0, <|endoftext|>=1, <|startoftext|>=2, then `words` in order.
#[cfg(test)]
pub(crate) fn write_word_level_tokenizer(dir: &Path, words: &[&str]) -> PathBuf {
    use crate::data::preprocessor::START_OF_TEXT;

    let special = ["[UNK]", END_OF_TEXT, START_OF_TEXT];

    let mut vocab = serde_json::Map::new();
    for (id, token) in special.iter().chain(words).enumerate() {
        vocab.insert(token.to_string(), serde_json::json!(id));
    }

    let added: Vec<_> = special
        .iter()
        .enumerate()
        .map(|(id, token)| {
            serde_json::json!({
                "id": id, "content": token, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            })
        })
        .collect();

    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": added,
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    let path = dir.join("tokenizer.json");
    std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json).unwrap()).unwrap();
    path
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_resolves_end_of_text() {
        let dir  = tempdir().unwrap();
        let path = write_word_level_tokenizer(dir.path(), &["hello", "world"]);

        let encoder = TokenizerStore::new(path).load().unwrap();
        assert_eq!(encoder.end_of_text(), 1);
    }

    #[test]
    fn test_encode_words() {
        let dir     = tempdir().unwrap();
        let path    = write_word_level_tokenizer(dir.path(), &["hello", "world"]);
        let encoder = TokenizerStore::new(path).load().unwrap();

        assert_eq!(encoder.encode("hello world\n").unwrap(), vec![3, 4]);
        // Unknown words map to [UNK]
        assert_eq!(encoder.encode("hello moon").unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_special_markers_are_single_tokens() {
        let dir     = tempdir().unwrap();
        let path    = write_word_level_tokenizer(dir.path(), &["joke"]);
        let encoder = TokenizerStore::new(path).load().unwrap();

        let ids = encoder.encode("<|startoftext|>joke<|endoftext|>").unwrap();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir   = tempdir().unwrap();
        let store = TokenizerStore::new(dir.path().join("nope.json"));
        assert_eq!(store.path(), dir.path().join("nope.json"));
        assert!(!store.exists());
        assert!(store.load().is_err());
    }
}
