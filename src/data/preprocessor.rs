// ============================================================
// Layer 4: Text Preprocessor
// ============================================================
// Turns raw file bytes into the text pieces that get encoded.
//
// Corpus files scraped from the web are rarely clean UTF-8.
// Invalid byte sequences are dropped rather than replaced, so
// no U+FFFD replacement characters leak into the token stream.
//
// Line endings are normalised to `\n` (`\r\n` and lone `\r`
// alike), so CRLF and LF copies of a corpus encode identically.
//
// Plain text is encoded one line at a time, with each line
// keeping its trailing newline so line breaks survive encoding.
//
// CSV rows are wrapped in start/end markers so a model learns
// where each record begins and ends:
//
//   <|startoftext|>first column text<|endoftext|>\n

/// Marker placed before each CSV record.
pub const START_OF_TEXT: &str = "<|startoftext|>";

/// Marker placed after each CSV record, and the token appended
/// after every encoded line of plain text.
pub const END_OF_TEXT: &str = "<|endoftext|>";

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Decode bytes as UTF-8, silently dropping invalid sequences,
    /// with every line ending turned into `\n`.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut out  = String::with_capacity(bytes.len());
        let mut rest = bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to() bytes are known good, lossy never substitutes here
                    out.push_str(&String::from_utf8_lossy(valid));

                    // error_len() is None only for a truncated sequence at the end
                    match e.error_len() {
                        Some(bad) => rest = &after[bad..],
                        None => break,
                    }
                }
            }
        }

        normalize_newlines(out)
    }

    /// Split text into lines, each keeping its `\n` terminator.
    /// The last line has no terminator if the text doesn't end in one.
    pub fn lines<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        text.split_inclusive('\n')
    }

    /// Wrap one CSV record in start/end markers.
    pub fn csv_record(&self, text: &str) -> String {
        format!("{START_OF_TEXT}{text}{END_OF_TEXT}\n")
    }
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
