use thiserror::Error;

pub type Result<T> = std::result::Result<T, SamplerError>;

/// Failures a caller of the sampling core can act on.
///
/// Broken internal invariants are not represented here; they panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// The requested window is not shorter than the mean chunk size.
    #[error(
        "dataset chunks are too small to sample {length} tokens at a time \
         (window must be shorter than the mean chunk size of {threshold})"
    )]
    InsufficientData { length: usize, threshold: usize },

    #[error("cannot build a sampler over an empty chunk collection")]
    EmptyCollection,
}
