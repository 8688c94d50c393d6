use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the tagsweep encode/decode pipeline.
#[derive(Debug, Error)]
pub enum TagsweepError {
    /// A sentence and its tag list disagree on length before padding.
    #[error("token/tag count mismatch: {tokens} tokens but {tags} tags in {sentence:?}")]
    Misaligned {
        /// The offending sentence.
        sentence: String,
        /// Number of whitespace-delimited tokens.
        tokens: usize,
        /// Number of tags supplied.
        tags: usize,
    },

    /// A matrix was built with data that does not match its declared shape.
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// Number of values the shape requires.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// The encoding scheme is unusable (empty tag set, zero sizes, ...).
    #[error("invalid encoding scheme: {0}")]
    InvalidScheme(String),

    /// A model identifier does not follow the fixed-field format.
    #[error("unparseable model identifier: {0:?}")]
    InvalidModelId(String),

    /// A per-model stats file could not be parsed.
    #[error("unparseable stats record: {0:?}")]
    InvalidStats(String),

    /// The input record source could not be read.
    #[error("failed to read records from {path}: {source}")]
    RecordSource {
        /// Path of the record file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A record could not be deserialized.
    #[error("invalid record at {location}: {source}")]
    RecordFormat {
        /// File path plus line number when known.
        location: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Tensor conversion failed.
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for tagsweep core operations.
pub type Result<T> = std::result::Result<T, TagsweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = TagsweepError::Misaligned {
            sentence: "a b".into(),
            tokens: 2,
            tags: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 tokens"));
        assert!(msg.contains("1 tags"));
        assert!(msg.contains("a b"));

        let err = TagsweepError::InvalidModelId("model_x".into());
        assert!(err.to_string().contains("model_x"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TagsweepError>();
    }
}
