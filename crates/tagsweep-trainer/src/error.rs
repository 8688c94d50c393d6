use std::path::PathBuf;

use tagsweep_core::TagsweepError;
use thiserror::Error;

/// Errors raised while training, evaluating or ranking models.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Encoding, decoding or format error from the core pipeline.
    #[error(transparent)]
    Core(#[from] TagsweepError),

    /// Candle ML framework error.
    #[error("ML error: {0}")]
    Candle(#[from] candle_core::Error),

    /// A file or directory could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A JSON document could not be read or written.
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A persisted model does not match the requested configuration.
    #[error("persisted model {model} does not match: {reason}")]
    StaleModel { model: String, reason: String },

    /// No persisted model exists for the requested configuration.
    #[error("no persisted model {0}")]
    MissingModel(String),

    /// The model produced output of an unexpected shape.
    #[error("model output shape mismatch: {0}")]
    OutputShape(String),
}

impl TrainerError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TrainerError::Io { path, source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Self {
        let path = path.into();
        move |source| TrainerError::Json { path, source }
    }
}

/// Result type alias for trainer operations.
pub type Result<T> = std::result::Result<T, TrainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = TrainerError::io("models/x")(std::io::Error::other("boom"));
        let msg = err.to_string();
        assert!(msg.contains("models/x"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn core_errors_are_transparent() {
        let err: TrainerError = TagsweepError::InvalidStats("x".into()).into();
        assert_eq!(err.to_string(), TagsweepError::InvalidStats("x".into()).to_string());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrainerError>();
    }
}
