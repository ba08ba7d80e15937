//! Core error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors raised while assembling the quiz (corpus loading, settings).
///
/// Gameplay itself has no error channel; these only occur at startup.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A corpus must contain at least one word.
    #[error("Word corpus is empty")]
    EmptyCorpus,

    /// The corpus file could not be read.
    #[error("Failed to read word list {path}: {source}")]
    CorpusIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The corpus file is not a valid list of word records.
    #[error("Invalid word list {path}: {source}")]
    CorpusParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Timing settings failed validation.
    #[error("Invalid quiz settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}
