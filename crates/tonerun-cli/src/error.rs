//! CLI-specific error types and exit codes.

use thiserror::Error;
use tonerun_core::{CoreError, SettingsError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Round timing rejected at startup.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The word list is empty or malformed.
    #[error("Word list error: {0}")]
    WordList(String),

    /// File could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The speech client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raw mode or screen setup failed.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl CliError {
    /// Map error to a sysexits-style exit code.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::WordList(_) => 65,  // EX_DATAERR
            Self::Io(_) => 74,        // EX_IOERR
            Self::Terminal(_) => 71,  // EX_OSERR
            Self::Config(_) => 78,    // EX_CONFIG
        }
    }

    /// Exit code for any error reaching `main`.
    pub fn exit_code_for(err: &anyhow::Error) -> i32 {
        err.downcast_ref::<Self>().map_or(1, Self::exit_code)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CorpusIo { .. } => Self::Io(err.to_string()),
            CoreError::EmptyCorpus | CoreError::CorpusParse { .. } => {
                Self::WordList(err.to_string())
            }
            CoreError::InvalidSettings(e) => Self::from(e),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Terminal(err.to_string())
    }
}
