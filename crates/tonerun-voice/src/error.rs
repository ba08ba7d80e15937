//! Speech error types.

/// Errors that can occur while producing speech.
///
/// None of these reach the round controller: the
/// [`SpeechCoordinator`](crate::coordinator::SpeechCoordinator) logs them and
/// falls back to the system voice.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The speech backend could not be reached.
    #[error("Speech backend request failed: {0}")]
    BackendRequest(#[from] reqwest::Error),

    /// The speech backend answered with a non-success status.
    #[error("Speech backend returned HTTP {status}: {message}")]
    BackendStatus { status: u16, message: String },

    /// The speech backend answered, but without an audio payload.
    #[error("Speech backend response carried no audio")]
    MissingAudio,

    /// The speech backend is switched off (offline mode).
    #[error("Speech backend is disabled")]
    BackendDisabled,

    /// The audio payload could not be decoded into samples.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Failed to open the audio output stream or create a sink.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// The dedicated audio thread is gone.
    #[error("Audio thread died unexpectedly")]
    AudioThreadDied,

    /// The fallback speech command could not be started.
    #[error("Failed to start fallback voice '{program}': {source}")]
    FallbackSpawn {
        program: String,
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
