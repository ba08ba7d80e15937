//! Speech backend trait - remote text-to-speech behind an async interface.
//!
//! The [`SpeechCoordinator`](crate::coordinator::SpeechCoordinator) holds an
//! `Arc<dyn SpeechBackend>` so the remote service can be swapped for the
//! [`DisabledBackend`] (offline mode) or a fake in tests.
//!
//! | Backend              | Module     |
//! |----------------------|------------|
//! | [`GeminiBackend`]    | [`gemini`] |
//! | [`DisabledBackend`]  | here       |

pub mod gemini;

pub use gemini::{GeminiBackend, GeminiConfig};

use crate::decode::AudioFormat;
use crate::error::VoiceError;

/// Encoded audio returned by a backend, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    /// Base64 text of raw 16-bit little-endian PCM.
    pub data: String,

    /// Sample layout of `data`.
    pub format: AudioFormat,
}

/// Backend-agnostic text-to-speech service.
///
/// `generate` is async because backends are remote. Implementations must not
/// retry internally for long: a superseded request keeps running to
/// completion and its result is discarded.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Produce encoded audio for `text`.
    async fn generate(&self, text: &str) -> Result<EncodedAudio, VoiceError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Backend that always fails, sending every request to the fallback voice.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledBackend;

#[async_trait::async_trait]
impl SpeechBackend for DisabledBackend {
    async fn generate(&self, _text: &str) -> Result<EncodedAudio, VoiceError> {
        Err(VoiceError::BackendDisabled)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
