//! Speech for the tone quiz.
//!
//! The [`SpeechCoordinator`] implements [`tonerun_core::SpeechPort`]: it asks
//! a remote [`SpeechBackend`] for audio, caches decoded audio by text, plays
//! it through an [`AudioSink`], and falls back to a [`FallbackVoice`] when
//! anything on that path fails. Only the most recent request may ever be
//! heard.

#![deny(unused_crate_dependencies)]

pub mod audio_io;
pub mod audio_local;
pub mod audio_thread;
pub mod backend;
pub mod coordinator;
pub mod decode;
pub mod error;
pub mod fallback;
pub mod playback;

// Re-export key types for convenience
pub use audio_io::{AudioSink, PlaybackDoneCallback};
pub use audio_local::{LocalAudioSink, NullAudioSink, open_default_sink};
pub use backend::{DisabledBackend, EncodedAudio, GeminiBackend, GeminiConfig, SpeechBackend};
pub use coordinator::{DEFAULT_LANGUAGE, SpeechCoordinator, SpeechOutcome, SpeechTask};
pub use decode::{AudioFormat, SpeechAudio, decode_pcm16_base64};
pub use error::VoiceError;
pub use fallback::{FallbackVoice, SystemVoice};
