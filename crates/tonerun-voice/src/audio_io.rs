//! `AudioSink` trait abstraction for speech output.
//!
//! Decouples the [`SpeechCoordinator`](crate::coordinator::SpeechCoordinator)
//! from the output device:
//!
//! | Implementor | Where used |
//! |---|---|
//! | [`LocalAudioSink`](crate::audio_local::LocalAudioSink) | rodio playback on the local machine |
//! | [`NullAudioSink`](crate::audio_local::NullAudioSink) | no output device; audio is discarded |
//!
//! The trait is **object-safe** (`Arc<dyn AudioSink>`). All methods take
//! `&self`; implementations use channels or atomics for state changes.

use std::sync::Arc;

use crate::decode::SpeechAudio;
use crate::error::VoiceError;

/// Callback invoked when playback finishes naturally.
pub type PlaybackDoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// Abstraction over an audio output sink.
pub trait AudioSink: Send + Sync {
    /// Start playing `audio`, replacing anything already playing.
    ///
    /// `on_done` fires once if the audio drains on its own, never if it is
    /// stopped. It must not be invoked from inside `play` itself: callers may
    /// hold a lock that the callback also takes.
    fn play(&self, audio: Arc<SpeechAudio>, on_done: PlaybackDoneCallback)
    -> Result<(), VoiceError>;

    /// Stop playback immediately. Idempotent.
    fn stop(&self);
}
