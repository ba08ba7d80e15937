//! Local adapters for the [`AudioSink`] trait.
//!
//! [`LocalAudioSink`] is a thin wrapper around [`AudioThreadHandle`] (rodio on
//! the default output device). [`NullAudioSink`] discards audio for machines
//! without one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::audio_io::{AudioSink, PlaybackDoneCallback};
use crate::audio_thread::AudioThreadHandle;
use crate::decode::SpeechAudio;
use crate::error::VoiceError;

// ── LocalAudioSink ─────────────────────────────────────────────────

/// Local audio output; delegates to rodio via [`AudioThreadHandle`].
pub struct LocalAudioSink {
    handle: AudioThreadHandle,
}

impl LocalAudioSink {
    /// Spawn the audio thread on the default output device.
    pub fn open() -> Result<Self, VoiceError> {
        Ok(Self {
            handle: AudioThreadHandle::spawn()?,
        })
    }
}

impl AudioSink for LocalAudioSink {
    fn play(
        &self,
        audio: Arc<SpeechAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        self.handle.play(audio, on_done)
    }

    fn stop(&self) {
        self.handle.stop();
    }
}

// ── NullAudioSink ──────────────────────────────────────────────────

/// Sink that accepts audio and plays nothing.
///
/// Completion is reported from a short-lived thread, never from inside
/// [`AudioSink::play`].
#[derive(Debug, Default)]
pub struct NullAudioSink {
    playing: Arc<AtomicBool>,
}

impl NullAudioSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for NullAudioSink {
    fn play(
        &self,
        audio: Arc<SpeechAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        tracing::trace!(
            samples = audio.samples.len(),
            "NullAudioSink: discarding audio"
        );
        self.playing.store(true, Ordering::SeqCst);
        let playing = Arc::clone(&self.playing);
        std::thread::spawn(move || {
            if playing.swap(false, Ordering::SeqCst) {
                on_done();
            }
        });
        Ok(())
    }

    fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }
}

// ── Constructor ────────────────────────────────────────────────────

/// Open the default output device, or fall back to a [`NullAudioSink`] with
/// a warning if none is usable.
pub fn open_default_sink() -> Arc<dyn AudioSink> {
    match LocalAudioSink::open() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "No usable audio output; continuing without sound");
            Arc::new(NullAudioSink::new())
        }
    }
}
