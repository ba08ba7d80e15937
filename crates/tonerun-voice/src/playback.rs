//! Audio playback via `rodio`.
//!
//! One sink per playback. Starting a new playback stops the previous one, and
//! each playback carries its own stop flag so a watcher that wakes late can
//! never report completion for audio that was interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::audio_io::PlaybackDoneCallback;
use crate::decode::SpeechAudio;
use crate::error::VoiceError;

struct ActivePlayback {
    sink: Arc<Sink>,
    stopped: Arc<AtomicBool>,
}

/// Playback on the default output device.
///
/// `OutputStream` is `!Send` on some platforms, so this type lives on the
/// audio thread (see [`AudioThreadHandle`](crate::audio_thread::AudioThreadHandle)).
pub struct AudioPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    stream_handle: OutputStreamHandle,

    active: Option<ActivePlayback>,
}

impl AudioPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self, VoiceError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            active: None,
        })
    }

    /// Play `audio`, replacing whatever was playing.
    ///
    /// `on_done` fires from a watcher thread when the audio drains on its
    /// own; it is dropped unfired if the playback is stopped first.
    pub fn play(
        &mut self,
        audio: &SpeechAudio,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        self.stop();

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| VoiceError::OutputStreamError(e.to_string()))?;
        sink.append(rodio::buffer::SamplesBuffer::new(
            audio.channels,
            audio.sample_rate,
            audio.samples.clone(),
        ));

        let active = ActivePlayback {
            sink: Arc::new(sink),
            stopped: Arc::new(AtomicBool::new(false)),
        };
        Self::spawn_completion_watcher(&active, on_done);
        self.active = Some(active);

        tracing::debug!(
            sample_rate = audio.sample_rate,
            duration_ms = audio.duration.as_millis(),
            "Audio playback started"
        );
        Ok(())
    }

    /// Block a helper thread until the sink drains or is stopped.
    ///
    /// `Sink` is `Send` in rodio 0.20+. `sleep_until_end()` also returns
    /// when `stop()` is called, so the stop flag decides which case it was.
    fn spawn_completion_watcher(active: &ActivePlayback, on_done: PlaybackDoneCallback) {
        let sink = Arc::clone(&active.sink);
        let stopped = Arc::clone(&active.stopped);

        std::thread::spawn(move || {
            sink.sleep_until_end();

            if stopped.swap(true, Ordering::SeqCst) {
                return;
            }

            tracing::debug!("Playback finished naturally");
            on_done();
        });
    }

    /// Stop any active playback immediately. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.stopped.store(true, Ordering::SeqCst);
            active.sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }
}
