//! Dedicated audio output thread - keeps `!Send` audio resources off the
//! async runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Rather than using
//! `unsafe impl Send/Sync`, it is confined to a single OS thread and driven
//! through an [`AudioCommand`] channel. [`AudioThreadHandle`] is the
//! `Send + Sync` proxy the rest of the crate holds.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::audio_io::PlaybackDoneCallback;
use crate::decode::SpeechAudio;
use crate::error::VoiceError;
use crate::playback::AudioPlayback;

// ── Commands ───────────────────────────────────────────────────────

/// A command sent to the audio thread.
enum AudioCommand {
    /// Replace the current playback with `audio`.
    Play {
        audio: Arc<SpeechAudio>,
        on_done: PlaybackDoneCallback,
        reply: mpsc::Sender<Result<(), VoiceError>>,
    },

    /// Stop any active playback (fire-and-forget).
    Stop,

    /// Shut down the audio thread, releasing the output stream.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio thread.
///
/// `play` blocks the caller until the audio thread responds, which takes
/// microseconds: the thread only hands samples to rodio.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the output device, and return the handle.
    ///
    /// Errors from [`AudioPlayback::new`] come back through a one-shot init
    /// channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("tonerun-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Start playing `audio`, replacing any current playback.
    pub fn play(
        &self,
        audio: Arc<SpeechAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        self.send_and_recv(|reply| AudioCommand::Play {
            audio,
            on_done,
            reply,
        })
    }

    /// Stop any active playback immediately.
    pub fn stop(&self) {
        let _ = self.send(AudioCommand::Stop);
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn send(&self, cmd: AudioCommand) -> Result<(), VoiceError> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| VoiceError::AudioThreadDied)
    }

    /// Send a command that expects a `Result<T, VoiceError>` reply and block
    /// until the audio thread responds. Channel failures map to
    /// [`VoiceError::AudioThreadDied`].
    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<Result<T, VoiceError>>) -> AudioCommand,
    ) -> Result<T, VoiceError> {
        let (tx, rx) = mpsc::channel();
        self.send(build(tx))?;
        rx.recv().map_err(|_| VoiceError::AudioThreadDied)?
    }

    // ── Audio thread event loop ────────────────────────────────────

    /// Body of the audio thread. Owns [`AudioPlayback`] for its entire
    /// lifetime.
    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let mut playback = match AudioPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play {
                    audio,
                    on_done,
                    reply,
                } => {
                    let _ = reply.send(playback.play(&audio, on_done));
                }

                AudioCommand::Stop => playback.stop(),

                AudioCommand::Shutdown => break,
            }
        }

        playback.stop();
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        // Best-effort shutdown; the thread may already be dead.
        let _ = self.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
