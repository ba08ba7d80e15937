//! Speech coordinator - cached remote speech with a fallback voice.
//!
//! Every `speak` call becomes the single *current* request and silences
//! whatever came before it. A backend call that returns after its request
//! was superseded (by a later `speak` or by `stop`) is dropped on the floor:
//! no playback, no fallback, no cache write. Backend calls themselves are
//! never aborted.
//!
//! ```text
//!  speak(text) ──► halt previous ──► cache hit? ──yes──► play
//!                                        │no
//!                                        ▼
//!                               spawn backend call
//!                                        │
//!                     still current? ──no──► Superseded
//!                                        │yes
//!                               decode + cache ──err──► fallback voice
//!                                        │
//!                                        ▼
//!                                      play ──err──► fallback voice
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use tonerun_core::SpeechPort;

use crate::audio_io::AudioSink;
use crate::backend::SpeechBackend;
use crate::decode::{SpeechAudio, decode_pcm16_base64};
use crate::error::VoiceError;
use crate::fallback::FallbackVoice;

/// Language tag handed to the fallback voice.
pub const DEFAULT_LANGUAGE: &str = "th-TH";

/// How a single `speak` request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Playback started; `cached` if no backend call was needed.
    Played { cached: bool },
    /// The fallback voice was asked to speak.
    FellBack,
    /// A later request (or `stop`) took over first. Nothing was output.
    Superseded,
}

/// Completion handle for a request issued with
/// [`SpeechCoordinator::speak_tracked`].
#[derive(Debug)]
pub struct SpeechTask {
    rx: oneshot::Receiver<SpeechOutcome>,
}

impl SpeechTask {
    fn resolved(outcome: SpeechOutcome) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self { rx }
    }

    /// Wait for the request to resolve.
    ///
    /// A request whose backend task was torn down with the runtime counts
    /// as superseded.
    pub async fn wait(self) -> SpeechOutcome {
        self.rx.await.unwrap_or(SpeechOutcome::Superseded)
    }
}

#[derive(Debug)]
struct Request {
    id: u64,
    text: String,
}

struct CoordinatorState {
    cache: HashMap<String, Arc<SpeechAudio>>,
    current: Option<Request>,
    /// Request id whose audio the sink is playing.
    playing: Option<u64>,
    next_id: u64,
    language: String,
}

impl CoordinatorState {
    fn is_current(&self, id: u64) -> bool {
        self.current.as_ref().is_some_and(|r| r.id == id)
    }
}

struct Inner {
    state: Mutex<CoordinatorState>,
    backend: Arc<dyn SpeechBackend>,
    fallback: Arc<dyn FallbackVoice>,
    sink: Arc<dyn AudioSink>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Silence the sink and the fallback voice.
    fn halt(&self, state: &mut CoordinatorState) {
        self.sink.stop();
        self.fallback.cancel();
        state.playing = None;
    }

    /// Start playback of `audio` for request `id`. Caller holds the lock and
    /// has checked that `id` is current.
    fn play_locked(
        self: &Arc<Self>,
        state: &mut CoordinatorState,
        id: u64,
        text: &str,
        audio: Arc<SpeechAudio>,
        cached: bool,
    ) -> SpeechOutcome {
        let weak: Weak<Self> = Arc::downgrade(self);
        let on_done = Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.playback_finished(id);
            }
        });

        match self.sink.play(audio, on_done) {
            Ok(()) => {
                state.playing = Some(id);
                tracing::debug!(id, text, cached, "Speech playback started");
                SpeechOutcome::Played { cached }
            }
            Err(e) => {
                self.fall_back(state, text, &e);
                SpeechOutcome::FellBack
            }
        }
    }

    fn fall_back(&self, state: &CoordinatorState, text: &str, cause: &VoiceError) {
        tracing::warn!(error = %cause, text, "Speech unavailable; using fallback voice");
        if let Err(e) = self.fallback.speak(text, &state.language) {
            tracing::warn!(error = %e, "Fallback voice failed");
        }
    }

    fn playback_finished(&self, id: u64) {
        let mut state = self.lock();
        if state.playing == Some(id) {
            state.playing = None;
            tracing::trace!(id, "Speech playback finished");
        }
    }

    async fn fetch_and_play(self: Arc<Self>, id: u64, text: String) -> SpeechOutcome {
        let result = self.backend.generate(&text).await;

        if !self.lock().is_current(id) {
            tracing::debug!(id, text, "Discarding superseded speech result");
            return SpeechOutcome::Superseded;
        }

        let decoded = result.and_then(|encoded| decode_pcm16_base64(&encoded.data, encoded.format));

        let mut state = self.lock();
        if !state.is_current(id) {
            tracing::debug!(id, text, "Discarding superseded speech result");
            return SpeechOutcome::Superseded;
        }

        match decoded {
            Ok(audio) => {
                let audio = Arc::new(audio);
                state.cache.insert(text.clone(), Arc::clone(&audio));
                self.play_locked(&mut state, id, &text, audio, false)
            }
            Err(e) => {
                self.fall_back(&state, &text, &e);
                SpeechOutcome::FellBack
            }
        }
    }
}

/// Produces speech for quiz words; the audio side of the round controller.
///
/// Created once at startup and shared as `Arc<dyn SpeechPort>`.
pub struct SpeechCoordinator {
    inner: Arc<Inner>,
    runtime: Handle,
}

impl SpeechCoordinator {
    /// Build a coordinator. Backend calls are spawned on `runtime`.
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        fallback: Arc<dyn FallbackVoice>,
        sink: Arc<dyn AudioSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState {
                    cache: HashMap::new(),
                    current: None,
                    playing: None,
                    next_id: 0,
                    language: DEFAULT_LANGUAGE.to_string(),
                }),
                backend,
                fallback,
                sink,
            }),
            runtime,
        }
    }

    /// Set the language tag passed to the fallback voice.
    #[must_use]
    pub fn with_language(self, language: impl Into<String>) -> Self {
        self.inner.lock().language = language.into();
        self
    }

    /// Speak `text`, superseding any earlier request, and return a handle
    /// reporting how the request ended.
    pub fn speak_tracked(&self, text: &str) -> SpeechTask {
        let mut state = self.inner.lock();
        self.inner.halt(&mut state);

        state.next_id += 1;
        let id = state.next_id;
        state.current = Some(Request {
            id,
            text: text.to_string(),
        });

        if let Some(audio) = state.cache.get(text).cloned() {
            let outcome = self.inner.play_locked(&mut state, id, text, audio, true);
            return SpeechTask::resolved(outcome);
        }
        drop(state);

        tracing::debug!(id, text, backend = self.inner.backend.name(), "Requesting speech");
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        self.runtime.spawn(async move {
            let outcome = inner.fetch_and_play(id, text).await;
            let _ = tx.send(outcome);
        });
        SpeechTask { rx }
    }

    /// Whether speech audio for `text` is cached.
    pub fn is_cached(&self, text: &str) -> bool {
        self.inner.lock().cache.contains_key(text)
    }

    /// Whether the coordinator believes its audio is still playing.
    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing.is_some()
    }

    /// Text of the current request, if any.
    pub fn current_text(&self) -> Option<String> {
        self.inner.lock().current.as_ref().map(|r| r.text.clone())
    }
}

impl SpeechPort for SpeechCoordinator {
    fn speak(&self, text: &str) {
        drop(self.speak_tracked(text));
    }

    fn stop(&self) {
        let mut state = self.inner.lock();
        self.inner.halt(&mut state);
        if let Some(request) = state.current.take() {
            tracing::debug!(id = request.id, text = %request.text, "Speech request cancelled");
        }
    }
}

impl Drop for SpeechCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SpeechCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SpeechCoordinator")
            .field("backend", &self.inner.backend.name())
            .field("cached", &state.cache.len())
            .field("current", &state.current)
            .field("playing", &state.playing)
            .finish_non_exhaustive()
    }
}
