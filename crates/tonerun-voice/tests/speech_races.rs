//! Request-race tests for `SpeechCoordinator`.
//!
//! A gated fake backend lets each test decide when (and how) every backend
//! call resolves, and a shared event log records what the sink and the
//! fallback voice were asked to do, in order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::oneshot;

use tonerun_core::SpeechPort;
use tonerun_voice::{
    AudioFormat, AudioSink, EncodedAudio, FallbackVoice, PlaybackDoneCallback, SpeechAudio,
    SpeechBackend, SpeechCoordinator, SpeechOutcome, VoiceError,
};

// ── Fakes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    SinkStop,
    SinkPlay(usize),
    FallbackCancel,
    FallbackSpeak(String, String),
}

type Log = Arc<Mutex<Vec<Event>>>;

type Reply = Result<EncodedAudio, VoiceError>;

fn pcm(samples: usize) -> EncodedAudio {
    EncodedAudio {
        data: STANDARD.encode(vec![0u8; samples * 2]),
        format: AudioFormat::SPEECH,
    }
}

/// Backend whose calls block on a per-text gate; ungated texts succeed at
/// once with 100 samples.
#[derive(Default)]
struct GatedBackend {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl GatedBackend {
    fn gate(&self, text: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(text.to_string(), rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechBackend for GatedBackend {
    async fn generate(&self, text: &str) -> Result<EncodedAudio, VoiceError> {
        self.calls.lock().unwrap().push(text.to_string());
        let gate = self.gates.lock().unwrap().remove(text);
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(VoiceError::MissingAudio)),
            None => Ok(pcm(100)),
        }
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

/// Sink that logs plays and keeps completion callbacks for the test to fire.
struct RecordingSink {
    log: Log,
    refuse: bool,
    callbacks: Mutex<Vec<PlaybackDoneCallback>>,
}

impl RecordingSink {
    fn new(log: &Log) -> Self {
        Self {
            log: Arc::clone(log),
            refuse: false,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    fn refusing(log: &Log) -> Self {
        Self {
            refuse: true,
            ..Self::new(log)
        }
    }

    fn take_callback(&self, index: usize) -> PlaybackDoneCallback {
        self.callbacks.lock().unwrap().remove(index)
    }
}

impl AudioSink for RecordingSink {
    fn play(
        &self,
        audio: Arc<SpeechAudio>,
        on_done: PlaybackDoneCallback,
    ) -> Result<(), VoiceError> {
        if self.refuse {
            return Err(VoiceError::OutputStreamError("device busy".into()));
        }
        self.log
            .lock()
            .unwrap()
            .push(Event::SinkPlay(audio.samples.len()));
        self.callbacks.lock().unwrap().push(on_done);
        Ok(())
    }

    fn stop(&self) {
        self.log.lock().unwrap().push(Event::SinkStop);
    }
}

struct RecordingFallback {
    log: Log,
}

impl FallbackVoice for RecordingFallback {
    fn speak(&self, text: &str, language: &str) -> Result<(), VoiceError> {
        self.log
            .lock()
            .unwrap()
            .push(Event::FallbackSpeak(text.into(), language.into()));
        Ok(())
    }

    fn cancel(&self) {
        self.log.lock().unwrap().push(Event::FallbackCancel);
    }
}

struct Harness {
    coordinator: SpeechCoordinator,
    backend: Arc<GatedBackend>,
    sink: Arc<RecordingSink>,
    log: Log,
}

impl Harness {
    fn with_sink(make_sink: impl FnOnce(&Log) -> RecordingSink) -> Self {
        let log: Log = Arc::default();
        let backend = Arc::new(GatedBackend::default());
        let sink = Arc::new(make_sink(&log));
        let fallback = Arc::new(RecordingFallback {
            log: Arc::clone(&log),
        });
        let coordinator = SpeechCoordinator::new(
            Arc::clone(&backend) as Arc<dyn SpeechBackend>,
            fallback,
            Arc::clone(&sink) as Arc<dyn AudioSink>,
            tokio::runtime::Handle::current(),
        );
        Self {
            coordinator,
            backend,
            sink,
            log,
        }
    }

    fn new() -> Self {
        Self::with_sink(RecordingSink::new)
    }

    fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    /// Output events only: what was actually heard or attempted.
    fn outputs(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::SinkPlay(_) | Event::FallbackSpeak(..)))
            .collect()
    }
}

fn fallback(text: &str) -> Event {
    Event::FallbackSpeak(text.into(), "th-TH".into())
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn superseded_request_never_plays() {
    let h = Harness::new();
    let release_a = h.backend.gate("A");
    let release_b = h.backend.gate("B");

    let a = h.coordinator.speak_tracked("A");
    let b = h.coordinator.speak_tracked("B");

    release_b.send(Ok(pcm(7))).unwrap();
    assert_eq!(b.wait().await, SpeechOutcome::Played { cached: false });

    // A resolves late with good audio: discarded, not cached.
    release_a.send(Ok(pcm(3))).unwrap();
    assert_eq!(a.wait().await, SpeechOutcome::Superseded);

    assert_eq!(h.outputs(), vec![Event::SinkPlay(7)]);
    assert!(!h.coordinator.is_cached("A"));
    assert!(h.coordinator.is_cached("B"));
}

#[tokio::test]
async fn superseded_failure_never_falls_back() {
    let h = Harness::new();
    let release_a = h.backend.gate("A");
    let release_b = h.backend.gate("B");

    let a = h.coordinator.speak_tracked("A");
    let b = h.coordinator.speak_tracked("B");

    release_a.send(Err(VoiceError::MissingAudio)).unwrap();
    assert_eq!(a.wait().await, SpeechOutcome::Superseded);
    assert!(h.outputs().is_empty());

    release_b.send(Ok(pcm(5))).unwrap();
    assert_eq!(b.wait().await, SpeechOutcome::Played { cached: false });
    assert_eq!(h.outputs(), vec![Event::SinkPlay(5)]);
}

#[tokio::test]
async fn current_failure_uses_fallback_voice() {
    let h = Harness::new();
    let release = h.backend.gate("ไก่");

    let task = h.coordinator.speak_tracked("ไก่");
    release.send(Err(VoiceError::BackendDisabled)).unwrap();

    assert_eq!(task.wait().await, SpeechOutcome::FellBack);
    assert_eq!(h.outputs(), vec![fallback("ไก่")]);
    assert!(!h.coordinator.is_cached("ไก่"));
}

#[tokio::test]
async fn undecodable_payload_uses_fallback_voice() {
    let h = Harness::new();
    let release = h.backend.gate("A");

    let task = h.coordinator.speak_tracked("A");
    release
        .send(Ok(EncodedAudio {
            data: "%%%".into(),
            format: AudioFormat::SPEECH,
        }))
        .unwrap();

    assert_eq!(task.wait().await, SpeechOutcome::FellBack);
    assert_eq!(h.outputs(), vec![fallback("A")]);
    assert!(!h.coordinator.is_cached("A"));
}

#[tokio::test]
async fn refused_playback_uses_fallback_voice() {
    let h = Harness::with_sink(RecordingSink::refusing);

    let task = h.coordinator.speak_tracked("A");
    assert_eq!(task.wait().await, SpeechOutcome::FellBack);
    assert_eq!(h.outputs(), vec![fallback("A")]);
    assert!(!h.coordinator.is_playing());
}

#[tokio::test]
async fn cached_text_skips_backend() {
    let h = Harness::new();

    let first = h.coordinator.speak_tracked("A");
    assert_eq!(first.wait().await, SpeechOutcome::Played { cached: false });

    let second = h.coordinator.speak_tracked("A");
    assert_eq!(second.wait().await, SpeechOutcome::Played { cached: true });

    assert_eq!(h.backend.calls(), vec!["A"]);
    assert_eq!(h.outputs(), vec![Event::SinkPlay(100), Event::SinkPlay(100)]);
}

#[tokio::test]
async fn stop_suppresses_in_flight_result() {
    let h = Harness::new();
    let release = h.backend.gate("A");

    let task = h.coordinator.speak_tracked("A");
    h.coordinator.stop();
    assert_eq!(h.coordinator.current_text(), None);

    release.send(Ok(pcm(10))).unwrap();
    assert_eq!(task.wait().await, SpeechOutcome::Superseded);
    assert!(h.outputs().is_empty());
    assert!(!h.coordinator.is_cached("A"));
}

#[tokio::test]
async fn every_request_halts_previous_output_first() {
    let h = Harness::new();

    h.coordinator.speak_tracked("A").wait().await;
    let events = h.events();
    assert_eq!(
        events,
        vec![Event::SinkStop, Event::FallbackCancel, Event::SinkPlay(100)]
    );

    h.coordinator.stop();
    h.coordinator.stop();
    let events = h.events();
    assert_eq!(
        &events[3..],
        &[
            Event::SinkStop,
            Event::FallbackCancel,
            Event::SinkStop,
            Event::FallbackCancel
        ]
    );
}

#[tokio::test]
async fn stale_completion_keeps_newer_playback() {
    let h = Harness::new();

    h.coordinator.speak_tracked("A").wait().await;
    h.coordinator.speak_tracked("B").wait().await;
    assert!(h.coordinator.is_playing());

    // A's playback was interrupted; its late callback must not clear B.
    let stale = h.sink.take_callback(0);
    stale();
    assert!(h.coordinator.is_playing());

    let current = h.sink.take_callback(0);
    current();
    assert!(!h.coordinator.is_playing());
}

#[tokio::test]
async fn speech_port_speak_is_fire_and_forget() {
    let h = Harness::new();
    let port: &dyn SpeechPort = &h.coordinator;

    port.speak("A");
    assert_eq!(h.coordinator.current_text().as_deref(), Some("A"));

    for _ in 0..100 {
        if h.coordinator.is_cached("A") {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(h.coordinator.is_cached("A"));
    assert_eq!(h.outputs(), vec![Event::SinkPlay(100)]);
}

#[tokio::test]
async fn custom_language_reaches_fallback() {
    let log: Log = Arc::default();
    let coordinator = SpeechCoordinator::new(
        Arc::new(tonerun_voice::DisabledBackend),
        Arc::new(RecordingFallback {
            log: Arc::clone(&log),
        }),
        Arc::new(RecordingSink::new(&log)),
        tokio::runtime::Handle::current(),
    )
    .with_language("lo-LA");

    assert_eq!(
        coordinator.speak_tracked("ສະບາຍດີ").wait().await,
        SpeechOutcome::FellBack
    );
    assert!(
        log.lock()
            .unwrap()
            .contains(&Event::FallbackSpeak("ສະບາຍດີ".into(), "lo-LA".into()))
    );
}
