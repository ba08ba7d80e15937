//! Speech port - how the round controller asks for a word to be spoken.
//!
//! The controller only ever needs two things from the audio side: "say this
//! now, dropping whatever you were saying" and "be quiet". Both are
//! fire-and-forget; every failure is handled behind the port.

/// Capability to speak a word aloud.
///
/// Implementations must make `speak` and `stop` take effect synchronously:
/// once `stop()` returns, no audio belonging to an earlier request may start.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechPort: Send + Sync {
    /// Speak `text`, superseding any earlier request.
    fn speak(&self, text: &str);

    /// Silence playback and invalidate the current request. Idempotent.
    fn stop(&self);
}

/// No-op speech port for headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

impl SpeechPort for SilentSpeech {
    fn speak(&self, text: &str) {
        tracing::trace!(text, "SilentSpeech: dropping speak request");
    }

    fn stop(&self) {}
}
