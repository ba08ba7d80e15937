//! Fallback voice - the platform speech command, used when the backend fails.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::error::VoiceError;

/// Last-resort synthesizer.
///
/// There is no completion signal: `speak` returns once synthesis has been
/// started.
pub trait FallbackVoice: Send + Sync {
    /// Start speaking `text` in the BCP 47 `language`, cancelling any
    /// earlier utterance.
    fn speak(&self, text: &str, language: &str) -> Result<(), VoiceError>;

    /// Stop the utterance in progress, if any. Idempotent.
    fn cancel(&self);
}

/// Fallback voice that runs a speech command as a child process.
///
/// `espeak-ng` by default, `say` on macOS. Cancelling kills the child; a
/// child that exits on its own is reaped by a watcher thread.
#[derive(Debug)]
pub struct SystemVoice {
    program: String,
    child: Arc<Mutex<Option<Child>>>,
}

impl SystemVoice {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: Arc::new(Mutex::new(None)),
        }
    }

    /// The speech command shipped with the current platform.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("say")
        } else {
            Self::new("espeak-ng")
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn take_child(&self) -> Option<Child> {
        self.child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Arguments selecting a voice for `language`, by command flavor.
fn voice_args(program: &str, language: &str) -> Vec<String> {
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if primary.is_empty() {
        return Vec::new();
    }

    let name = Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);

    match name {
        // `say` picks voices by name; Kanya is the stock Thai voice.
        "say" => match primary.as_str() {
            "th" => vec!["-v".into(), "Kanya".into()],
            _ => Vec::new(),
        },
        _ => vec!["-v".into(), primary],
    }
}

const REAP_INTERVAL: Duration = Duration::from_millis(50);

/// Poll until the utterance with process id `pid` exits, then clear the slot.
/// Gives up once the slot holds a different child (or none).
fn watch_exit(slot: &Mutex<Option<Child>>, pid: u32) {
    loop {
        thread::sleep(REAP_INTERVAL);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(child) = guard.as_mut().filter(|c| c.id() == pid) else {
            return;
        };
        match child.try_wait() {
            Ok(None) => {}
            Ok(Some(status)) => {
                tracing::trace!(pid, %status, "Fallback voice finished");
                *guard = None;
                return;
            }
            Err(e) => {
                tracing::debug!(pid, error = %e, "Lost track of fallback voice");
                return;
            }
        }
    }
}

fn reap(mut child: Child) {
    if matches!(child.try_wait(), Ok(None)) {
        let _ = child.kill();
    }
    let _ = child.wait();
}

impl FallbackVoice for SystemVoice {
    fn speak(&self, text: &str, language: &str) -> Result<(), VoiceError> {
        self.cancel();

        let child = Command::new(&self.program)
            .args(voice_args(&self.program, language))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| VoiceError::FallbackSpawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(program = %self.program, text, language, "Fallback voice started");
        let pid = child.id();
        *self.child.lock().unwrap_or_else(PoisonError::into_inner) = Some(child);

        let slot = Arc::clone(&self.child);
        if let Err(e) = thread::Builder::new()
            .name("tonerun-fallback-reaper".into())
            .spawn(move || watch_exit(&slot, pid))
        {
            tracing::debug!(error = %e, "Fallback reaper not started; reaping on next cancel");
        }
        Ok(())
    }

    fn cancel(&self) {
        if let Some(child) = self.take_child() {
            reap(child);
        }
    }
}

impl Drop for SystemVoice {
    fn drop(&mut self) {
        self.cancel();
    }
}
