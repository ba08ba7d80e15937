//! Keyboard input: key-to-command mapping and the blocking reader thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use tonerun_core::{RoundCommand, ToneCategory};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Map a key press to a quiz command.
///
/// `1`-`5` pick Mid, Low, Falling, High, Rising; `r`/space replays; `n`/Enter
/// moves on after a miss; `q`/Esc/Ctrl-C quits.
pub fn command_for_key(key: &KeyEvent) -> Option<RoundCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(RoundCommand::Quit)
        }
        KeyCode::Char(c @ '1'..='5') => c
            .to_digit(10)
            .and_then(|d| ToneCategory::from_key(d as usize))
            .map(RoundCommand::SelectTone),
        KeyCode::Char('r' | 'R' | ' ') => Some(RoundCommand::Replay),
        KeyCode::Char('n' | 'N') | KeyCode::Enter => Some(RoundCommand::Advance),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(RoundCommand::Quit),
        _ => None,
    }
}

/// Background thread forwarding key presses as [`RoundCommand`]s.
///
/// Stops after forwarding `Quit`, when the receiver goes away, or when
/// dropped.
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn(commands: mpsc::UnboundedSender<RoundCommand>) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("tonerun-keys".into())
            .spawn(move || read_keys(&commands, &flag))?;
        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }
}

fn read_keys(commands: &mpsc::UnboundedSender<RoundCommand>, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Keyboard polling failed");
                let _ = commands.send(RoundCommand::Quit);
                return;
            }
        }

        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        let Some(command) = command_for_key(&key) else {
            continue;
        };

        let quit = matches!(command, RoundCommand::Quit);
        if commands.send(command).is_err() || quit {
            return;
        }
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
