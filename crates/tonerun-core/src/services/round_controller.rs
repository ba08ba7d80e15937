//! Round controller - the quiz state machine.
//!
//! ```text
//!   start ─▶ Playing ──correct──▶ Correct ──(auto, 1.2 s)──▶ Playing (streak kept)
//!               │  └──wrong────▶ Wrong    ──(advance)─────▶ Playing (streak = 0)
//!               └────timeout───▶ TimedOut ──(advance)─────▶ Playing (streak = 0)
//! ```
//!
//! The controller is a single-writer actor: every mutation happens inside
//! one of its `&mut self` handlers. Timers are spawned tasks that only post
//! [`TimerFired`] messages back; each message carries the round it was
//! scheduled for, and messages for any other round are dropped. At most one
//! countdown and one auto-advance task exist at a time, and both are aborted
//! before a new round is set up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::{RoundPhase, RoundSnapshot, ToneCategory, Word};
use crate::error::CoreError;
use crate::ports::{SpeechPort, WordSource};
use crate::settings::QuizSettings;

// ── Commands & events ──────────────────────────────────────────────

/// Player actions forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Answer the current word with a tone.
    SelectTone(ToneCategory),
    /// Speak the current word again.
    Replay,
    /// Move on after a wrong answer or timeout.
    Advance,
    /// Stop the controller loop.
    Quit,
}

/// State updates emitted to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    /// A new word is on screen and the countdown restarted.
    RoundStarted(RoundSnapshot),

    /// The countdown advanced.
    CountdownTick {
        round: u64,
        time_remaining: Duration,
    },

    /// The round was resolved (answer or timeout).
    PhaseChanged(RoundSnapshot),
}

// ── Timers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Countdown,
    AutoAdvance,
}

/// Message posted by a timer task back to the controller.
#[derive(Debug, Clone, Copy)]
struct TimerFired {
    round: u64,
    kind: TimerKind,
}

/// Handle to a spawned timer task. Dropping it aborts the task.
struct ScheduledTask(JoinHandle<()>);

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// Owns the round state, the countdown and the auto-advance timer.
pub struct RoundController {
    words: Arc<dyn WordSource>,
    speech: Arc<dyn SpeechPort>,
    settings: QuizSettings,

    round: u64,
    current_word: Option<Word>,
    streak: u32,
    time_remaining: Duration,
    phase: RoundPhase,
    selected_tone: Option<ToneCategory>,
    round_started_at: Option<Instant>,

    countdown: Option<ScheduledTask>,
    auto_advance: Option<ScheduledTask>,
    timer_tx: mpsc::UnboundedSender<TimerFired>,
    timer_rx: mpsc::UnboundedReceiver<TimerFired>,
    /// Timer messages discarded because their round was superseded.
    stale_timer_messages: u64,

    event_tx: mpsc::UnboundedSender<RoundEvent>,
}

impl RoundController {
    /// Create a controller with no round started yet.
    ///
    /// Returns the controller and a receiver for [`RoundEvent`]s, or
    /// [`CoreError::InvalidSettings`] if the timings cannot drive a countdown.
    pub fn new(
        words: Arc<dyn WordSource>,
        speech: Arc<dyn SpeechPort>,
        settings: QuizSettings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RoundEvent>), CoreError> {
        settings.validate()?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let controller = Self {
            words,
            speech,
            settings,
            round: 0,
            current_word: None,
            streak: 0,
            time_remaining: settings.round_duration,
            phase: RoundPhase::Playing,
            selected_tone: None,
            round_started_at: None,
            countdown: None,
            auto_advance: None,
            timer_tx,
            timer_rx,
            stale_timer_messages: 0,
            event_tx,
        };

        Ok((controller, event_rx))
    }

    // ── Accessors ──────────────────────────────────────────────────

    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub const fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    #[must_use]
    pub const fn current_word(&self) -> Option<&Word> {
        self.current_word.as_ref()
    }

    #[must_use]
    pub const fn selected_tone(&self) -> Option<ToneCategory> {
        self.selected_tone
    }

    /// Number of rounds started so far.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Whether a countdown task is currently scheduled.
    #[must_use]
    pub const fn countdown_pending(&self) -> bool {
        self.countdown.is_some()
    }

    /// Whether an auto-advance task is currently scheduled.
    #[must_use]
    pub const fn auto_advance_pending(&self) -> bool {
        self.auto_advance.is_some()
    }

    /// Copy of the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round: self.round,
            current_word: self.current_word.clone(),
            streak: self.streak,
            time_remaining: self.time_remaining,
            round_duration: self.settings.round_duration,
            phase: self.phase,
            selected_tone: self.selected_tone,
        }
    }

    // ── Operations ─────────────────────────────────────────────────

    /// Start a new round with a fresh word.
    ///
    /// Cancels both timers and silences the previous word before the next
    /// one is picked and spoken.
    pub fn start_new_round(&mut self, reset_streak: bool) {
        self.cancel_timers();
        self.speech.stop();

        let next = self.words.pick_next_word(self.current_word.as_ref());

        self.round += 1;
        self.phase = RoundPhase::Playing;
        self.selected_tone = None;
        self.time_remaining = self.settings.round_duration;
        if reset_streak {
            self.streak = 0;
        }
        self.round_started_at = Some(Instant::now());
        self.current_word = Some(next);

        self.schedule_countdown();

        tracing::debug!(
            round = self.round,
            streak = self.streak,
            reset_streak,
            "Round started"
        );
        self.emit(RoundEvent::RoundStarted(self.snapshot()));

        if let Some(word) = &self.current_word {
            self.speech.speak(&word.text);
        }
    }

    /// Judge the player's answer.
    ///
    /// Returns `false` (and changes nothing) unless a round is `Playing`.
    pub fn select_tone(&mut self, tone: ToneCategory) -> bool {
        if self.phase != RoundPhase::Playing {
            return false;
        }
        let Some(expected) = self.current_word.as_ref().map(|w| w.tone) else {
            return false;
        };

        self.countdown = None;
        self.selected_tone = Some(tone);

        if tone == expected {
            self.streak = self.streak.saturating_add(1);
            self.set_phase(RoundPhase::Correct);
            self.schedule_auto_advance();
        } else {
            self.set_phase(RoundPhase::Wrong);
        }

        true
    }

    /// Speak the current word again. Phase, timer and streak are untouched.
    pub fn replay(&self) -> bool {
        let Some(word) = &self.current_word else {
            return false;
        };
        tracing::debug!(round = self.round, "Replaying word");
        self.speech.speak(&word.text);
        true
    }

    /// Manual advance after `Wrong` or `TimedOut`; resets the streak.
    ///
    /// Ignored in any other phase.
    pub fn advance(&mut self) -> bool {
        if !self.phase.awaits_manual_advance() {
            return false;
        }
        self.start_new_round(true);
        true
    }

    /// Cancel all timers and silence speech.
    pub fn shutdown(&mut self) {
        self.cancel_timers();
        self.speech.stop();
        tracing::debug!(round = self.round, "Round controller shut down");
    }

    /// Apply a presentation command. Returns `false` for [`RoundCommand::Quit`].
    pub fn handle_command(&mut self, command: RoundCommand) -> bool {
        match command {
            RoundCommand::SelectTone(tone) => {
                self.select_tone(tone);
            }
            RoundCommand::Replay => {
                self.replay();
            }
            RoundCommand::Advance => {
                self.advance();
            }
            RoundCommand::Quit => return false,
        }
        true
    }

    /// Wait for the next timer message and apply it.
    pub async fn process_next_timer(&mut self) {
        if let Some(fired) = self.timer_rx.recv().await {
            self.handle_timer(fired);
        }
    }

    /// Drive the controller until `Quit` arrives or the command channel closes.
    ///
    /// Starts the first round immediately and shuts down on exit.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<RoundCommand>) {
        enum Input {
            Command(Option<RoundCommand>),
            Timer(TimerFired),
        }

        tracing::info!("Round controller started");
        self.start_new_round(false);

        loop {
            let input = tokio::select! {
                cmd = commands.recv() => Input::Command(cmd),
                Some(fired) = self.timer_rx.recv() => Input::Timer(fired),
            };

            match input {
                Input::Command(Some(cmd)) => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                Input::Command(None) => break,
                Input::Timer(fired) => self.handle_timer(fired),
            }
        }

        self.shutdown();
        tracing::info!(streak = self.streak, "Round controller stopped");
    }

    // ── Timer handling ─────────────────────────────────────────────

    fn handle_timer(&mut self, fired: TimerFired) {
        if fired.round != self.round {
            self.stale_timer_messages += 1;
            tracing::trace!(stale = fired.round, current = self.round, "Dropping stale timer");
            return;
        }

        match fired.kind {
            TimerKind::Countdown => self.on_tick(),
            TimerKind::AutoAdvance => {
                self.auto_advance = None;
                if self.phase == RoundPhase::Correct {
                    self.start_new_round(false);
                }
            }
        }
    }

    fn on_tick(&mut self) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        let Some(started) = self.round_started_at else {
            return;
        };

        let remaining = self
            .settings
            .round_duration
            .saturating_sub(started.elapsed());

        if remaining <= self.settings.timeout_epsilon {
            self.time_remaining = Duration::ZERO;
            self.countdown = None;
            self.set_phase(RoundPhase::TimedOut);
            return;
        }

        self.time_remaining = remaining;
        self.emit(RoundEvent::CountdownTick {
            round: self.round,
            time_remaining: remaining,
        });
    }

    fn schedule_countdown(&mut self) {
        let tx = self.timer_tx.clone();
        let round = self.round;
        let period = self.settings.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let fired = TimerFired {
                    round,
                    kind: TimerKind::Countdown,
                };
                if tx.send(fired).is_err() {
                    break;
                }
            }
        });

        self.countdown = Some(ScheduledTask(handle));
    }

    fn schedule_auto_advance(&mut self) {
        let tx = self.timer_tx.clone();
        let round = self.round;
        let delay = self.settings.auto_advance_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TimerFired {
                round,
                kind: TimerKind::AutoAdvance,
            });
        });

        self.auto_advance = Some(ScheduledTask(handle));
    }

    fn cancel_timers(&mut self) {
        self.countdown = None;
        self.auto_advance = None;
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn set_phase(&mut self, phase: RoundPhase) {
        tracing::debug!(
            round = self.round,
            old = ?self.phase,
            new = ?phase,
            streak = self.streak,
            "Round phase transition"
        );
        self.phase = phase;
        self.emit(RoundEvent::PhaseChanged(self.snapshot()));
    }

    /// Emit a round event (best-effort - a dropped receiver is not an error).
    fn emit(&self, event: RoundEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Round event receiver dropped");
        }
    }
}

impl Drop for RoundController {
    fn drop(&mut self) {
        self.cancel_timers();
        self.speech.stop();
    }
}
