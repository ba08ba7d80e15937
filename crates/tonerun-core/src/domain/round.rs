//! Round state types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::word::{ToneCategory, Word};

/// Phase of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    /// Countdown running, waiting for an answer.
    Playing,
    /// The player picked the right tone.
    Correct,
    /// The player picked a wrong tone.
    Wrong,
    /// The countdown expired without an answer.
    TimedOut,
}

impl RoundPhase {
    /// Whether the round ended in a way that requires a manual advance.
    #[must_use]
    pub const fn awaits_manual_advance(self) -> bool {
        matches!(self, Self::Wrong | Self::TimedOut)
    }
}

/// Read-only copy of the round state, handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Monotonic round counter; increments on every round start.
    pub round: u64,
    pub current_word: Option<Word>,
    pub streak: u32,
    pub time_remaining: Duration,
    pub round_duration: Duration,
    pub phase: RoundPhase,
    pub selected_tone: Option<ToneCategory>,
}

impl RoundSnapshot {
    /// Fraction of the countdown left, in `[0.0, 1.0]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.round_duration.is_zero() {
            return 0.0;
        }
        (self.time_remaining.as_secs_f64() / self.round_duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}
