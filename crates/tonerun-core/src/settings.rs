//! Quiz timing settings and validation.
//!
//! These are pure domain types with no infrastructure dependencies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default length of one round's countdown.
pub const DEFAULT_ROUND_DURATION: Duration = Duration::from_secs(10);

/// Default countdown tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Remaining time at or below which the round is considered timed out.
pub const DEFAULT_TIMEOUT_EPSILON: Duration = Duration::from_millis(100);

/// Delay between a correct answer and the next round.
pub const DEFAULT_AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1200);

/// Timing parameters of the round controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QuizSettings {
    /// Countdown length per round.
    pub round_duration: Duration,

    /// How often the countdown is re-evaluated.
    pub tick_interval: Duration,

    /// Remaining time that counts as "expired".
    pub timeout_epsilon: Duration,

    /// Pause after a correct answer before the next word appears.
    pub auto_advance_delay: Duration,
}

impl QuizSettings {
    /// Create settings with the standard quiz timings.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            round_duration: DEFAULT_ROUND_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            timeout_epsilon: DEFAULT_TIMEOUT_EPSILON,
            auto_advance_delay: DEFAULT_AUTO_ADVANCE_DELAY,
        }
    }

    /// Override the round length.
    #[must_use]
    pub const fn with_round_duration(mut self, duration: Duration) -> Self {
        self.round_duration = duration;
        self
    }

    /// Check the timings; see [`validate_settings`].
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_settings(self)
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Round duration must be positive")]
    ZeroRoundDuration,

    #[error("Tick interval must be positive")]
    ZeroTickInterval,

    #[error("Auto-advance delay must be positive")]
    ZeroAutoAdvanceDelay,

    #[error("Timeout epsilon ({epsilon:?}) must be shorter than the round ({round:?})")]
    EpsilonTooLarge { epsilon: Duration, round: Duration },
}

/// Validate quiz settings values.
pub fn validate_settings(settings: &QuizSettings) -> Result<(), SettingsError> {
    if settings.round_duration.is_zero() {
        return Err(SettingsError::ZeroRoundDuration);
    }

    if settings.tick_interval.is_zero() {
        return Err(SettingsError::ZeroTickInterval);
    }

    if settings.auto_advance_delay.is_zero() {
        return Err(SettingsError::ZeroAutoAdvanceDelay);
    }

    if settings.timeout_epsilon >= settings.round_duration {
        return Err(SettingsError::EpsilonTooLarge {
            epsilon: settings.timeout_epsilon,
            round: settings.round_duration,
        });
    }

    Ok(())
}
