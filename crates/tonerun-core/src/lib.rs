//! Core of the tone quiz: domain types, ports, the word corpus and the
//! round controller state machine.
//!
//! Audio lives behind [`SpeechPort`]; word selection behind [`WordSource`].
//! Neither port can fail from the controller's point of view.

#![deny(unused_crate_dependencies)]

pub mod corpus;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use corpus::Corpus;
pub use domain::{ParseToneError, RoundPhase, RoundSnapshot, ToneCategory, Word};
pub use error::CoreError;
pub use ports::{SilentSpeech, SpeechPort, WordSource};
pub use services::{RoundCommand, RoundController, RoundEvent};
pub use settings::{
    DEFAULT_AUTO_ADVANCE_DELAY, DEFAULT_ROUND_DURATION, DEFAULT_TICK_INTERVAL,
    DEFAULT_TIMEOUT_EPSILON, QuizSettings, SettingsError, validate_settings,
};
