//! Domain types for the tone quiz.
//!
//! These are pure data types with no infrastructure dependencies.

mod round;
mod word;

pub use round::{RoundPhase, RoundSnapshot};
pub use word::{ParseToneError, ToneCategory, Word};
