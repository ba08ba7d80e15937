//! Vocabulary domain types.
//!
//! A [`Word`] is an immutable quiz item; its [`ToneCategory`] is the answer
//! the player has to pick.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five Thai tone classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneCategory {
    Mid,
    Low,
    Falling,
    High,
    Rising,
}

impl ToneCategory {
    /// All tone categories, in the order they are offered to the player.
    pub const ALL: [Self; 5] = [Self::Mid, Self::Low, Self::Falling, Self::High, Self::Rising];

    /// Convert tone to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mid => "Mid",
            Self::Low => "Low",
            Self::Falling => "Falling",
            Self::High => "High",
            Self::Rising => "Rising",
        }
    }

    /// Parse a tone from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Map a 1-based answer key (`1`..=`5`) to a tone.
    #[must_use]
    pub fn from_key(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string does not name a tone category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tone category '{0}'")]
pub struct ParseToneError(pub String);

impl FromStr for ToneCategory {
    type Err = ParseToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseToneError(s.to_string()))
    }
}

/// A quiz word.
///
/// Identity for "don't repeat the previous word" purposes is `text` equality,
/// see [`Word::same_text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Written form in the target script.
    pub text: String,
    /// Latin transliteration.
    pub transliteration: String,
    /// The correct answer.
    pub tone: ToneCategory,
    /// English translation.
    pub translation: String,
}

impl Word {
    pub fn new(
        text: impl Into<String>,
        transliteration: impl Into<String>,
        tone: ToneCategory,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            transliteration: transliteration.into(),
            tone,
            translation: translation.into(),
        }
    }

    /// Whether two words share the same written form.
    #[must_use]
    pub fn same_text(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_parse_is_case_insensitive() {
        assert_eq!(ToneCategory::parse("falling"), Some(ToneCategory::Falling));
        assert_eq!(ToneCategory::parse(" RISING "), Some(ToneCategory::Rising));
        assert_eq!(ToneCategory::parse("tone5"), None);
    }

    #[test]
    fn tone_from_str_reports_input() {
        let err = "sideways".parse::<ToneCategory>().unwrap_err();
        assert_eq!(err.to_string(), "unknown tone category 'sideways'");
    }

    #[test]
    fn answer_keys_follow_display_order() {
        assert_eq!(ToneCategory::from_key(1), Some(ToneCategory::Mid));
        assert_eq!(ToneCategory::from_key(5), Some(ToneCategory::Rising));
        assert_eq!(ToneCategory::from_key(0), None);
        assert_eq!(ToneCategory::from_key(6), None);
    }

    #[test]
    fn same_text_ignores_other_fields() {
        let a = Word::new("ขาว", "khao", ToneCategory::Rising, "white");
        let b = Word::new("ขาว", "kaao", ToneCategory::Mid, "rice");
        let c = Word::new("ข้าว", "khao", ToneCategory::Falling, "rice/food");
        assert!(a.same_text(&b));
        assert!(!a.same_text(&c));
    }
}
