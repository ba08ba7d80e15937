//! Word source port.

use crate::domain::Word;

/// Picks the next quiz word.
///
/// Implementations never fail: a word source is non-empty by construction.
#[cfg_attr(test, mockall::automock)]
pub trait WordSource: Send + Sync {
    /// Pick a word at random, avoiding `exclude` (by text) when the source
    /// has any other word to offer.
    fn pick_next_word<'a>(&self, exclude: Option<&'a Word>) -> Word;
}
