//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the round controller expects from the
//! word corpus and the audio side. They use only domain types.

pub mod speech;
pub mod word_source;

pub use speech::{SilentSpeech, SpeechPort};
pub use word_source::WordSource;

#[cfg(test)]
pub use speech::MockSpeechPort;
#[cfg(test)]
pub use word_source::MockWordSource;
