//! Terminal presentation: keyboard input, the quiz screen and raw-mode
//! handling.
//!
//! Keep this module format-only; round rules live in the core controller.

pub mod keys;
pub mod terminal;
pub mod view;

pub use keys::{KeyReader, command_for_key};
pub use terminal::{TerminalGuard, draw};
pub use view::{QuizView, progress_bar};
