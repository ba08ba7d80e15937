//! Terminal front end for the tone quiz.
//!
//! [`bootstrap`] wires the word list, speech stack and round controller;
//! [`app::run`] drives them from the keyboard.

#![deny(unused_crate_dependencies)]

// Used by the binary target only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod app;
pub mod bootstrap;
pub mod error;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, QuizContext, bootstrap, bootstrap_with_sink};
pub use error::CliError;
pub use parser::Cli;
