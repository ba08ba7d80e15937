//! Core services - the application's game logic layer.
//!
//! Services here are pure orchestrators over ports (trait interfaces) and
//! domain types - they don't know about concrete audio or corpus backends.

mod round_controller;

pub use round_controller::{RoundCommand, RoundController, RoundEvent};
