//! Quiz screen view model.
//!
//! Folds [`RoundEvent`]s into the latest snapshot and renders it as plain
//! text lines. Terminal control lives in [`super::terminal`].

use std::time::Duration;

use tonerun_core::{RoundEvent, RoundPhase, RoundSnapshot, ToneCategory};

/// Width of the countdown bar in cells.
pub const BAR_WIDTH: usize = 40;

/// Latest known round state.
#[derive(Debug, Default)]
pub struct QuizView {
    snapshot: Option<RoundSnapshot>,
}

impl QuizView {
    pub const fn new() -> Self {
        Self { snapshot: None }
    }

    pub const fn snapshot(&self) -> Option<&RoundSnapshot> {
        self.snapshot.as_ref()
    }

    /// Apply a controller event. Ticks from an earlier round are ignored.
    pub fn apply(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::RoundStarted(snapshot) | RoundEvent::PhaseChanged(snapshot) => {
                self.snapshot = Some(snapshot);
            }
            RoundEvent::CountdownTick {
                round,
                time_remaining,
            } => {
                if let Some(s) = self.snapshot.as_mut().filter(|s| s.round == round) {
                    s.time_remaining = time_remaining;
                }
            }
        }
    }

    /// Screen contents, one entry per line.
    pub fn render_lines(&self) -> Vec<String> {
        let Some(s) = &self.snapshot else {
            return vec!["TONE RUN".to_string(), String::new(), "Loading...".to_string()];
        };

        let streak = format!("Streak {}", s.streak);
        let mut lines = vec![format!("TONE RUN{streak:>width$}", width = BAR_WIDTH - 8)];
        lines.push(String::new());

        match &s.current_word {
            Some(word) => {
                lines.push(format!("  {}", word.text));
                lines.push(format!("  {} \u{b7} {}", word.transliteration, word.translation));
            }
            None => lines.push("  ...".to_string()),
        }
        lines.push(String::new());

        lines.push(feedback_line(s));
        lines.push(format!(
            "{} {}",
            progress_bar(s.progress(), BAR_WIDTH),
            format_remaining(s.time_remaining)
        ));
        lines.push(String::new());

        if s.phase.awaits_manual_advance() {
            lines.push("[n] Next Word".to_string());
        } else {
            lines.push(tone_legend());
        }
        lines.push("r/space replay \u{b7} q quit".to_string());
        lines
    }
}

fn feedback_line(s: &RoundSnapshot) -> String {
    let answer = s.current_word.as_ref().map(|w| w.tone);
    match (s.phase, answer) {
        (RoundPhase::Playing, _) => "Which tone?".to_string(),
        (RoundPhase::Correct, _) => "CORRECT!".to_string(),
        (RoundPhase::Wrong, Some(tone)) => match s.selected_tone {
            Some(picked) => format!("Correct tone: {tone} (you picked {picked})"),
            None => format!("Correct tone: {tone}"),
        },
        (RoundPhase::TimedOut, Some(tone)) => format!("Time's up! Correct tone: {tone}"),
        (RoundPhase::Wrong | RoundPhase::TimedOut, None) => String::new(),
    }
}

fn tone_legend() -> String {
    ToneCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, tone)| format!("[{}] {tone}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Render `fraction` of `width` cells as filled.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn format_remaining(remaining: Duration) -> String {
    format!("{:>4.1}s", remaining.as_secs_f64())
}
