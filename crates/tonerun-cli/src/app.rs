//! Interactive quiz loop.
//!
//! The controller runs as its own task; this loop only redraws on events.
//! Key presses reach the controller through [`KeyReader`], and the loop ends
//! when the controller drops its event sender.

use std::io;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::bootstrap::QuizContext;
use crate::error::CliError;
use crate::presentation::{KeyReader, QuizView, TerminalGuard, draw};

/// Run the quiz until the player quits.
pub async fn run(ctx: QuizContext) -> Result<()> {
    let QuizContext {
        controller,
        mut events,
        speech,
    } = ctx;

    let guard = TerminalGuard::enter().map_err(CliError::from)?;
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let keys = KeyReader::spawn(cmd_tx).map_err(CliError::from)?;
    let controller = tokio::spawn(controller.run(cmd_rx));

    let mut view = QuizView::new();
    let mut stdout = io::stdout();
    let mut draw_result = draw(&mut stdout, &view.render_lines());

    while let Some(event) = events.recv().await {
        view.apply(event);
        draw_result = draw_result.and_then(|()| draw(&mut stdout, &view.render_lines()));
        if draw_result.is_err() {
            break;
        }
    }

    drop(keys);
    if let Err(e) = controller.await {
        tracing::error!(error = %e, "Round controller task failed");
    }
    speech.stop();
    drop(guard);

    draw_result.map_err(|e| CliError::from(e).into())
}
