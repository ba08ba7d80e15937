//! CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tonerun_cli::{Cli, CliConfig, CliError, app, bootstrap};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads GEMINI_API_KEY and friends
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never land on the quiz screen
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = CliError::exit_code_for(&e);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(cli)?;
    let ctx = bootstrap(&config)?;
    app::run(ctx).await
}
