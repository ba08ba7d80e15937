//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where concrete implementations are wired
//! together:
//! - Word corpus (built-in or from `--words`)
//! - Speech backend (Gemini, or disabled when offline / keyless)
//! - Fallback voice and audio output
//! - Speech coordinator and round controller

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use tonerun_core::{Corpus, QuizSettings, RoundController, RoundEvent, SpeechPort};
use tonerun_voice::{
    AudioSink, DisabledBackend, GeminiBackend, GeminiConfig, SpeechBackend, SpeechCoordinator,
    SystemVoice, open_default_sink,
};

use crate::error::CliError;
use crate::parser::Cli;

/// Resolved startup configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub words: Option<PathBuf>,
    pub seed: Option<u64>,
    pub offline: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
    pub fallback_cmd: Option<String>,
    pub settings: QuizSettings,
}

impl CliConfig {
    /// Build from parsed arguments. `API_KEY` stands in for a missing
    /// `--api-key` / `GEMINI_API_KEY`.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let api_key = cli
            .api_key
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        let settings = QuizSettings::with_defaults().with_round_duration(cli.round_seconds);
        settings.validate()
            .map_err(CliError::from)
            .context("Invalid --round-seconds")?;

        Ok(Self {
            words: cli.words,
            seed: cli.seed,
            offline: cli.offline,
            api_key,
            model: cli.model,
            voice: cli.voice,
            fallback_cmd: cli.fallback_cmd.filter(|cmd| !cmd.trim().is_empty()),
            settings,
        })
    }
}

/// Everything the terminal loop needs to run a quiz.
pub struct QuizContext {
    pub controller: RoundController,
    pub events: mpsc::UnboundedReceiver<RoundEvent>,
    pub speech: Arc<dyn SpeechPort>,
}

/// Load the configured word list.
pub fn load_corpus(config: &CliConfig) -> Result<Corpus> {
    let corpus = match &config.words {
        Some(path) => Corpus::from_json_file(path).map_err(CliError::from)?,
        None => Corpus::thai(),
    };
    Ok(match config.seed {
        Some(seed) => corpus.with_seed(seed),
        None => corpus,
    })
}

/// Pick the speech backend: Gemini when online with a key, otherwise one
/// that always defers to the fallback voice.
pub fn build_backend(config: &CliConfig) -> Result<Arc<dyn SpeechBackend>> {
    if config.offline {
        tracing::info!("Offline mode: using the system voice only");
        return Ok(Arc::new(DisabledBackend));
    }

    let Some(api_key) = &config.api_key else {
        tracing::warn!("No GEMINI_API_KEY set; using the system voice only");
        return Ok(Arc::new(DisabledBackend));
    };

    let gemini = GeminiConfig::new(api_key.clone())
        .with_model(config.model.clone())
        .with_voice(config.voice.clone());
    let backend = GeminiBackend::new(gemini)
        .map_err(|e| CliError::Config(e.to_string()))
        .context("Failed to create speech client")?;
    Ok(Arc::new(backend))
}

/// Compose the quiz around an explicit audio sink.
pub fn bootstrap_with_sink(
    config: &CliConfig,
    sink: Arc<dyn AudioSink>,
    runtime: Handle,
) -> Result<QuizContext> {
    let corpus = load_corpus(config)?;
    tracing::debug!(words = corpus.len(), "Word list ready");

    let fallback = config
        .fallback_cmd
        .as_deref()
        .map_or_else(SystemVoice::platform_default, SystemVoice::new);

    let speech: Arc<dyn SpeechPort> = Arc::new(SpeechCoordinator::new(
        build_backend(config)?,
        Arc::new(fallback),
        sink,
        runtime,
    ));

    let (controller, events) =
        RoundController::new(Arc::new(corpus), Arc::clone(&speech), config.settings)
            .map_err(CliError::from)?;

    Ok(QuizContext {
        controller,
        events,
        speech,
    })
}

/// Compose the quiz on the default output device.
///
/// A machine without usable audio output still gets a quiz, silently.
pub fn bootstrap(config: &CliConfig) -> Result<QuizContext> {
    bootstrap_with_sink(config, open_default_sink(), Handle::current())
}
