//! Command-line argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use tonerun_voice::backend::gemini::{DEFAULT_MODEL, DEFAULT_VOICE};

/// Thai tone quiz: hear a word, pick its tone before the countdown ends.
#[derive(Debug, Parser)]
#[command(name = "tonerun")]
#[command(about = "Hear a Thai word, pick its tone before time runs out")]
#[command(version)]
pub struct Cli {
    /// JSON word list: an array of {text, transliteration, tone, translation}
    #[arg(long, value_name = "FILE")]
    pub words: Option<PathBuf>,

    /// Seed word selection for a reproducible sequence
    #[arg(long)]
    pub seed: Option<u64>,

    /// Never call the speech service; use the system voice only
    #[arg(long)]
    pub offline: bool,

    /// Speech service API key (`API_KEY` is also accepted)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Speech model name
    #[arg(long, env = "TONERUN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Prebuilt voice name
    #[arg(long, env = "TONERUN_VOICE", default_value = DEFAULT_VOICE)]
    pub voice: String,

    /// Speech command used when the service is unavailable
    #[arg(long, env = "TONERUN_FALLBACK_CMD", value_name = "PROGRAM")]
    pub fallback_cmd: Option<String>,

    /// Seconds allowed per round
    #[arg(long, value_name = "SECONDS", default_value = "10", value_parser = parse_seconds)]
    pub round_seconds: Duration,
}

/// Parse a positive, finite number of seconds.
pub fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("round length must be positive, got {raw}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "tonerun",
            "--words",
            "/tmp/words.json",
            "--seed",
            "7",
            "--offline",
            "--api-key",
            "k",
            "--model",
            "m",
            "--voice",
            "Puck",
            "--fallback-cmd",
            "espeak",
            "--round-seconds",
            "4.5",
        ])
        .unwrap();

        assert_eq!(cli.words, Some(PathBuf::from("/tmp/words.json")));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.offline);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert_eq!(cli.model, "m");
        assert_eq!(cli.voice, "Puck");
        assert_eq!(cli.fallback_cmd.as_deref(), Some("espeak"));
        assert_eq!(cli.round_seconds, Duration::from_millis(4500));
    }

    #[test]
    fn test_round_seconds_default() {
        let cli = Cli::try_parse_from(["tonerun", "--offline"]).unwrap();
        assert_eq!(cli.round_seconds, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_seconds_rejects_bad_values() {
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("-3").is_err());
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("ten").is_err());
        assert_eq!(parse_seconds(" 2 ").unwrap(), Duration::from_secs(2));
    }
}
