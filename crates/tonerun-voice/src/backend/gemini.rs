//! Gemini text-to-speech over the REST `generateContent` endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{EncodedAudio, SpeechBackend};
use crate::decode::AudioFormat;
use crate::error::VoiceError;

/// Default speech model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default prebuilt voice.
pub const DEFAULT_VOICE: &str = "Kore";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for [`GeminiBackend`].
///
/// ```
/// use tonerun_voice::GeminiConfig;
/// use std::time::Duration;
///
/// let config = GeminiConfig::new("key")
///     .with_voice("Puck")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct GeminiConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) voice: String,
    pub(crate) prompt_prefix: String,
    pub(crate) timeout: Duration,
    pub(crate) format: AudioFormat,
}

impl GeminiConfig {
    /// Configuration with default model, voice and endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            prompt_prefix: "Say clearly: ".to_string(),
            timeout: Duration::from_secs(20),
            format: AudioFormat::SPEECH,
        }
    }

    /// Set the API base URL (no trailing slash).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the prebuilt voice name.
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the instruction prepended to every word.
    #[must_use]
    pub fn with_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prompt_prefix = prefix.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 20 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sample layout assumed when the response does not state one.
    #[must_use]
    pub const fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("voice", &self.voice)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: [TextPart; 1],
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

fn request_body<'a>(config: &'a GeminiConfig, text: &str) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: [Content {
            parts: [TextPart {
                text: format!("{}{text}", config.prompt_prefix),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: ["AUDIO"],
            speech_config: SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: &config.voice,
                    },
                },
            },
        },
    }
}

/// Pull the first candidate's first inline audio part out of a response.
fn extract_audio(
    response: GenerateResponse,
    default_format: AudioFormat,
) -> Result<EncodedAudio, VoiceError> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.inline_data)
        .filter(|d| !d.data.is_empty())
        .ok_or(VoiceError::MissingAudio)?;

    let format = inline
        .mime_type
        .as_deref()
        .map_or(default_format, |mime| default_format.with_mime_type(mime));

    Ok(EncodedAudio {
        data: inline.data,
        format,
    })
}

// ============================================================================
// Backend
// ============================================================================

/// Remote speech backend calling Gemini's `generateContent` with an audio
/// response modality.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a backend with its own HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tonerun/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::info!(model = %config.model, voice = %config.voice, "Gemini speech backend ready");
        Ok(Self { client, config })
    }

    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl SpeechBackend for GeminiBackend {
    async fn generate(&self, text: &str) -> Result<EncodedAudio, VoiceError> {
        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(&self.config, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VoiceError::BackendStatus {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        let audio = extract_audio(body, self.config.format)?;
        tracing::debug!(text, bytes = audio.data.len(), "Speech backend returned audio");
        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
