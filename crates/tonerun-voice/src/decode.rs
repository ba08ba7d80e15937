//! PCM decoding - backend payloads to playable samples.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::VoiceError;

/// Sample layout of raw 16-bit PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    /// 24 kHz mono, the layout the speech backend produces.
    pub const SPEECH: Self = Self {
        sample_rate: 24_000,
        channels: 1,
    };

    /// Read the sample rate out of a `audio/L16;codec=pcm;rate=24000` mime
    /// type, keeping `self` for anything the mime type does not state.
    #[must_use]
    pub fn with_mime_type(self, mime: &str) -> Self {
        let mut format = self;
        for param in mime.split(';').skip(1) {
            let Some((key, value)) = param.trim().split_once('=') else {
                continue;
            };
            match key.trim() {
                "rate" => {
                    if let Ok(rate) = value.trim().parse() {
                        format.sample_rate = rate;
                    }
                }
                "channels" => {
                    if let Ok(channels) = value.trim().parse() {
                        format.channels = channels;
                    }
                }
                _ => {}
            }
        }
        format
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::SPEECH
    }
}

/// Decoded, playable audio.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    /// Interleaved f32 samples in `[-1.0, 1.0)`.
    pub samples: Vec<f32>,

    pub sample_rate: u32,

    pub channels: u16,

    pub duration: Duration,
}

/// Convert 16-bit signed little-endian PCM bytes to f32 samples.
pub fn pcm16le_to_f32(bytes: &[u8]) -> Result<Vec<f32>, VoiceError> {
    if bytes.is_empty() {
        return Err(VoiceError::Decode("empty PCM payload".into()));
    }
    if bytes.len() % 2 != 0 {
        return Err(VoiceError::Decode(format!(
            "PCM payload has odd length {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect())
}

/// Decode base64 PCM16LE text into [`SpeechAudio`].
pub fn decode_pcm16_base64(data: &str, format: AudioFormat) -> Result<SpeechAudio, VoiceError> {
    if format.channels == 0 || format.sample_rate == 0 {
        return Err(VoiceError::Decode(format!(
            "unusable audio format {format:?}"
        )));
    }

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| VoiceError::Decode(format!("invalid base64: {e}")))?;
    let samples = pcm16le_to_f32(&bytes)?;

    let channels = usize::from(format.channels);
    if samples.len() % channels != 0 {
        return Err(VoiceError::Decode(format!(
            "{} samples do not split into {channels} channels",
            samples.len()
        )));
    }

    let frames = (samples.len() / channels) as u64;
    let duration = Duration::from_micros(frames * 1_000_000 / u64::from(format.sample_rate));

    Ok(SpeechAudio {
        samples,
        sample_rate: format.sample_rate,
        channels: format.channels,
        duration,
    })
}
