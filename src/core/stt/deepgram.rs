//! Deepgram remote STT adapter
//!
//! Sends one analysis frame per request to the Deepgram prerecorded
//! transcription API as a WAV payload. The adapter applies a silence gate
//! before calling out: frames whose mean absolute amplitude is below
//! [`SILENCE_EPSILON`](super::SILENCE_EPSILON) are answered with an empty
//! transcript without touching the network.
//!
//! A fresh blocking HTTP client is created per call so the engine can be
//! invoked concurrently from multiple worker-pool tasks without shared
//! connection state.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::EngineError;

use super::{SILENCE_EPSILON, SpeechToText, validate_frame};

const DEEPGRAM_LISTEN_URL: &str = "https://api.deepgram.com/v1/listen";

/// Deepgram adapter configuration
#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    /// API key for the Deepgram API
    pub api_key: String,
    /// Language code for transcription (e.g. "ko", "en")
    pub language: String,
    /// Deepgram model name (e.g. "nova-2")
    pub model: String,
    /// Sample rate of incoming frames in Hz
    pub sample_rate: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
}

/// Remote STT engine backed by the Deepgram prerecorded API.
pub struct DeepgramStt {
    config: DeepgramConfig,
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    transcript: String,
}

impl DeepgramStt {
    /// Create the adapter.
    ///
    /// # Errors
    /// Returns `EngineError::Unavailable` if the API key is empty.
    pub fn new(config: DeepgramConfig) -> Result<Self, EngineError> {
        if config.api_key.trim().is_empty() {
            return Err(EngineError::Unavailable(
                "Deepgram API key is not set".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Encode a normalized frame as a mono 16-bit WAV payload.
    ///
    /// Deepgram detects the format from the container, so no encoding query
    /// parameters are needed.
    fn encode_wav(&self, frame: &[f32]) -> Vec<u8> {
        let data_len = (frame.len() * 2) as u32;
        let sample_rate = self.config.sample_rate;
        let byte_rate = sample_rate * 2;

        let mut wav = Vec::with_capacity(44 + data_len as usize);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&sample_rate.to_le_bytes());
        wav.extend_from_slice(&byte_rate.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());

        for &sample in frame {
            let value = (sample * 32768.0).clamp(-32768.0, 32767.0) as i16;
            wav.extend_from_slice(&value.to_le_bytes());
        }

        wav
    }

    fn request(&self, wav: Vec<u8>) -> Result<String, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| EngineError::Failure(format!("failed to build HTTP client: {e}")))?;

        let url = format!(
            "{DEEPGRAM_LISTEN_URL}?model={}&language={}&smart_format=false&punctuate=false",
            self.config.model, self.config.language
        );

        let response = client
            .post(url)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header(CONTENT_TYPE, "audio/wav")
            .body(wav)
            .send()
            .map_err(|e| EngineError::Failure(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(EngineError::Failure(format!(
                "Deepgram returned status {}",
                response.status()
            )));
        }

        let parsed: ListenResponse = response
            .json()
            .map_err(|e| EngineError::Failure(format!("malformed response: {e}")))?;

        let transcript = parsed
            .results
            .and_then(|r| r.channels.into_iter().next())
            .and_then(|c| c.alternatives.into_iter().next())
            .map(|a| a.transcript.trim().to_string())
            .unwrap_or_default();

        Ok(transcript)
    }
}

impl SpeechToText for DeepgramStt {
    fn transcribe(&self, frame: &[f32]) -> Result<String, EngineError> {
        validate_frame(frame)?;

        let mean_amplitude = frame.iter().map(|s| s.abs()).sum::<f32>() / frame.len() as f32;
        if mean_amplitude < SILENCE_EPSILON {
            debug!("Audio too quiet (mean={mean_amplitude:.4}), skipping API call");
            return Ok(String::new());
        }

        let started = Instant::now();
        match self.request(self.encode_wav(frame)) {
            Ok(transcript) => {
                debug!(
                    "Deepgram transcription: {:.1}ms, {} chars",
                    started.elapsed().as_secs_f64() * 1000.0,
                    transcript.len()
                );
                Ok(transcript)
            }
            Err(e) => {
                // Per-invocation failures cost one frame of detection, not
                // the connection.
                warn!(
                    "Deepgram transcription failed after {:.1}ms: {e}",
                    started.elapsed().as_secs_f64() * 1000.0
                );
                Ok(String::new())
            }
        }
    }

    fn engine_name(&self) -> &'static str {
        "deepgram"
    }
}
