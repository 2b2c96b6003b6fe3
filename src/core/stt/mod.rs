//! Speech-to-text engine layer
//!
//! Engines implement the [`SpeechToText`] trait: one blocking call that turns
//! a normalized analysis frame into a transcript. The call may do network I/O
//! (remote engines) or CPU-bound inference (local engines), so the pipeline
//! never invokes it directly on the connection task; every call goes through
//! the worker-pool dispatch boundary in `core::pipeline`.
//!
//! Engine selection happens once at startup: the local Whisper engine is
//! preferred when a model is configured and loadable, falling back to the
//! Deepgram API when a key is present. Engines are shared across all
//! connections and must be safe for concurrent invocation; adapters that wrap
//! non-concurrency-safe backends serialize access internally.

pub mod deepgram;
#[cfg(feature = "whisper")]
pub mod whisper;

pub use deepgram::{DeepgramConfig, DeepgramStt};
#[cfg(feature = "whisper")]
pub use whisper::{WhisperConfig, WhisperStt};

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::EngineError;

/// Mean absolute amplitude below which an adapter may treat a frame as
/// silence and skip the underlying engine. This is a per-adapter cost
/// optimization, not a pipeline invariant.
pub const SILENCE_EPSILON: f32 = 0.001;

/// Capability interface for speech-to-text engines.
pub trait SpeechToText: Send + Sync {
    /// Transcribe one analysis frame of normalized `[-1.0, 1.0]` samples.
    ///
    /// Blocking; may take hundreds of milliseconds. Implementations return
    /// `EngineError::InvalidInput` for an empty frame, and degrade
    /// per-invocation engine failures to an empty transcript rather than
    /// propagating them, so one failed call costs a frame of detection, not
    /// the connection.
    fn transcribe(&self, frame: &[f32]) -> Result<String, EngineError>;

    /// Short engine identifier for logs and health reporting.
    fn engine_name(&self) -> &'static str;
}

/// Reject frames that violate the transcribe precondition.
pub(crate) fn validate_frame(frame: &[f32]) -> Result<(), EngineError> {
    if frame.is_empty() {
        return Err(EngineError::InvalidInput(
            "audio frame must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Select an STT engine by availability.
///
/// Order: local Whisper model, then Deepgram API. Returns `None` when neither
/// backend is configured or loadable; the HTTP API still serves in that case
/// and audio connections are rejected with an error status.
pub fn select_engine(config: &ServerConfig) -> Option<Arc<dyn SpeechToText>> {
    #[cfg(feature = "whisper")]
    if let Some(model_path) = &config.whisper_model_path {
        match WhisperStt::new(WhisperConfig {
            model_path: model_path.clone(),
            language: config.stt_language.clone(),
            threads: None,
        }) {
            Ok(engine) => {
                info!("STT engine ready: {} ({})", engine.engine_name(), model_path.display());
                return Some(Arc::new(engine));
            }
            Err(e) => {
                warn!("Local Whisper engine unavailable, trying fallback: {e}");
            }
        }
    }

    if let Some(api_key) = &config.deepgram_api_key {
        match DeepgramStt::new(DeepgramConfig {
            api_key: api_key.clone(),
            language: config.stt_language.clone(),
            model: config.deepgram_model.clone(),
            sample_rate: config.sample_rate,
            request_timeout: config.engine_timeout(),
        }) {
            Ok(engine) => {
                info!("STT engine ready: {}", engine.engine_name());
                return Some(Arc::new(engine));
            }
            Err(e) => {
                warn!("Deepgram engine unavailable: {e}");
            }
        }
    }

    warn!("No speech-to-text engine available; audio connections will be rejected");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_frame_rejects_empty() {
        assert!(matches!(
            validate_frame(&[]),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(validate_frame(&[0.0]).is_ok());
    }
}
