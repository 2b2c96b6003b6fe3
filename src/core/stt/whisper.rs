//! Local Whisper STT adapter
//!
//! Wraps whisper-rs (whisper.cpp bindings) behind the [`SpeechToText`] trait.
//! The `WhisperContext` is not safe for concurrent inference, so it sits
//! behind a mutex; the worker pool serializes on it transparently.
//!
//! # Feature Gate
//!
//! Requires the `whisper` feature (and cmake at build time):
//!
//! ```bash
//! cargo build --features whisper
//! ```

use std::path::PathBuf;
use std::sync::Once;

use parking_lot::Mutex;
use tracing::{info, warn};
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

use crate::errors::EngineError;

use super::{SpeechToText, validate_frame};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Whisper adapter configuration
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// Path to a ggml model file
    pub model_path: PathBuf,
    /// Language code (e.g. "ko", "en")
    pub language: String,
    /// Inference threads (None = whisper.cpp default)
    pub threads: Option<usize>,
}

/// Local STT engine backed by whisper.cpp.
pub struct WhisperStt {
    context: Mutex<WhisperContext>,
    config: WhisperConfig,
}

impl WhisperStt {
    /// Load the model and create the adapter.
    ///
    /// # Errors
    /// Returns `EngineError::Unavailable` if the model file is missing or
    /// fails to load.
    pub fn new(config: WhisperConfig) -> Result<Self, EngineError> {
        // Suppress whisper.cpp's own stderr chatter (once per process).
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        if !config.model_path.exists() {
            return Err(EngineError::Unavailable(format!(
                "Whisper model not found at {}",
                config.model_path.display()
            )));
        }

        let model_path = config.model_path.to_str().ok_or_else(|| {
            EngineError::InvalidConfiguration("invalid UTF-8 in model path".to_string())
        })?;

        info!("Loading Whisper model: {}", config.model_path.display());
        let context =
            WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                .map_err(|e| {
                    EngineError::Unavailable(format!("failed to load Whisper model: {e}"))
                })?;

        Ok(Self {
            context: Mutex::new(context),
            config,
        })
    }

    fn run_inference(&self, frame: &[f32]) -> Result<String, EngineError> {
        let context = self.context.lock();

        let mut state = context
            .create_state()
            .map_err(|e| EngineError::Failure(format!("failed to create Whisper state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.config.language));
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, frame)
            .map_err(|e| EngineError::Failure(format!("Whisper inference failed: {e}")))?;

        let mut transcript = String::new();
        for segment in state.as_iter() {
            transcript.push_str(&segment.to_string());
        }

        Ok(transcript.trim().to_string())
    }
}

impl SpeechToText for WhisperStt {
    fn transcribe(&self, frame: &[f32]) -> Result<String, EngineError> {
        validate_frame(frame)?;

        // No silence gate here: local inference is cheap enough to run on
        // every frame, and Whisper's own no-speech detection handles quiet
        // audio.
        match self.run_inference(frame) {
            Ok(transcript) => Ok(transcript),
            Err(e) => {
                warn!("Whisper transcription failed: {e}");
                Ok(String::new())
            }
        }
    }

    fn engine_name(&self) -> &'static str {
        "whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_unavailable() {
        let result = WhisperStt::new(WhisperConfig {
            model_path: PathBuf::from("/nonexistent/ggml-base.bin"),
            language: "ko".to_string(),
            threads: None,
        });
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }
}
