//! Server configuration
//!
//! Loaded once at startup from environment variables (with a `.env` file via
//! dotenvy when present) and shared read-only through the application state.

pub mod keywords;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PCM16 sample rate of inbound audio in Hz
    pub sample_rate: u32,
    /// Analysis frame duration in seconds
    pub chunk_duration_sec: f64,
    /// Timeout applied to each blocking engine invocation, in seconds
    pub engine_timeout_secs: u64,
    /// Language hint passed to transcription backends
    pub stt_language: String,
    /// Deepgram API key (enables the Deepgram transcription backend)
    pub deepgram_api_key: Option<String>,
    /// Deepgram model name
    pub deepgram_model: String,
    /// Path to a local Whisper model file (enables the local backend)
    pub whisper_model_path: Option<PathBuf>,
    /// Path to the ONNX harmful-text classification model
    pub classifier_model_path: PathBuf,
    /// Path to the classifier's tokenizer.json
    pub classifier_tokenizer_path: PathBuf,
    /// Path to the keyword denylist file
    pub keywords_path: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from .env file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if a numeric variable is malformed or outside its
    /// valid range.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;

        // Audio configuration
        let sample_rate = env::var("SAMPLE_RATE")
            .unwrap_or_else(|_| "16000".to_string())
            .parse::<u32>()
            .map_err(|e| format!("Invalid sample rate: {e}"))?;
        if sample_rate == 0 {
            return Err("Sample rate must be positive".into());
        }

        let chunk_duration_sec = env::var("CHUNK_DURATION_SEC")
            .unwrap_or_else(|_| "1.0".to_string())
            .parse::<f64>()
            .map_err(|e| format!("Invalid chunk duration: {e}"))?;
        if !chunk_duration_sec.is_finite() || chunk_duration_sec <= 0.0 {
            return Err("Chunk duration must be a positive number of seconds".into());
        }

        let engine_timeout_secs = env::var("ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3);

        // Transcription backends
        let stt_language = env::var("STT_LANGUAGE").unwrap_or_else(|_| "ko".to_string());
        let deepgram_api_key = env::var("DEEPGRAM_API_KEY").ok();
        let deepgram_model = env::var("DEEPGRAM_MODEL").unwrap_or_else(|_| "nova-2".to_string());
        let whisper_model_path = env::var("WHISPER_MODEL_PATH").ok().map(PathBuf::from);

        // Classifier and keyword resources
        let classifier_model_path = env::var("CLASSIFIER_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models/classifier.onnx"));
        let classifier_tokenizer_path = env::var("CLASSIFIER_TOKENIZER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models/tokenizer.json"));
        let keywords_path = env::var("KEYWORDS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/keywords.json"));

        Ok(ServerConfig {
            host,
            port,
            sample_rate,
            chunk_duration_sec,
            engine_timeout_secs,
            stt_language,
            deepgram_api_key,
            deepgram_model,
            whisper_model_path,
            classifier_model_path,
            classifier_tokenizer_path,
            keywords_path,
        })
    }

    /// Socket address string for binding the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-invocation engine timeout as a [`Duration`]
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn cleanup_env_vars() {
        unsafe {
            env::remove_var("HOST");
            env::remove_var("PORT");
            env::remove_var("SAMPLE_RATE");
            env::remove_var("CHUNK_DURATION_SEC");
            env::remove_var("ENGINE_TIMEOUT_SECS");
            env::remove_var("STT_LANGUAGE");
            env::remove_var("DEEPGRAM_API_KEY");
            env::remove_var("DEEPGRAM_MODEL");
            env::remove_var("WHISPER_MODEL_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        cleanup_env_vars();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.chunk_duration_sec, 1.0);
        assert_eq!(config.engine_timeout_secs, 3);
        assert_eq!(config.stt_language, "ko");
        assert_eq!(config.deepgram_model, "nova-2");
        assert_eq!(config.address(), "0.0.0.0:8000");
        assert_eq!(config.engine_timeout(), Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        cleanup_env_vars();
        unsafe {
            env::set_var("HOST", "127.0.0.1");
            env::set_var("PORT", "9000");
            env::set_var("SAMPLE_RATE", "8000");
            env::set_var("CHUNK_DURATION_SEC", "0.5");
            env::set_var("STT_LANGUAGE", "en");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.sample_rate, 8000);
        assert_eq!(config.chunk_duration_sec, 0.5);
        assert_eq!(config.stt_language, "en");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_port_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "not-a-port");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_zero_sample_rate_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("SAMPLE_RATE", "0");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_negative_chunk_duration_rejected() {
        cleanup_env_vars();
        unsafe {
            env::set_var("CHUNK_DURATION_SEC", "-1.0");
        }

        assert!(ServerConfig::from_env().is_err());

        cleanup_env_vars();
    }
}
