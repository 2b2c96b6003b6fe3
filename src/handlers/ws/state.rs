//! Per-connection WebSocket state

use std::sync::Arc;

use crate::core::pipeline::ConnectionPipeline;
use crate::core::stt::SpeechToText;
use crate::errors::EngineError;
use crate::state::AppState;

/// State owned by one WebSocket connection task.
///
/// The pipeline is exclusively owned here; chunks are processed one at a time
/// by the connection's receive loop, which gives the per-connection ordering
/// guarantee without extra locking.
pub struct ConnectionState {
    pub pipeline: ConnectionPipeline,
}

impl ConnectionState {
    /// Build connection state around the shared engines.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` when the configured audio
    /// parameters cannot form a valid frame.
    pub fn new(app_state: &AppState, stt: Arc<dyn SpeechToText>) -> Result<Self, EngineError> {
        let pipeline = ConnectionPipeline::new(
            stt,
            app_state.classifier.clone(),
            app_state.keywords.clone(),
            app_state.config.sample_rate,
            app_state.config.chunk_duration_sec,
            app_state.config.engine_timeout(),
        )?;

        Ok(Self { pipeline })
    }
}
