//! Per-connection audio analysis pipeline
//!
//! One pipeline exists per live connection and owns that connection's
//! [`FrameAccumulator`]. Each inbound audio message drives the state machine
//!
//! ```text
//! Buffering -> Transcribing -> Classifying -> Emitting -> Buffering ...
//! ```
//!
//! with a terminal `Closed` state on teardown. Chunks are processed strictly
//! in arrival order: the connection task awaits each `process_chunk` before
//! reading the next message, because the accumulator is not safe for
//! concurrent mutation and downstream consumers expect in-order results.
//!
//! The blocking STT and classifier calls are dispatched to the shared
//! blocking worker pool (`spawn_blocking`) wrapped in a timeout; that
//! dispatch is the only suspension point inside the pipeline. A timed-out or
//! failed invocation degrades to an empty/neutral result for this frame and
//! never terminates the connection. The aggregate per-chunk budget should
//! stay under a few seconds; the timeout is configurable per engine call.
//!
//! Contract for silent frames: every successfully extracted frame yields
//! exactly one [`PipelineOutput`]. A frame whose transcript is empty reports
//! a neutral verdict (`is_harmful=false`, `confidence=0.0`) rather than
//! being swallowed, so the caller's chunk accounting stays simple.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::core::audio::FrameAccumulator;
use crate::core::nlp::classifier::{ClassificationResult, HarmfulTextClassifier};
use crate::core::nlp::{fusion, keywords};
use crate::core::stt::SpeechToText;
use crate::errors::EngineError;

/// Pipeline state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Buffering,
    Transcribing,
    Classifying,
    Emitting,
    Closed,
}

/// Errors surfaced to the connection task
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline was closed; no further chunks are accepted.
    #[error("pipeline is closed")]
    Closed,
}

/// One analysis result per successfully extracted frame
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Transcript of the frame (possibly empty)
    pub text: String,
    pub is_harmful: bool,
    pub confidence: f32,
    /// The exact text the classifier saw (empty when it was skipped)
    pub raw_classifier_text: String,
    pub audio_duration_sec: f64,
    pub processing_time_ms: f64,
}

/// Outcome of feeding one inbound audio message to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// Not enough samples for a frame yet; carries cumulative bytes received.
    Buffering { bytes_received: usize },
    Output(PipelineOutput),
}

/// Sequences frame extraction, transcription and classification for one
/// connection.
pub struct ConnectionPipeline {
    accumulator: FrameAccumulator,
    stt: Arc<dyn SpeechToText>,
    classifier: Option<Arc<dyn HarmfulTextClassifier>>,
    denylist: Arc<Vec<String>>,
    op_timeout: Duration,
    state: PipelineState,
    bytes_received: usize,
}

impl ConnectionPipeline {
    /// Build a pipeline around shared engine instances.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidConfiguration` for a non-positive sample
    /// rate or chunk duration.
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        classifier: Option<Arc<dyn HarmfulTextClassifier>>,
        denylist: Arc<Vec<String>>,
        sample_rate: u32,
        chunk_duration_sec: f64,
        op_timeout: Duration,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            accumulator: FrameAccumulator::new(sample_rate, chunk_duration_sec)?,
            stt,
            classifier,
            denylist,
            op_timeout,
            state: PipelineState::Buffering,
            bytes_received: 0,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Feed one inbound audio message through the state machine.
    ///
    /// Empty input returns a buffering signal without mutating anything.
    /// Otherwise bytes are appended to the accumulator; if a full frame is
    /// ready it runs STT, keyword matching, optional classification and
    /// fusion, and returns one [`PipelineOutput`].
    ///
    /// # Errors
    /// Returns [`PipelineError::Closed`] after [`close`](Self::close).
    pub async fn process_chunk(&mut self, audio_bytes: &[u8]) -> Result<ChunkOutcome, PipelineError> {
        if self.state == PipelineState::Closed {
            return Err(PipelineError::Closed);
        }

        if audio_bytes.is_empty() {
            return Ok(ChunkOutcome::Buffering {
                bytes_received: self.bytes_received,
            });
        }

        self.bytes_received += audio_bytes.len();
        self.accumulator.append(audio_bytes);

        let Some(frame) = self.accumulator.extract_frame() else {
            return Ok(ChunkOutcome::Buffering {
                bytes_received: self.bytes_received,
            });
        };

        let audio_duration_sec = frame.len() as f64 / self.accumulator.sample_rate() as f64;
        debug!(
            "Processing audio frame: duration={audio_duration_sec:.2}s, samples={}",
            frame.len()
        );

        let started = Instant::now();

        self.state = PipelineState::Transcribing;
        let text = self.run_stt(frame).await;

        let output = if text.trim().is_empty() {
            PipelineOutput {
                text: String::new(),
                is_harmful: false,
                confidence: 0.0,
                raw_classifier_text: String::new(),
                audio_duration_sec,
                processing_time_ms: 0.0,
            }
        } else {
            self.state = PipelineState::Classifying;
            let matched = keywords::find_matches(&text, &self.denylist);
            if !matched.is_empty() {
                warn!("Keyword detected in audio: {matched:?} in {text:?}");
            }

            // The classifier always sees non-empty text; fusion decides
            // whether its verdict counts, but raw_text carries its analysis
            // either way.
            let classifier_result = self.run_classifier(&text).await;

            let (is_harmful, confidence) = fusion::fuse(&matched, classifier_result.as_ref());
            PipelineOutput {
                text: text.clone(),
                is_harmful,
                confidence,
                raw_classifier_text: classifier_result.map(|r| r.text).unwrap_or_default(),
                audio_duration_sec,
                processing_time_ms: 0.0,
            }
        };

        self.state = PipelineState::Emitting;
        let output = PipelineOutput {
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            ..output
        };
        self.state = PipelineState::Buffering;

        Ok(ChunkOutcome::Output(output))
    }

    /// Transition to `Closed` and discard buffered audio. In-flight worker
    /// dispatches are left to complete; their results are dropped by the
    /// caller.
    pub fn close(&mut self) {
        self.state = PipelineState::Closed;
        self.accumulator.reset();
    }

    async fn run_stt(&self, frame: Vec<f32>) -> String {
        let stt = self.stt.clone();
        let dispatch = task::spawn_blocking(move || stt.transcribe(&frame));

        match timeout(self.op_timeout, dispatch).await {
            Ok(Ok(Ok(text))) => text,
            Ok(Ok(Err(e))) => {
                warn!("Transcription failed: {e}");
                String::new()
            }
            Ok(Err(e)) => {
                warn!("Transcription worker task failed: {e}");
                String::new()
            }
            Err(_) => {
                warn!("Transcription timed out after {:?}", self.op_timeout);
                String::new()
            }
        }
    }

    async fn run_classifier(&self, text: &str) -> Option<ClassificationResult> {
        let classifier = self.classifier.clone()?;
        let input = text.to_string();
        let dispatch = task::spawn_blocking(move || classifier.predict(&input));

        match timeout(self.op_timeout, dispatch).await {
            Ok(Ok(Ok(result))) => Some(result),
            Ok(Ok(Err(e))) => {
                warn!("Classification failed: {e}");
                None
            }
            Ok(Err(e)) => {
                warn!("Classification worker task failed: {e}");
                None
            }
            Err(_) => {
                warn!("Classification timed out after {:?}", self.op_timeout);
                None
            }
        }
    }
}
