//! WebSocket message types
//!
//! All outgoing messages are JSON objects discriminated by a `status` field.
//! There are no structured incoming messages: clients send raw binary audio.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::pipeline::PipelineOutput;

/// Outgoing WebSocket messages, tagged by `status`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum OutgoingMessage {
    /// Analysis result for one completed audio frame
    #[serde(rename = "ok")]
    Ok {
        /// Transcript of the frame (possibly empty)
        text: String,
        /// 1 when the frame was judged harmful, 0 otherwise
        is_harmful: u8,
        confidence: f32,
        /// The exact text the classifier saw (empty when it was skipped)
        raw_text: String,
        audio_duration_sec: f64,
        processing_time_ms: f64,
        /// Unix timestamp in milliseconds at emission time
        timestamp: u64,
    },
    /// Audio buffered without completing a frame
    #[serde(rename = "buffering")]
    Buffering {
        /// Cumulative bytes received on this connection
        size: usize,
    },
    #[serde(rename = "error")]
    Error { detail: String },
}

impl OutgoingMessage {
    /// Wrap a pipeline output for the wire.
    pub fn from_output(output: PipelineOutput) -> Self {
        Self::Ok {
            text: output.text,
            is_harmful: u8::from(output.is_harmful),
            confidence: output.confidence,
            raw_text: output.raw_classifier_text,
            audio_duration_sec: output.audio_duration_sec,
            processing_time_ms: output.processing_time_ms,
            timestamp: unix_millis(),
        }
    }
}

/// Current Unix time in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
