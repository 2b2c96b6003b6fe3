//! # WebSocket Audio Moderation Module
//!
//! This module provides the WebSocket interface for streaming audio
//! moderation. Clients stream raw PCM16 little-endian mono audio as binary
//! messages; the server buffers it into fixed-duration frames, transcribes
//! each frame and returns a harmfulness verdict per frame.
//!
//! ## WebSocket API
//!
//! ### Connection Flow
//! 1. Client connects to `/ws/audio`
//! 2. Server sends a plain-text `Connected` greeting
//! 3. Client streams binary PCM16 audio messages of any size
//! 4. Server replies with one JSON message per inbound audio message
//!
//! ### Message Types
//!
//! **Incoming Messages:**
//! - **Binary messages** - Raw PCM16 audio data (text messages are rejected)
//!
//! **Outgoing Messages:**
//! - `{"status": "buffering", "size": 16000}` - Audio buffered, no full frame
//!   yet (`size` is cumulative bytes received on this connection)
//! - `{"status": "ok", "text": "...", "is_harmful": 0, "confidence": 0.2,
//!   "raw_text": "...", "audio_duration_sec": 1.0, "processing_time_ms": 42.0,
//!   "timestamp": 1234567890123}` - Analysis result for one completed frame
//! - `{"status": "error", "detail": "..."}` - Protocol or capability error

pub mod audio_handler;
pub mod handler;
pub mod messages;
pub mod state;

pub use handler::ws_audio_handler;
pub use messages::OutgoingMessage;
