//! HTTP and WebSocket request handlers
//!
//! This module organizes all API handlers into logical groups:
//! - `api` - Health check, keyword listing and text analysis endpoints
//! - `ws` - WebSocket streaming audio moderation

pub mod api;
pub mod ws;

// Re-export commonly used handlers for convenient access
pub use ws::ws_audio_handler;
