//! Error taxonomy for audio/text analysis engines
//!
//! Four classes with distinct recovery semantics:
//! - `InvalidConfiguration` is fatal and fails fast at construction time.
//! - `InvalidInput` fails the single operation; the caller may retry with
//!   corrected input.
//! - `Unavailable` means a backend is missing or misconfigured at startup and
//!   triggers the engine fallback chain.
//! - `Failure` is local to one invocation (error or timeout) and is recovered
//!   by substituting an empty/neutral result, never propagated to the
//!   connection.

use thiserror::Error;

/// Error type shared by the STT and classifier engine layers
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine failure: {0}")]
    Failure(String),
}
