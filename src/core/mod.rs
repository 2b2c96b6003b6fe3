pub mod audio;
pub mod nlp;
pub mod pipeline;
pub mod stt;

// Re-export commonly used types for convenience
pub use audio::FrameAccumulator;
pub use nlp::{ClassificationResult, HarmfulTextClassifier};
pub use pipeline::{ChunkOutcome, ConnectionPipeline, PipelineError, PipelineOutput, PipelineState};
pub use stt::SpeechToText;
