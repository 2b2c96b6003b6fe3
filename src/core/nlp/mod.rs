//! Transcript analysis: keyword matching, classification, decision fusion

pub mod classifier;
pub mod fusion;
pub mod keywords;

pub use classifier::{ClassificationResult, HarmfulTextClassifier};
