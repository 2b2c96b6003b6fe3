//! Harmful-text classification
//!
//! The classifier is an optional capability: when absent, decision fusion
//! degrades to keyword-only verdicts. The bundled adapter runs an ONNX
//! sequence-classification model (label 0 = clean, label 1 = harmful)
//! exported from a KoELECTRA-style checkpoint.

use crate::errors::EngineError;

/// A classifier's verdict on exactly the text it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub is_harmful: bool,
    /// Probability mass of the predicted class, in `[0, 1]`.
    pub confidence: f32,
    pub text: String,
}

impl ClassificationResult {
    /// The fixed result for empty input: not harmful, zero confidence.
    pub fn neutral() -> Self {
        Self {
            is_harmful: false,
            confidence: 0.0,
            text: String::new(),
        }
    }
}

/// Capability interface for harmful-text classifiers.
pub trait HarmfulTextClassifier: Send + Sync {
    /// Classify one transcript.
    ///
    /// Blocking; may run CPU-bound inference, so callers dispatch through the
    /// worker pool. Empty or whitespace-only text must yield
    /// [`ClassificationResult::neutral`] without invoking the model.
    fn predict(&self, text: &str) -> Result<ClassificationResult, EngineError>;
}

/// Softmax over raw logits.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

#[cfg(feature = "classifier")]
pub use onnx::{OnnxClassifierConfig, OnnxTextClassifier};

#[cfg(feature = "classifier")]
mod onnx {
    use std::borrow::Cow;
    use std::path::PathBuf;

    use ort::{
        execution_providers::CPUExecutionProvider,
        session::{
            Session, SessionInputValue, SessionInputs,
            builder::{GraphOptimizationLevel, SessionBuilder},
        },
        value::{Tensor, Value},
    };
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::info;

    use super::*;

    /// Index of the "harmful" class in the model's output logits.
    const HARMFUL_LABEL: usize = 1;

    /// ONNX classifier configuration
    #[derive(Debug, Clone)]
    pub struct OnnxClassifierConfig {
        /// Path to the exported sequence-classification model
        pub model_path: PathBuf,
        /// Path to the matching tokenizer.json
        pub tokenizer_path: PathBuf,
        /// Token truncation length
        pub max_length: usize,
    }

    impl Default for OnnxClassifierConfig {
        fn default() -> Self {
            Self {
                model_path: PathBuf::from("models/classifier.onnx"),
                tokenizer_path: PathBuf::from("models/tokenizer.json"),
                max_length: 256,
            }
        }
    }

    /// Harmful-text classifier backed by an ONNX runtime session.
    ///
    /// The session is not safe for concurrent runs, so it sits behind a
    /// mutex; worker-pool callers serialize on it transparently.
    pub struct OnnxTextClassifier {
        session: Mutex<Session>,
        tokenizer: Tokenizer,
        max_length: usize,
    }

    impl OnnxTextClassifier {
        /// Load the tokenizer and model.
        ///
        /// # Errors
        /// Returns `EngineError::Unavailable` if either file is missing or
        /// fails to load.
        pub fn new(config: OnnxClassifierConfig) -> Result<Self, EngineError> {
            let tokenizer = Tokenizer::from_file(&config.tokenizer_path).map_err(|e| {
                EngineError::Unavailable(format!(
                    "failed to load tokenizer from {}: {e}",
                    config.tokenizer_path.display()
                ))
            })?;

            let session = SessionBuilder::new()
                .map_err(|e| {
                    EngineError::Unavailable(format!("failed to create session builder: {e}"))
                })?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| {
                    EngineError::Unavailable(format!("failed to set optimization level: {e}"))
                })?
                .with_execution_providers(vec![CPUExecutionProvider::default().build()])
                .map_err(|e| {
                    EngineError::Unavailable(format!("failed to set execution providers: {e}"))
                })?
                .commit_from_file(&config.model_path)
                .map_err(|e| {
                    EngineError::Unavailable(format!(
                        "failed to load ONNX model from {}: {e}",
                        config.model_path.display()
                    ))
                })?;

            info!(
                "Classifier model loaded from {}",
                config.model_path.display()
            );

            Ok(Self {
                session: Mutex::new(session),
                tokenizer,
                max_length: config.max_length,
            })
        }

        fn run_inference(&self, text: &str) -> Result<Vec<f32>, EngineError> {
            let encoding = self
                .tokenizer
                .encode(text, true)
                .map_err(|e| EngineError::Failure(format!("tokenization failed: {e}")))?;

            let mut input_ids: Vec<i64> =
                encoding.get_ids().iter().map(|&id| id as i64).collect();
            let mut attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            input_ids.truncate(self.max_length);
            attention_mask.truncate(self.max_length);
            let seq_len = input_ids.len();

            let ids_tensor = Tensor::from_array(([1, seq_len], input_ids))
                .map_err(|e| EngineError::Failure(format!("failed to create input tensor: {e}")))?;
            let mask_tensor = Tensor::from_array(([1, seq_len], attention_mask))
                .map_err(|e| EngineError::Failure(format!("failed to create mask tensor: {e}")))?;

            let inputs: Vec<(Cow<'static, str>, SessionInputValue<'static>)> = vec![
                (
                    Cow::Borrowed("input_ids"),
                    SessionInputValue::Owned(Value::from(ids_tensor)),
                ),
                (
                    Cow::Borrowed("attention_mask"),
                    SessionInputValue::Owned(Value::from(mask_tensor)),
                ),
            ];

            let mut session = self.session.lock();
            let outputs = session
                .run(SessionInputs::from(inputs))
                .map_err(|e| EngineError::Failure(format!("inference failed: {e}")))?;

            let (_shape, logits) = outputs["logits"]
                .try_extract_tensor::<f32>()
                .map_err(|e| EngineError::Failure(format!("failed to extract logits: {e}")))?;

            Ok(logits.to_vec())
        }
    }

    impl HarmfulTextClassifier for OnnxTextClassifier {
        fn predict(&self, text: &str) -> Result<ClassificationResult, EngineError> {
            if text.trim().is_empty() {
                return Ok(ClassificationResult::neutral());
            }

            let logits = self.run_inference(text)?;
            if logits.len() < 2 {
                return Err(EngineError::Failure(format!(
                    "expected 2 class logits, got {}",
                    logits.len()
                )));
            }

            let probs = softmax(&logits);
            let (predicted, confidence) = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, &p)| (i, p))
                .unwrap_or((0, 0.0));

            Ok(ClassificationResult {
                is_harmful: predicted == HARMFUL_LABEL,
                confidence,
                text: text.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_result() {
        let neutral = ClassificationResult::neutral();
        assert!(!neutral.is_harmful);
        assert_eq!(neutral.confidence, 0.0);
        assert_eq!(neutral.text, "");
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = softmax(&[0.0, 1.0]);
        let b = softmax(&[100.0, 101.0]);
        assert!((a[0] - b[0]).abs() < 1e-6);
        assert!((a[1] - b[1]).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 0.0]);
        assert!((probs[0] - 1.0).abs() < 1e-6);
        assert!(probs[1] < 1e-6);
    }
}
