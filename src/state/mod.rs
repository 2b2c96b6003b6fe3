use std::sync::Arc;

use crate::config::ServerConfig;
use crate::config::keywords::load_keywords;
use crate::core::nlp::HarmfulTextClassifier;
use crate::core::stt::{self, SpeechToText};

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Selected transcription engine; `None` when no backend could start
    pub stt: Option<Arc<dyn SpeechToText>>,
    /// Optional harmful-text classifier
    pub classifier: Option<Arc<dyn HarmfulTextClassifier>>,
    /// Keyword denylist, loaded once at startup
    pub keywords: Arc<Vec<String>>,
}

impl AppState {
    /// Initialize shared state: load the denylist, select a transcription
    /// engine and try to load the classifier. Engine and classifier failures
    /// degrade capabilities instead of aborting startup.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let keywords = Arc::new(load_keywords(&config.keywords_path));
        let stt = stt::select_engine(&config);
        let classifier = build_classifier(&config);

        Arc::new(Self {
            config,
            stt,
            classifier,
            keywords,
        })
    }

    /// Build state around preconstructed engines, bypassing resource loading.
    pub fn with_engines(
        config: ServerConfig,
        stt: Option<Arc<dyn SpeechToText>>,
        classifier: Option<Arc<dyn HarmfulTextClassifier>>,
        keywords: Vec<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            stt,
            classifier,
            keywords: Arc::new(keywords),
        })
    }
}

#[cfg(feature = "classifier")]
fn build_classifier(config: &ServerConfig) -> Option<Arc<dyn HarmfulTextClassifier>> {
    use crate::core::nlp::classifier::{OnnxClassifierConfig, OnnxTextClassifier};

    let classifier_config = OnnxClassifierConfig {
        model_path: config.classifier_model_path.clone(),
        tokenizer_path: config.classifier_tokenizer_path.clone(),
        ..OnnxClassifierConfig::default()
    };

    match OnnxTextClassifier::new(classifier_config) {
        Ok(classifier) => Some(Arc::new(classifier)),
        Err(e) => {
            tracing::warn!("Classifier unavailable, keyword matching only: {e}");
            None
        }
    }
}

#[cfg(not(feature = "classifier"))]
fn build_classifier(_config: &ServerConfig) -> Option<Arc<dyn HarmfulTextClassifier>> {
    None
}
