//! HTTP API handlers
//!
//! Text analysis over HTTP shares the keyword matcher, classifier and fusion
//! policy with the streaming pipeline, so a transcript produces the same
//! verdict whichever door it comes in through.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task;
use tokio::time::timeout;
use tracing::warn;

use crate::core::nlp::{ClassificationResult, fusion, keywords};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound on analyzed text length, in characters. Transcripts of
/// one-second frames are tiny; anything near this size is not speech.
const MAX_ANALYZE_TEXT_CHARS: usize = 10_000;

/// Root handler
/// Identifies the service and maps its endpoints
pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "speechguard",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "websocket": "/ws/audio",
            "health": "/health",
            "keywords": "/keywords",
            "analyze": "/analyze",
            "test": "/test"
        }
    }))
}

/// Health check handler
/// Reports which capabilities are loaded alongside the basic status
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK",
        "keywords_loaded": state.keywords.len(),
        "stt_loaded": state.stt.is_some(),
        "classifier_loaded": state.classifier.is_some(),
    })))
}

/// Keyword listing handler
pub async fn list_keywords(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "total": state.keywords.len(),
        "keywords": *state.keywords,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub has_violation: bool,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    /// Which signal decided: "keyword", "classifier" or "no_text"
    pub method: String,
    /// Wall-clock processing time in milliseconds
    pub processing_time: f64,
}

/// Text analysis handler (POST body)
pub async fn analyze_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    check_text_length(&request.text)?;
    Ok(Json(analyze(&state, &request.text).await))
}

#[derive(Debug, Deserialize)]
pub struct TestQuery {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    pub text: String,
    pub has_violation: bool,
    pub matched_keywords: Vec<String>,
}

/// Text analysis handler (GET query), for quick manual checks
pub async fn test_text(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TestQuery>,
) -> AppResult<Json<TestResponse>> {
    check_text_length(&query.text)?;
    let result = analyze(&state, &query.text).await;
    Ok(Json(TestResponse {
        text: query.text,
        has_violation: result.has_violation,
        matched_keywords: result.matched_keywords,
    }))
}

fn check_text_length(text: &str) -> AppResult<()> {
    if text.chars().count() > MAX_ANALYZE_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "text exceeds {MAX_ANALYZE_TEXT_CHARS} characters"
        )));
    }
    Ok(())
}

async fn analyze(state: &AppState, text: &str) -> AnalyzeResponse {
    let started = Instant::now();
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return AnalyzeResponse {
            has_violation: false,
            confidence: 0.0,
            matched_keywords: Vec::new(),
            method: "no_text".to_string(),
            processing_time: started.elapsed().as_secs_f64() * 1000.0,
        };
    }

    let matched = keywords::find_matches(trimmed, &state.keywords);
    let classifier_result = run_classifier(state, trimmed).await;

    // `method` names the signal that decided; keyword matching decides both
    // on a hit and when no classifier ran.
    let method = if matched.is_empty() && classifier_result.is_some() {
        "classifier"
    } else {
        "keyword"
    };
    let (has_violation, confidence) = fusion::fuse(&matched, classifier_result.as_ref());

    AnalyzeResponse {
        has_violation,
        confidence,
        matched_keywords: matched,
        method: method.to_string(),
        processing_time: started.elapsed().as_secs_f64() * 1000.0,
    }
}

async fn run_classifier(state: &AppState, text: &str) -> Option<ClassificationResult> {
    let classifier = state.classifier.clone()?;
    let input = text.to_string();
    let dispatch = task::spawn_blocking(move || classifier.predict(&input));

    match timeout(state.config.engine_timeout(), dispatch).await {
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
            warn!("Classification timed out");
            None
        }
    }
}
