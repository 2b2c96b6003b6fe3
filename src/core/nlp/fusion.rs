//! Decision fusion for keyword and classifier signals
//!
//! Keyword hits come from a curated, high-precision denylist and are treated
//! as ground truth: any hit yields a harmful verdict at full confidence, even
//! when the classifier disagrees. The classifier only adds recall when the
//! keywords are silent. This precision-over-recall bias is part of the public
//! contract and must not drift.

use super::classifier::ClassificationResult;

/// Combine keyword hits and an optional classifier result into one verdict.
///
/// Returns `(is_harmful, confidence)`:
/// 1. any keyword hit => `(true, 1.0)`, classifier output ignored;
/// 2. otherwise, with a classifier result => its verdict and confidence;
/// 3. otherwise => `(false, 0.0)`.
pub fn fuse(keyword_hits: &[String], classifier: Option<&ClassificationResult>) -> (bool, f32) {
    if !keyword_hits.is_empty() {
        return (true, 1.0);
    }

    match classifier {
        Some(result) => (result.is_harmful, result.confidence),
        None => (false, 0.0),
    }
}
