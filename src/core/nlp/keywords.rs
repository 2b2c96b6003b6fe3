//! Word-boundary keyword matching against a configured denylist
//!
//! A keyword matches when it occurs in the text bounded by a non-word
//! character or string boundary on both sides, or when it equals the entire
//! trimmed text (single-token utterances have no boundary characters to
//! anchor on). Boundary detection uses Unicode word characters, which is a
//! documented approximation for scripts without lexical word separators:
//! Hangul keywords separated by spaces or punctuation match, agglutinated
//! suffix forms do not.

use regex::Regex;
use tracing::warn;

/// Find denylist entries present in `text`.
///
/// Pure and stateless given `(text, denylist)`. Matching is
/// case-insensitive; results preserve denylist order and contain each entry
/// at most once regardless of how often it occurs. Empty or whitespace-only
/// text yields an empty result without scanning.
pub fn find_matches(text: &str, denylist: &[String]) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let text_lower = text.to_lowercase();
    let trimmed_lower = text.trim().to_lowercase();

    let mut matched = Vec::new();
    for keyword in denylist {
        let keyword_lower = keyword.to_lowercase();
        if keyword_lower.is_empty() {
            continue;
        }

        if trimmed_lower == keyword_lower {
            matched.push(keyword.clone());
            continue;
        }

        let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&keyword_lower));
        match Regex::new(&pattern) {
            Ok(re) => {
                if re.is_match(&text_lower) {
                    matched.push(keyword.clone());
                }
            }
            Err(e) => {
                warn!("Skipping unmatchable denylist entry {keyword:?}: {e}");
            }
        }
    }

    matched
}
