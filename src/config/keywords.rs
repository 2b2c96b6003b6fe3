//! Keyword denylist loading
//!
//! The denylist lives in a small JSON file so operators can edit it without a
//! rebuild. A missing or unreadable file falls back to the built-in default
//! list, and a missing file is written back so the operator has something to
//! edit next time.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// On-disk denylist format
#[derive(Debug, Serialize, Deserialize)]
pub struct KeywordFile {
    pub keywords: Vec<String>,
    pub version: String,
    pub updated_at: String,
}

/// Built-in denylist used when no keyword file exists.
pub fn default_keywords() -> Vec<String> {
    [
        "욕설", "비방", "혐오", "ㅅㅂ", "ㅂㅅ", "시발", "씨발", "개새", "ㄱㅅㄲ", "병신", "ㅄ",
        "fuck", "shit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Load the denylist from `path`, falling back to the default list.
///
/// A well-formed file wins even when empty. When the file is missing, the
/// default list is written back to `path`; a write failure only logs since
/// the in-memory list is already usable.
pub fn load_keywords(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<KeywordFile>(&contents) {
            Ok(file) => {
                info!(
                    "Loaded {} keywords from {} (version {})",
                    file.keywords.len(),
                    path.display(),
                    file.version
                );
                file.keywords
            }
            Err(e) => {
                warn!(
                    "Malformed keyword file {}: {e}; using default keywords",
                    path.display()
                );
                default_keywords()
            }
        },
        Err(_) => {
            let keywords = default_keywords();
            if let Err(e) = write_default_file(path, &keywords) {
                warn!("Failed to write default keyword file {}: {e}", path.display());
            } else {
                info!("Wrote default keyword file to {}", path.display());
            }
            keywords
        }
    }
}

fn write_default_file(path: &Path, keywords: &[String]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = KeywordFile {
        keywords: keywords.to_vec(),
        version: "1.0".to_string(),
        updated_at: "2024-11-11".to_string(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_keywords_nonempty() {
        let keywords = default_keywords();
        assert!(keywords.contains(&"씨발".to_string()));
        assert!(keywords.contains(&"fuck".to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        fs::write(
            &path,
            r#"{"keywords":["foo","bar"],"version":"2.0","updated_at":"2025-01-01"}"#,
        )
        .unwrap();

        let keywords = load_keywords(&path);
        assert_eq!(keywords, vec!["foo", "bar"]);
    }

    #[test]
    fn test_empty_file_list_wins_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        fs::write(
            &path,
            r#"{"keywords":[],"version":"2.0","updated_at":"2025-01-01"}"#,
        )
        .unwrap();

        assert!(load_keywords(&path).is_empty());
    }

    #[test]
    fn test_missing_file_writes_defaults_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/keywords.json");

        let keywords = load_keywords(&path);
        assert_eq!(keywords, default_keywords());

        // The self-repair write should produce a loadable file.
        let reloaded: KeywordFile =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.keywords, keywords);
        assert_eq!(reloaded.version, "1.0");
    }

    #[test]
    fn test_malformed_file_falls_back_without_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keywords.json");
        fs::write(&path, "{ not json").unwrap();

        let keywords = load_keywords(&path);
        assert_eq!(keywords, default_keywords());
        // The operator's broken file is preserved for inspection.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
