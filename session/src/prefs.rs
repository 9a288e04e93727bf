use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("cannot write preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// User preferences persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Re-render on every valid edit instead of waiting for an explicit
    /// apply.
    pub auto_apply: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { auto_apply: true }
    }
}

impl Preferences {
    /// Read stored preferences. A missing or unreadable file yields
    /// `fallback`.
    pub fn load(path: &Path, fallback: Preferences) -> Preferences {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return fallback,
            Err(e) => {
                tracing::warn!("graph_lens: cannot read {}: {}", path.display(), e);
                return fallback;
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(
                "graph_lens: ignoring corrupt preferences {}: {}",
                path.display(),
                e
            );
            fallback
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        tracing::debug!("graph_lens: preferences saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let fallback = Preferences { auto_apply: false };
        assert_eq!(Preferences::load(&path, fallback), fallback);
    }

    #[test]
    fn test_corrupt_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{auto_apply: maybe").unwrap();
        assert_eq!(
            Preferences::load(&path, Preferences::default()),
            Preferences::default()
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let prefs = Preferences { auto_apply: false };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path, Preferences::default()), prefs);
    }

    #[test]
    fn test_missing_key_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(Preferences::load(&path, Preferences { auto_apply: false }).auto_apply);
    }
}
