//! Persisted sync configuration.
//!
//! The config handle is constructed explicitly (loaded once, passed by
//! reference); there is no lazily-initialized global. `last_sync_at` is
//! the freshness baseline for auto mode and advances only after a run
//! finishes with zero failed actions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::normalize::DEFAULT_SOURCE;

const CONFIG_FILE: &str = "config.json";

/// On-disk shape of the config file. All fields optional so older or
/// hand-edited files keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    github_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_sync_at: Option<String>,
}

/// Loaded sync configuration plus the directory it persists to.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    dir: PathBuf,
    /// Fallback source for legacy bare-name skill entries.
    pub default_source: String,
    /// Id of the backup gist, once known.
    pub gist_id: Option<String>,
    /// Token fallback when the environment provides none.
    pub github_token: Option<String>,
    /// Timestamp of the last fully-clean sync run.
    pub last_sync_at: Option<String>,
}

impl SyncConfig {
    /// Fresh defaults rooted at `dir`, without touching the filesystem.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_source: DEFAULT_SOURCE.to_string(),
            gist_id: None,
            github_token: None,
            last_sync_at: None,
        }
    }

    /// Load configuration from `dir`, falling back to defaults when no
    /// config file exists yet. A present-but-corrupt file is an error,
    /// since silently resetting it would lose the gist id and sync baseline.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::new(dir));
        }
        let content = std::fs::read_to_string(&path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            default_source: file
                .default_source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            gist_id: file.gist_id,
            github_token: file.github_token,
            last_sync_at: file.last_sync_at,
        })
    }

    /// Persist the configuration, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let file = ConfigFile {
            default_source: if self.default_source == DEFAULT_SOURCE {
                None
            } else {
                Some(self.default_source.clone())
            },
            gist_id: self.gist_id.clone(),
            github_token: self.github_token.clone(),
            last_sync_at: self.last_sync_at.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(self.path(), content)?;
        Ok(())
    }

    /// Path of the backing config file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Default config directory: `~/.skillsync`, or the working directory
    /// when no home is known.
    #[must_use]
    pub fn default_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map_or_else(|| PathBuf::from(".skillsync"), |home| home.join(".skillsync"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = SyncConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_source, DEFAULT_SOURCE);
        assert!(config.gist_id.is_none());
        assert!(config.github_token.is_none());
        assert!(config.last_sync_at.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let mut config = SyncConfig::new(dir.path());
        config.gist_id = Some("abc123".to_string());
        config.last_sync_at = Some("2026-01-02T00:00:00Z".to_string());
        config.save().unwrap();

        let loaded = SyncConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.gist_id.as_deref(), Some("abc123"));
        assert_eq!(loaded.last_sync_at.as_deref(), Some("2026-01-02T00:00:00Z"));
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("deep/config");
        let config = SyncConfig::new(&nested);
        config.save().unwrap();
        assert!(nested.join(CONFIG_FILE).is_file());
    }

    #[test]
    fn load_tolerates_partial_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"gist_id":"abc123"}"#).unwrap();
        let config = SyncConfig::load(dir.path()).unwrap();
        assert_eq!(config.gist_id.as_deref(), Some("abc123"));
        assert_eq!(config.default_source, DEFAULT_SOURCE);
    }

    #[test]
    fn load_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").unwrap();
        assert!(SyncConfig::load(dir.path()).is_err());
    }

    #[test]
    fn custom_default_source_round_trips() {
        let dir = tempdir().unwrap();
        let mut config = SyncConfig::new(dir.path());
        config.default_source = "custom/repo".to_string();
        config.save().unwrap();
        let loaded = SyncConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.default_source, "custom/repo");
    }
}
