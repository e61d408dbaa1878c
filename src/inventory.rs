//! Local skill inventory via the external `skills` CLI.
//!
//! Listing prefers live CLI output (`skills list --json`) and falls back
//! to hydrating the lock file the CLI maintains on disk. Installs and
//! removals always go through the CLI; there is no direct filesystem
//! manipulation of the skill store here.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use crate::errors::{Result, SyncError};
use crate::models::{SkillInput, SkillRecord};
use crate::normalize::normalize;

/// Lock file the `skills` CLI writes next to its store.
pub const LOCK_FILENAME: &str = "skills-lock.json";

#[derive(Debug, Deserialize)]
struct SkillListDocument {
    #[serde(default)]
    skills: Vec<SkillInput>,
}

/// Client for the external `skills` CLI.
pub struct SkillsCli {
    /// Path to the binary (`None` = resolve `skills` from PATH).
    bin_path: Option<PathBuf>,
    /// Override for the lock file location.
    lock_path: Option<PathBuf>,
    /// Cached availability probe result.
    available: Option<bool>,
}

impl Default for SkillsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillsCli {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bin_path: None,
            lock_path: None,
            available: None,
        }
    }

    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self {
            bin_path: Some(path),
            lock_path: None,
            available: None,
        }
    }

    #[must_use]
    pub fn with_lock_path(mut self, path: PathBuf) -> Self {
        self.lock_path = Some(path);
        self
    }

    #[must_use]
    pub fn bin_path(&self) -> &str {
        self.bin_path
            .as_ref()
            .map_or("skills", |p| p.to_str().unwrap_or("skills"))
    }

    /// Check whether the `skills` binary responds; probed once, cached.
    pub fn is_available(&mut self) -> bool {
        if let Some(available) = self.available {
            return available;
        }
        let result = Command::new(self.bin_path())
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        self.available = Some(result);
        result
    }

    /// List the installed skills as normalized records.
    ///
    /// CLI first, lock file second; when neither yields anything the
    /// collection is empty, not an error: a machine with no skills
    /// installed is a valid sync participant.
    pub fn list(&mut self, default_source: &str) -> Result<Vec<SkillRecord>> {
        if self.is_available() {
            if let Some(records) = self.list_from_cli(default_source) {
                return Ok(records);
            }
        }
        Ok(self
            .hydrate_lock_file(default_source)
            .unwrap_or_default())
    }

    fn list_from_cli(&self, default_source: &str) -> Option<Vec<SkillRecord>> {
        let output = Command::new(self.bin_path())
            .args(["list", "--json"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let inputs = parse_skill_list(&stdout)?;
        Some(normalize(&inputs, default_source))
    }

    /// Read records from the lock file, if one exists and parses.
    pub fn hydrate_lock_file(&self, default_source: &str) -> Option<Vec<SkillRecord>> {
        let path = self
            .lock_path
            .clone()
            .unwrap_or_else(default_lock_path);
        let content = std::fs::read_to_string(path).ok()?;
        let inputs = parse_skill_list(&content)?;
        Some(normalize(&inputs, default_source))
    }

    /// Install a skill: `skills add <source> --skill <name> --yes`.
    pub fn install(&mut self, record: &SkillRecord) -> Result<()> {
        self.run_action(
            &[
                "add",
                record.source.as_str(),
                "--skill",
                record.name.as_str(),
                "--yes",
            ],
            "add",
            record,
        )
    }

    /// Remove a skill: `skills remove <name> --yes`.
    pub fn remove(&mut self, record: &SkillRecord) -> Result<()> {
        self.run_action(&["remove", record.name.as_str(), "--yes"], "remove", record)
    }

    fn run_action(&mut self, args: &[&str], verb: &str, record: &SkillRecord) -> Result<()> {
        if !self.is_available() {
            return Err(SyncError::Inventory {
                message: format!(
                    "skills CLI '{}' is not available; cannot {verb} {record}",
                    self.bin_path()
                ),
            });
        }
        let output = Command::new(self.bin_path())
            .args(args)
            .output()
            .map_err(|error| SyncError::Inventory {
                message: format!("failed to execute skills {verb}: {error}"),
            })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("exit code {}", output.status.code().unwrap_or(-1))
        } else {
            stderr.trim().to_string()
        };
        Err(SyncError::Inventory {
            message: format!("skills {verb} {record} failed: {detail}"),
        })
    }
}

/// Parse a skill list document: either `{"skills": [...]}` or a bare
/// top-level array. Returns `None` when neither shape matches.
fn parse_skill_list(content: &str) -> Option<Vec<SkillInput>> {
    if let Ok(document) = serde_json::from_str::<SkillListDocument>(content) {
        return Some(document.skills);
    }
    serde_json::from_str::<Vec<SkillInput>>(content).ok()
}

/// Default lock file location: `~/.skills/skills-lock.json`.
#[must_use]
pub fn default_lock_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map_or_else(|| PathBuf::from(".skills"), |home| home.join(".skills"))
        .join(LOCK_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DEFAULT_SOURCE;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_lock(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(LOCK_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn default_bin_path() {
        let cli = SkillsCli::new();
        assert_eq!(cli.bin_path(), "skills");
    }

    #[test]
    fn explicit_bin_path() {
        let cli = SkillsCli::with_path(PathBuf::from("/usr/local/bin/skills"));
        assert_eq!(cli.bin_path(), "/usr/local/bin/skills");
    }

    #[test]
    fn missing_binary_probes_unavailable() {
        let mut cli = SkillsCli::with_path(PathBuf::from("/nonexistent/skills"));
        assert!(!cli.is_available());
        // Cached result, second call does not re-probe.
        assert!(!cli.is_available());
    }

    #[test]
    fn install_without_binary_is_an_inventory_error() {
        let mut cli = SkillsCli::with_path(PathBuf::from("/nonexistent/skills"));
        let record = SkillRecord::new("alpha", "org/repo");
        let err = cli.install(&record).unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn parse_skill_list_wrapped_document() {
        let inputs =
            parse_skill_list(r#"{"skills":["alpha",{"name":"beta","source":"org/repo"}]}"#)
                .unwrap();
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn parse_skill_list_bare_array() {
        let inputs = parse_skill_list(r#"[{"name":"alpha","source":"org/repo"}]"#).unwrap();
        assert_eq!(inputs.len(), 1);
    }

    #[test]
    fn parse_skill_list_rejects_garbage() {
        assert!(parse_skill_list("no skills found").is_none());
    }

    #[test]
    fn hydrate_lock_file_reads_records() {
        let dir = tempdir().unwrap();
        let path = write_lock(
            dir.path(),
            r#"{"skills":[{"name":"alpha","source":"org/repo"},"beta"]}"#,
        );
        let cli = SkillsCli::new().with_lock_path(path);
        let records = cli.hydrate_lock_file(DEFAULT_SOURCE).unwrap();
        assert_eq!(
            records,
            vec![
                SkillRecord::new("alpha", "org/repo"),
                SkillRecord::new("beta", DEFAULT_SOURCE),
            ]
        );
    }

    #[test]
    fn hydrate_missing_lock_file_is_none() {
        let dir = tempdir().unwrap();
        let cli = SkillsCli::new().with_lock_path(dir.path().join(LOCK_FILENAME));
        assert!(cli.hydrate_lock_file(DEFAULT_SOURCE).is_none());
    }

    #[test]
    fn list_falls_back_to_lock_file_when_cli_missing() {
        let dir = tempdir().unwrap();
        let path = write_lock(dir.path(), r#"{"skills":["alpha"]}"#);
        let mut cli =
            SkillsCli::with_path(PathBuf::from("/nonexistent/skills")).with_lock_path(path);
        let records = cli.list(DEFAULT_SOURCE).unwrap();
        assert_eq!(records, vec![SkillRecord::new("alpha", DEFAULT_SOURCE)]);
    }

    #[test]
    fn list_empty_when_nothing_available() {
        let dir = tempdir().unwrap();
        let mut cli = SkillsCli::with_path(PathBuf::from("/nonexistent/skills"))
            .with_lock_path(dir.path().join(LOCK_FILENAME));
        let records = cli.list(DEFAULT_SOURCE).unwrap();
        assert!(records.is_empty());
    }
}
