//! Sync run reporting.

use serde::Serialize;

use crate::models::{SkillRecord, SyncMode};

/// An action that could not be carried out, with its reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedAction {
    pub record: SkillRecord,
    pub reason: String,
}

/// What a sync run actually did (or, under `--dry-run`, would do).
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub installed: Vec<SkillRecord>,
    pub removed: Vec<SkillRecord>,
    pub failed: Vec<FailedAction>,
    pub uploaded: bool,
    pub remote_newer: bool,
    pub dry_run: bool,
}

impl SyncReport {
    #[must_use]
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            installed: Vec::new(),
            removed: Vec::new(),
            failed: Vec::new(),
            uploaded: false,
            remote_newer: false,
            dry_run: false,
        }
    }

    pub fn record_failure(&mut self, record: SkillRecord, reason: impl Into<String>) {
        self.failed.push(FailedAction {
            record,
            reason: reason.into(),
        });
    }

    /// A clean run has no failed actions; only clean runs advance the
    /// last-sync baseline.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Human-readable rendering of a report.
#[must_use]
pub fn format_text(report: &SyncReport) -> String {
    let mut out = String::new();
    for record in &report.installed {
        out.push_str(&format!("+ {record}\n"));
    }
    for record in &report.removed {
        out.push_str(&format!("- {record}\n"));
    }
    for failure in &report.failed {
        out.push_str(&format!("! {} ({})\n", failure.record, failure.reason));
    }

    let mut summary = format!(
        "{} sync: {} installed, {} removed, {} failed",
        report.mode,
        report.installed.len(),
        report.removed.len(),
        report.failed.len(),
    );
    if report.uploaded {
        summary.push_str(", backup updated");
    }
    if report.remote_newer {
        summary.push_str(" (remote was newer)");
    }
    if report.dry_run {
        summary.push_str(" [dry run]");
    }
    out.push_str(&summary);
    out.push('\n');
    out
}
