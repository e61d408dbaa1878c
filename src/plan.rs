//! Per-strategy sync plan builders.
//!
//! Each builder is a pure, total function of its input: it normalizes both
//! payloads, runs the set algebra, and returns a plan of intended
//! mutations. Nothing here performs I/O or holds state: executing the
//! plan (installs, removals, uploads) is the caller's job, and the current
//! time enters as the `now_iso` input rather than being read internally.

use serde::Serialize;

use crate::errors::{Result, SyncError};
use crate::models::{BackupPayload, SkillRecord};
use crate::normalize::{normalize, DEFAULT_SOURCE};
use crate::reconcile::{difference, sets_equal, union};
use crate::timestamp::parse_timestamp;

/// Input to a plan builder: both payloads plus the timestamp context.
///
/// `last_sync_at` is only consulted by [`plan_auto`]; `now_iso` only by
/// builders that may produce an upload. `default_source` is the fallback
/// locator handed to normalization, explicit here so callers with a
/// configured override inject it rather than reaching global state.
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub local: &'a BackupPayload,
    pub remote: &'a BackupPayload,
    pub now_iso: &'a str,
    pub last_sync_at: Option<&'a str>,
    pub default_source: &'a str,
}

impl<'a> PlanInput<'a> {
    #[must_use]
    pub fn new(local: &'a BackupPayload, remote: &'a BackupPayload, now_iso: &'a str) -> Self {
        Self {
            local,
            remote,
            now_iso,
            last_sync_at: None,
            default_source: DEFAULT_SOURCE,
        }
    }

    #[must_use]
    pub fn with_last_sync_at(mut self, last_sync_at: &'a str) -> Self {
        self.last_sync_at = Some(last_sync_at);
        self
    }

    #[must_use]
    pub fn with_default_source(mut self, default_source: &'a str) -> Self {
        self.default_source = default_source;
        self
    }

    fn normalized(&self) -> (Vec<SkillRecord>, Vec<SkillRecord>) {
        (
            normalize(&self.local.skills, self.default_source),
            normalize(&self.remote.skills, self.default_source),
        )
    }
}

/// Plan for merge (union) mode: keep both sides' skills.
#[derive(Debug, Clone, Serialize)]
pub struct MergePlan {
    pub install_candidates: Vec<SkillRecord>,
    pub upload: Option<BackupPayload>,
}

/// Plan for auto (latest) mode: freshness-gated one-way reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct AutoPlan {
    pub remote_newer: bool,
    pub install_candidates: Vec<SkillRecord>,
    pub upload: Option<BackupPayload>,
}

/// Plan for pull mode: make local match remote exactly.
#[derive(Debug, Clone, Serialize)]
pub struct PullPlan {
    pub install_candidates: Vec<SkillRecord>,
    pub remove_candidates: Vec<SkillRecord>,
}

/// Plan for push mode: make remote match local exactly.
#[derive(Debug, Clone, Serialize)]
pub struct PushPlan {
    pub upload: Option<BackupPayload>,
}

/// The strategy accepted by the legacy combined `sync` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Union semantics (`"union"`, the default).
    Merge,
    /// Freshness-gated semantics (`"latest"`).
    Auto,
}

impl SyncStrategy {
    /// Parse the legacy strategy name.
    ///
    /// Absent or empty input defaults to [`SyncStrategy::Merge`]. Any
    /// other unrecognized value is a validation failure naming the
    /// offending value; explicitly-wrong input fails closed rather than
    /// silently running the default strategy.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::Merge),
            Some("union") => Ok(Self::Merge),
            Some("latest") => Ok(Self::Auto),
            Some(other) => Err(SyncError::InvalidStrategy {
                value: other.to_string(),
            }),
        }
    }
}

/// Merge mode: install everything in the union that local lacks; upload
/// the union unless remote already equals it (no needless remote writes).
#[must_use]
pub fn plan_merge(input: &PlanInput) -> MergePlan {
    let (local, remote) = input.normalized();
    let union_skills = union(&local, &remote);
    let install_candidates = difference(&union_skills, &local);
    let upload = if sets_equal(&remote, &union_skills) {
        None
    } else {
        Some(BackupPayload::from_records(&union_skills, input.now_iso))
    };
    MergePlan {
        install_candidates,
        upload,
    }
}

/// Auto mode: trust the remote when it changed since the last successful
/// sync, otherwise push local forward.
///
/// The freshness test is strict greater-than against `last_sync_at`
/// (epoch-origin fallback when absent or unparsable): a tie means "not
/// newer", and an unparsable remote timestamp always lands in the
/// push-local branch.
#[must_use]
pub fn plan_auto(input: &PlanInput) -> AutoPlan {
    let (local, remote) = input.normalized();
    let last_sync_time = parse_timestamp(input.last_sync_at).unwrap_or(0);
    let remote_time = parse_timestamp(Some(input.remote.updated_at.as_str()));
    let remote_newer = remote_time.is_some_and(|t| t > last_sync_time);

    if remote_newer {
        AutoPlan {
            remote_newer: true,
            install_candidates: difference(&remote, &local),
            upload: None,
        }
    } else {
        let upload = if sets_equal(&local, &remote) {
            None
        } else {
            Some(BackupPayload::from_records(&local, input.now_iso))
        };
        AutoPlan {
            remote_newer: false,
            install_candidates: Vec::new(),
            upload,
        }
    }
}

/// Pull mode: mirror remote into local, removals included. Never writes
/// remote state.
#[must_use]
pub fn plan_pull(input: &PlanInput) -> PullPlan {
    let (local, remote) = input.normalized();
    PullPlan {
        install_candidates: difference(&remote, &local),
        remove_candidates: difference(&local, &remote),
    }
}

/// Push mode: mirror local into remote. Never touches the local
/// inventory.
#[must_use]
pub fn plan_push(input: &PlanInput) -> PushPlan {
    let (local, remote) = input.normalized();
    let upload = if sets_equal(&local, &remote) {
        None
    } else {
        Some(BackupPayload::from_records(&local, input.now_iso))
    };
    PushPlan { upload }
}
