pub mod config;
pub mod confirm;
pub mod credentials;
pub mod errors;
pub mod inventory;
pub mod models;
pub mod normalize;
pub mod output;
pub mod plan;
pub mod reconcile;
pub mod remote;
pub mod retry;
pub mod source;
pub mod timestamp;

// Re-export key types at crate root for convenience.
pub use config::SyncConfig;
pub use errors::{Result, SyncError};
pub use models::{BackupPayload, RawSkillRecord, SkillInput, SkillRecord, SyncMode};
pub use normalize::{normalize, DEFAULT_SOURCE};
pub use output::{format_text, FailedAction, SyncReport};
pub use plan::{
    plan_auto, plan_merge, plan_pull, plan_push, AutoPlan, MergePlan, PlanInput, PullPlan,
    PushPlan, SyncStrategy,
};
pub use reconcile::{dedupe_sort, difference, sets_equal, union};
pub use source::{is_valid_source, partition_by_source};
pub use timestamp::{now_iso, parse_timestamp};
