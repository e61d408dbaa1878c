//! Canonicalization of heterogeneous skill inputs.
//!
//! Payloads, lock files, and CLI output all feed [`SkillInput`] values of
//! mixed shape into the sync engine. Normalization converts them to
//! canonical [`SkillRecord`]s, silently dropping entries that cannot name
//! a skill. Malformed input is never fatal here.

use crate::models::{SkillInput, SkillRecord};
use crate::reconcile::dedupe_sort;

/// Fallback repository locator for entries that carry no source.
///
/// Legacy backups stored bare skill names; those all came from the default
/// skills repository.
pub const DEFAULT_SOURCE: &str = "vercel-labs/agent-skills";

/// Diagnostic-message fragments that leak into skill lists when the
/// external `skills` CLI prints its "nothing installed" notice on stdout.
/// An entry whose name contains one of these is not a skill.
const DIAGNOSTIC_LEAKS: &[&str] = &[
    "No skills installed",
    "no skills found",
    "Run `skills add`",
];

/// Returns `true` if the entry has a usable, non-empty name.
#[must_use]
pub fn has_nonempty_name(record: &SkillRecord) -> bool {
    !record.name.trim().is_empty()
}

/// Returns `true` if the name is a leaked diagnostic message rather than
/// a skill name.
#[must_use]
pub fn is_diagnostic_leak(name: &str) -> bool {
    DIAGNOSTIC_LEAKS
        .iter()
        .any(|fragment| name.contains(fragment))
}

/// Convert mixed-shape inputs into a canonical record set.
///
/// Bare names become records under `default_source`; record entries with
/// an absent or empty source get `default_source` substituted. Entries
/// with an empty name or a diagnostic-leak name are dropped. The result
/// is deduplicated and canonically sorted.
#[must_use]
pub fn normalize(skills: &[SkillInput], default_source: &str) -> Vec<SkillRecord> {
    let records: Vec<SkillRecord> = skills
        .iter()
        .map(|input| to_record(input, default_source))
        .filter(has_nonempty_name)
        .filter(|record| !is_diagnostic_leak(&record.name))
        .collect();
    dedupe_sort(&records)
}

fn to_record(input: &SkillInput, default_source: &str) -> SkillRecord {
    match input {
        SkillInput::Name(name) => SkillRecord::new(name.clone(), default_source),
        SkillInput::Record(raw) => {
            let source = raw
                .source
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(default_source);
            SkillRecord::new(raw.name.clone(), source)
        }
    }
}
