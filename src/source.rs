use std::sync::LazyLock;

use regex::Regex;

use crate::models::SkillRecord;

/// Regex for a valid `owner/repo` source locator: one slash, both segments
/// non-empty, segments limited to letters, digits, underscore, period, and
/// hyphen.
static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$").expect("source regex must compile")
});

/// Returns `true` if `source` is a well-formed `owner/repo` locator.
///
/// Plans may legally carry records with invalid sources; callers run this
/// check before attempting installs so that bad locators fail with a
/// reason instead of a spawned-process error.
#[must_use]
pub fn is_valid_source(source: &str) -> bool {
    SOURCE_RE.is_match(source)
}

/// Split records into installable ones and ones with malformed sources.
#[must_use]
pub fn partition_by_source(records: Vec<SkillRecord>) -> (Vec<SkillRecord>, Vec<SkillRecord>) {
    records
        .into_iter()
        .partition(|record| is_valid_source(&record.source))
}
