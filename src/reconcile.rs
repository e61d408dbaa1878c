//! Deterministic set algebra over skill records.
//!
//! Every set-valued result in this crate is canonical: duplicate-free by
//! `(source, name)` key and sorted ascending by `(source, name)`. That
//! canonical form is what makes sync plans reproducible across runs and
//! machines regardless of input ordering.

use std::collections::HashSet;

use crate::models::SkillRecord;

/// Drop duplicate records and sort the rest into canonical order.
///
/// The first occurrence of each `source:name` key wins; later duplicates
/// are dropped. Comparison is exact-string with no case folding, so records
/// differing only by case are distinct. Output is sorted ascending by
/// `source`, then `name`.
#[must_use]
pub fn dedupe_sort(records: &[SkillRecord]) -> Vec<SkillRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<SkillRecord> = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.key()) {
            out.push(record.clone());
        }
    }
    out.sort();
    out
}

/// Canonical union of two record sets.
#[must_use]
pub fn union(a: &[SkillRecord], b: &[SkillRecord]) -> Vec<SkillRecord> {
    let mut combined: Vec<SkillRecord> = Vec::with_capacity(a.len() + b.len());
    combined.extend_from_slice(a);
    combined.extend_from_slice(b);
    dedupe_sort(&combined)
}

/// Records of `a` with no exact `(name, source)` match in `b`.
///
/// Preserves `a`'s order; when `a` is already canonical the result is too.
#[must_use]
pub fn difference(a: &[SkillRecord], b: &[SkillRecord]) -> Vec<SkillRecord> {
    let keys: HashSet<String> = b.iter().map(SkillRecord::key).collect();
    a.iter()
        .filter(|record| !keys.contains(&record.key()))
        .cloned()
        .collect()
}

/// Order- and duplicate-independent set equality.
///
/// Both sides are canonicalized before comparison, so permutations and
/// repeated entries of the same set compare equal.
#[must_use]
pub fn sets_equal(a: &[SkillRecord], b: &[SkillRecord]) -> bool {
    dedupe_sort(a) == dedupe_sort(b)
}
