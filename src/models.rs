use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A skill installed from an external repository.
///
/// Identity is the `(source, name)` pair, compared case-sensitively.
/// Records are plain value objects; two records with equal fields are the
/// same skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub source: String,
}

impl SkillRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Deduplication key: `source:name`, exact-string.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.source, self.name)
    }
}

/// Canonical ordering: ascending by `source`, then by `name`.
impl Ord for SkillRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for SkillRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SkillRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.source)
    }
}

/// A not-yet-normalized skill entry as found in payloads and lock files.
///
/// Older backups stored bare skill names; newer ones store full record
/// objects, possibly without a `source`. This untagged union is the single
/// dynamic-shape boundary; everything past [`crate::normalize::normalize`]
/// works with [`SkillRecord`] only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillInput {
    /// Legacy bare-name form.
    Name(String),
    /// Record form; `source` may be absent in older payloads.
    Record(RawSkillRecord),
}

/// The record form of [`SkillInput`], before source substitution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSkillRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<SkillRecord> for SkillInput {
    fn from(record: SkillRecord) -> Self {
        Self::Record(RawSkillRecord {
            name: record.name,
            source: Some(record.source),
        })
    }
}

impl From<&SkillRecord> for SkillInput {
    fn from(record: &SkillRecord) -> Self {
        record.clone().into()
    }
}

/// One side of a sync: the serialized `{skills, updatedAt}` snapshot.
///
/// An `updated_at` of `""` means "no remote payload exists yet".
/// Uploads always serialize skills in the record-object form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupPayload {
    #[serde(default)]
    pub skills: Vec<SkillInput>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

impl BackupPayload {
    /// Build a payload from normalized records with the given timestamp.
    #[must_use]
    pub fn from_records(records: &[SkillRecord], updated_at: impl Into<String>) -> Self {
        Self {
            skills: records.iter().map(SkillInput::from).collect(),
            updated_at: updated_at.into(),
        }
    }

    /// Returns `true` if no remote payload has ever been written.
    #[must_use]
    pub fn is_unwritten(&self) -> bool {
        self.updated_at.is_empty()
    }
}

/// The reconciliation mode a plan or report was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Merge,
    Auto,
    Pull,
    Push,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Merge => "merge",
            Self::Auto => "auto",
            Self::Pull => "pull",
            Self::Push => "push",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_equality_is_case_sensitive() {
        let a = SkillRecord::new("alpha", "org/repo");
        let b = SkillRecord::new("Alpha", "org/repo");
        assert_ne!(a, b);
    }

    #[test]
    fn record_ordering_sorts_by_source_then_name() {
        let mut records = vec![
            SkillRecord::new("zeta", "aaa/repo"),
            SkillRecord::new("alpha", "bbb/repo"),
            SkillRecord::new("alpha", "aaa/repo"),
        ];
        records.sort();
        assert_eq!(records[0], SkillRecord::new("alpha", "aaa/repo"));
        assert_eq!(records[1], SkillRecord::new("zeta", "aaa/repo"));
        assert_eq!(records[2], SkillRecord::new("alpha", "bbb/repo"));
    }

    #[test]
    fn record_key_joins_source_and_name() {
        let r = SkillRecord::new("alpha", "org/repo");
        assert_eq!(r.key(), "org/repo:alpha");
    }

    #[test]
    fn skill_input_deserializes_bare_string() {
        let input: SkillInput = serde_json::from_str("\"alpha\"").unwrap();
        assert!(matches!(input, SkillInput::Name(ref n) if n == "alpha"));
    }

    #[test]
    fn skill_input_deserializes_record_object() {
        let input: SkillInput =
            serde_json::from_str(r#"{"name":"alpha","source":"org/repo"}"#).unwrap();
        match input {
            SkillInput::Record(r) => {
                assert_eq!(r.name, "alpha");
                assert_eq!(r.source.as_deref(), Some("org/repo"));
            }
            SkillInput::Name(_) => panic!("expected record form"),
        }
    }

    #[test]
    fn skill_input_record_without_source() {
        let input: SkillInput = serde_json::from_str(r#"{"name":"alpha"}"#).unwrap();
        match input {
            SkillInput::Record(r) => {
                assert_eq!(r.name, "alpha");
                assert!(r.source.is_none());
            }
            SkillInput::Name(_) => panic!("expected record form"),
        }
    }

    #[test]
    fn skill_input_record_without_name_defaults_empty() {
        let input: SkillInput = serde_json::from_str(r#"{"source":"org/repo"}"#).unwrap();
        match input {
            SkillInput::Record(r) => assert!(r.name.is_empty()),
            SkillInput::Name(_) => panic!("expected record form"),
        }
    }

    #[test]
    fn payload_deserializes_with_missing_fields() {
        let payload: BackupPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.skills.is_empty());
        assert!(payload.is_unwritten());
    }

    #[test]
    fn payload_deserializes_mixed_skill_shapes() {
        let json = r#"{"skills":["alpha",{"name":"beta","source":"org/repo"}],"updatedAt":"2026-01-01T00:00:00Z"}"#;
        let payload: BackupPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.skills.len(), 2);
        assert_eq!(payload.updated_at, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn payload_from_records_serializes_object_form() {
        let records = vec![SkillRecord::new("alpha", "org/repo")];
        let payload = BackupPayload::from_records(&records, "2026-01-05T00:00:00Z");
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["skills"][0]["name"], "alpha");
        assert_eq!(v["skills"][0]["source"], "org/repo");
        assert_eq!(v["updatedAt"], "2026-01-05T00:00:00Z");
    }

    #[test]
    fn sync_mode_display_is_lowercase() {
        assert_eq!(SyncMode::Merge.to_string(), "merge");
        assert_eq!(SyncMode::Auto.to_string(), "auto");
        assert_eq!(SyncMode::Pull.to_string(), "pull");
        assert_eq!(SyncMode::Push.to_string(), "push");
    }
}
