//! GitHub Gist client for the remote backup blob.
//!
//! The backup lives as a single JSON file inside a secret gist. The store
//! either knows the gist id (from config) or discovers it by scanning the
//! authenticated user's gists for the backup filename.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};
use crate::models::BackupPayload;

/// Filename of the backup blob inside the gist.
pub const BACKUP_FILENAME: &str = "skills-backup.json";

/// Description attached to a newly created backup gist.
pub const BACKUP_DESCRIPTION: &str = "Agent skills backup (managed by skillsync)";

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("skillsync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Gist {
    id: String,
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Debug, Default, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct GistWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public: Option<bool>,
    files: HashMap<&'static str, GistWriteFile>,
}

#[derive(Debug, Serialize)]
struct GistWriteFile {
    content: String,
}

impl GistWrite {
    fn create(payload: &BackupPayload) -> Result<Self> {
        Ok(Self {
            description: Some(BACKUP_DESCRIPTION),
            public: Some(false),
            files: Self::files(payload)?,
        })
    }

    fn update(payload: &BackupPayload) -> Result<Self> {
        Ok(Self {
            description: None,
            public: None,
            files: Self::files(payload)?,
        })
    }

    fn files(payload: &BackupPayload) -> Result<HashMap<&'static str, GistWriteFile>> {
        let content = serde_json::to_string_pretty(payload)?;
        let mut files = HashMap::new();
        files.insert(BACKUP_FILENAME, GistWriteFile { content });
        Ok(files)
    }
}

/// Client for the remote backup gist.
pub struct RemoteStore {
    token: String,
    gist_id: Option<String>,
    api_base: String,
}

impl RemoteStore {
    #[must_use]
    pub fn new(token: impl Into<String>, gist_id: Option<String>) -> Self {
        Self {
            token: token.into(),
            gist_id,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (GitHub Enterprise, test servers).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Fetch the backup payload, discovering the gist when no id is
    /// configured.
    ///
    /// Returns `Ok(None)` when no backup gist exists yet (including a
    /// configured id that now 404s). Malformed payload JSON is an error,
    /// since overwriting a backup we cannot read would silently destroy it.
    pub fn fetch(&self) -> Result<Option<(String, BackupPayload)>> {
        let gist_id = match &self.gist_id {
            Some(id) => Some(id.clone()),
            None => self.discover()?,
        };
        let Some(id) = gist_id else {
            return Ok(None);
        };

        let gist = match self.get_gist(&id) {
            Ok(gist) => gist,
            Err(SyncError::Http {
                status: Some(404), ..
            }) => return Ok(None),
            Err(error) => return Err(error),
        };

        let content = gist
            .files
            .get(BACKUP_FILENAME)
            .and_then(|file| file.content.as_deref())
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Some((id, BackupPayload::default())));
        }
        let payload = serde_json::from_str(content).map_err(|error| SyncError::Http {
            status: None,
            message: format!("backup payload in gist {id} is not valid JSON: {error}"),
        })?;
        Ok(Some((id, payload)))
    }

    /// Create the backup gist and return its id.
    pub fn create(&self, payload: &BackupPayload) -> Result<String> {
        let body = GistWrite::create(payload)?;
        let url = format!("{}/gists", self.api_base);
        let mut response = ureq::post(url.as_str())
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("user-agent", USER_AGENT)
            .send_json(&body)
            .map_err(|error| http_error("gist create failed", &error))?;
        let gist: Gist = response
            .body_mut()
            .read_json()
            .map_err(|error| http_error("gist create response parse failed", &error))?;
        Ok(gist.id)
    }

    /// Overwrite the backup file in an existing gist.
    pub fn update(&self, gist_id: &str, payload: &BackupPayload) -> Result<()> {
        let body = GistWrite::update(payload)?;
        let url = format!("{}/gists/{gist_id}", self.api_base);
        ureq::patch(url.as_str())
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("user-agent", USER_AGENT)
            .send_json(&body)
            .map_err(|error| http_error("gist update failed", &error))?;
        Ok(())
    }

    /// Create-or-update convenience: update when a gist id is known,
    /// create otherwise. Returns the gist id written to.
    pub fn upload(&self, gist_id: Option<&str>, payload: &BackupPayload) -> Result<String> {
        match gist_id {
            Some(id) => {
                self.update(id, payload)?;
                Ok(id.to_string())
            }
            None => self.create(payload),
        }
    }

    fn get_gist(&self, gist_id: &str) -> Result<Gist> {
        let url = format!("{}/gists/{gist_id}", self.api_base);
        let mut response = ureq::get(url.as_str())
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("user-agent", USER_AGENT)
            .call()
            .map_err(|error| http_error("gist fetch failed", &error))?;
        response
            .body_mut()
            .read_json()
            .map_err(|error| http_error("gist fetch response parse failed", &error))
    }

    /// Scan the user's gists for one carrying the backup filename.
    fn discover(&self) -> Result<Option<String>> {
        let url = format!("{}/gists?per_page=100", self.api_base);
        let mut response = ureq::get(url.as_str())
            .header("authorization", format!("Bearer {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("user-agent", USER_AGENT)
            .call()
            .map_err(|error| http_error("gist list failed", &error))?;
        let gists: Vec<Gist> = response
            .body_mut()
            .read_json()
            .map_err(|error| http_error("gist list response parse failed", &error))?;
        Ok(gists
            .into_iter()
            .find(|gist| gist.files.contains_key(BACKUP_FILENAME))
            .map(|gist| gist.id))
    }
}

fn http_error(context: &str, error: &ureq::Error) -> SyncError {
    let status = match error {
        ureq::Error::StatusCode(code) => Some(*code),
        _ => None,
    };
    SyncError::Http {
        status,
        message: format!("{context}: {error}"),
    }
}
