use crate::config::SyncConfig;
use crate::errors::{Result, SyncError};

/// Primary environment variable for the GitHub token.
pub const TOKEN_ENV: &str = "SKILLSYNC_GITHUB_TOKEN";

/// Generic fallback environment variable.
pub const TOKEN_ENV_FALLBACK: &str = "GITHUB_TOKEN";

/// Resolve the GitHub token used for backup gist access.
///
/// Resolution order: `SKILLSYNC_GITHUB_TOKEN`, then `GITHUB_TOKEN`, then
/// the config file's `github_token`. Empty values are skipped.
pub fn resolve_token(config: &SyncConfig) -> Result<String> {
    for var in [TOKEN_ENV, TOKEN_ENV_FALLBACK] {
        if let Ok(token) = std::env::var(var) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
    }
    if let Some(token) = config.github_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    Err(SyncError::Credential {
        message: format!(
            "no GitHub token found; set {TOKEN_ENV} or add \"github_token\" to {}",
            config.path().display()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Env-var resolution is exercised through the CLI integration tests,
    // where each invocation gets its own environment; mutating the
    // process environment from unit tests would race between threads.

    #[test]
    fn falls_back_to_config_token() {
        let dir = tempdir().unwrap();
        let mut config = SyncConfig::new(dir.path());
        config.github_token = Some("ghp_config".to_string());
        // Only meaningful when the env vars are unset, as in a clean
        // test environment.
        if std::env::var(TOKEN_ENV).is_err() && std::env::var(TOKEN_ENV_FALLBACK).is_err() {
            assert_eq!(resolve_token(&config).unwrap(), "ghp_config");
        }
    }

    #[test]
    fn missing_everywhere_is_a_credential_error() {
        let dir = tempdir().unwrap();
        let config = SyncConfig::new(dir.path());
        if std::env::var(TOKEN_ENV).is_err() && std::env::var(TOKEN_ENV_FALLBACK).is_err() {
            let err = resolve_token(&config).unwrap_err();
            assert!(err.to_string().contains(TOKEN_ENV));
        }
    }

    #[test]
    fn empty_config_token_is_skipped() {
        let dir = tempdir().unwrap();
        let mut config = SyncConfig::new(dir.path());
        config.github_token = Some(String::new());
        if std::env::var(TOKEN_ENV).is_err() && std::env::var(TOKEN_ENV_FALLBACK).is_err() {
            assert!(resolve_token(&config).is_err());
        }
    }
}
