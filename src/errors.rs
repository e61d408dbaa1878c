use thiserror::Error;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Caller passed an unrecognized sync strategy name.
    #[error("invalid sync strategy '{value}': expected 'union' or 'latest'")]
    InvalidStrategy { value: String },

    /// Remote backup request failed.
    ///
    /// `status` is the HTTP status code when the server answered, `None`
    /// for transport-level failures (DNS, TLS, connection reset).
    #[error("remote error: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Local skill inventory operation failed.
    #[error("inventory error: {message}")]
    Inventory { message: String },

    /// No usable GitHub token could be resolved.
    #[error("credential error: {message}")]
    Credential { message: String },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, SyncError>`.
pub type Result<T> = std::result::Result<T, SyncError>;
