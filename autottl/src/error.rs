//! Error types for the autottl crate.

/// Errors surfaced by the estimator's collaborators or its configuration.
///
/// Insufficient data is never an error: short or empty windows resolve to
/// the configured fallback intervals instead.
#[derive(Debug, thiserror::Error)]
pub enum AutoTtlError {
    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The timestamp source failed to return a window
    #[error("Timestamp source error: {0}")]
    TimestampSource(String),

    /// The feed catalog failed to list sources
    #[error("Feed catalog error: {0}")]
    Catalog(String),

    /// The session store failed to load or save burst state
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// Filesystem error from a file-backed collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed persisted data
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using AutoTtlError.
pub type Result<T> = std::result::Result<T, AutoTtlError>;
