// Error types for Remindo
// Missing tasks are not errors: trash and reminder paths treat them as no-ops

/// Top-level error type for store, config and reminder operations.
#[derive(Debug, thiserror::Error)]
pub enum RemindoError {
    /// Filesystem error while reading or writing the store or config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store contents could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config frontmatter could not be encoded or decoded.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A date-time typed by the user could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Rejected user input (empty task text, bad settings values).
    #[error("{0}")]
    InvalidInput(String),

    /// Notification delivery failed.
    #[error("notification error: {0}")]
    Notify(String),

    /// Background worker lifecycle error.
    #[error("worker error: {0}")]
    Worker(String),

    /// Store file watcher error.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RemindoError>;
