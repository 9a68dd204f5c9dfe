use thiserror::Error;

/// Kaniko wrapper error types.
#[derive(Error, Debug)]
pub enum KanikoError {
    /// The executor terminated with a nonzero exit code.
    ///
    /// Carries the exact exit code and every captured log line, so callers
    /// can inspect the build output without re-running anything.
    #[error("process failed with exit code {exit_code}: {}", lines.join("\n"))]
    BuildFailed {
        exit_code: i32,
        lines: Vec<String>,
    },

    /// A recognized override key carried a value that does not coerce to the
    /// setting's type (e.g. a string where a list is expected).
    #[error("invalid value for setting '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error (executor spawn failure, auth file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure while encoding the auth file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for kaniko wrapper operations.
pub type Result<T> = std::result::Result<T, KanikoError>;
