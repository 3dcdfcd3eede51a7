//! Error types for rule loading, compilation and conversion.

/// Errors that abort the current load, compile or convert call.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error, including unknown fields.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload was not valid base64.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Embedded template failed to parse or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Input was readable but structurally unusable.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RulesError>;
