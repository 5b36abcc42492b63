//! Error types for basecal.

use thiserror::Error;

/// Errors that can occur in basecal operations.
#[derive(Error, Debug)]
pub enum BaseCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Note already exists: {0}")]
    NoteExists(String),

    #[error("Frontmatter error in {path}: {message}")]
    Frontmatter { path: String, message: String },

    #[error("Invalid property id '{0}'")]
    InvalidProperty(String),

    #[error("Property access failed for '{property}': {message}")]
    PropertyAccess { property: String, message: String },

    #[error("Property '{0}' is not a writable note property")]
    NotWritable(String),

    #[error("Write-back rejected: {0}")]
    WriteBack(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Capability '{name}' failed: {message}")]
    Capability { name: String, message: String },

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("View is not mounted")]
    Unmounted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for BaseCalError {
    fn from(e: serde_yaml::Error) -> Self {
        BaseCalError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for BaseCalError {
    fn from(e: serde_json::Error) -> Self {
        BaseCalError::Serialization(e.to_string())
    }
}

/// Result type alias for basecal operations.
pub type BaseCalResult<T> = Result<T, BaseCalError>;
