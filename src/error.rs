//! Error types for Stevedore
//!
//! All modules use `StevedoreResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Stevedore operations
pub type StevedoreResult<T> = Result<T, StevedoreError>;

/// All errors that can occur in Stevedore
#[derive(Error, Debug)]
pub enum StevedoreError {
    // Environment construction errors
    #[error("Invalid base image: {image}, expected an image matching {expected}")]
    InvalidBaseImage { image: String, expected: String },

    // Remote execution errors
    #[error("Container engine error: {context}: {reason}")]
    Engine { context: String, reason: String },

    #[error("Container command failed: {command}, exit code: {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Unrecognized image load output: {output:?}")]
    UnparseableLoadOutput { output: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StevedoreError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an engine error with context
    pub fn engine(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Engine {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, code: i32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
        }
    }
}
