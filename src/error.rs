// src/error.rs
//! Error types shared across the crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting Pak definitions or driving oc-mirror
#[derive(Error, Debug)]
pub enum Error {
    /// A Pak definition could not be understood (bad file name, bad CSV row,
    /// missing required field). Conversion of other definitions continues.
    #[error("Malformed Pak definition '{}': {reason}", .path.display())]
    MalformedInputError { path: PathBuf, reason: String },

    /// A manifest could not be written to the store
    #[error("Failed to write manifest '{}': {source}", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An oc-mirror run could not be started or did not complete
    #[error("Mirror operation failed: {0}")]
    MirrorError(String),

    /// The conversion rules file is invalid
    #[error("Invalid conversion rules: {0}")]
    RulesError(String),

    /// I/O error outside of manifest writes
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Manifest serialization or deserialization failed
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;
