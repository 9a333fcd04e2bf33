//! Error types for the logging extensions generator

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a generation pass. Ineligible declarations are not
/// errors; they are skipped.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Reading a source file or writing a generated unit failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Kotlin grammar could not be loaded or produced no syntax tree
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The sink was asked to create the same unit twice in one session
    #[error("Generated file already exists: {package_name}.{file_name}")]
    FileAlreadyExists {
        package_name: String,
        file_name: String,
    },

    /// Host input, options or fingerprint cache could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenerateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: &str, reason: impl Into<String>) -> Self {
        GenerateError::Parse {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
