//! Error types for inspection-report.
//!
//! Fatal errors abort a run before any output is written. Per-photo failures
//! are not represented here; see [`crate::photo::PhotoError`].

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for inspection-report operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Project Load Errors ===
    /// The project JSON file does not exist.
    #[error("project file not found: {}", path.display())]
    ProjectNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The project JSON file exists but could not be read.
    #[error("failed to read project file {}: {source}", path.display())]
    ProjectRead {
        /// Path to the project file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The project file is not valid JSON.
    #[error("failed to decode JSON from {}: {source}", path.display())]
    ProjectParse {
        /// Path to the project file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The project JSON is well-formed but does not match the schema.
    #[error(
        "invalid project {}: {} problem(s): {}",
        path.display(),
        problems.len(),
        problems.join("; ")
    )]
    ProjectInvalid {
        /// Path to the project file.
        path: PathBuf,
        /// Every missing or malformed field, as a dotted path with a reason.
        problems: Vec<String>,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file.
    #[error("failed to write {}: {source}", path.display())]
    FileWrite {
        /// Path that couldn't be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for inspection-report operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error came from loading the project file.
    ///
    /// Load errors are reported to the user and end the run without output.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. }
                | Self::ProjectRead { .. }
                | Self::ProjectParse { .. }
                | Self::ProjectInvalid { .. }
        )
    }
}
