//! Error types for session validation.
//!
//! Defines the error taxonomy shared by every validator:
//! - Missing paths and files
//! - Names that do not follow the convention
//! - Wrong file counts
//! - Files found outside their canonical location
//! - Directory-vs-file expectations that do not hold
//!
//! Every layout error is fatal for the validator that raised it. Non-fatal
//! conditions are reported as advisories instead, see
//! [`crate::validation::advisory`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for validator operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised when a session directory does not follow the convention.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{what} not found: {}", path.display())]
    NotFound { what: String, path: PathBuf },

    #[error("Name '{name}' does not match the expected format: {reason}")]
    FormatMismatch { name: String, reason: String },

    #[error("Expected {expected} {what}, found {found} in {}", path.display())]
    CountMismatch {
        what: String,
        expected: usize,
        found: usize,
        path: PathBuf,
    },

    #[error("Unexpected file {}: {reason}", path.display())]
    UnexpectedFile { path: PathBuf, reason: String },

    #[error("Unexpected structure at {}: {reason}", path.display())]
    StructureMismatch { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ValidationError {
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn format_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FormatMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn count_mismatch(
        what: impl Into<String>,
        expected: usize,
        found: usize,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::CountMismatch {
            what: what.into(),
            expected,
            found,
            path: path.into(),
        }
    }

    pub fn unexpected_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnexpectedFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn structure_mismatch(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StructureMismatch {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the kind of layout violation this error represents.
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::NotFound { .. } => ValidationErrorKind::NotFound,
            Self::FormatMismatch { .. } => ValidationErrorKind::FormatMismatch,
            Self::CountMismatch { .. } => ValidationErrorKind::CountMismatch,
            Self::UnexpectedFile { .. } => ValidationErrorKind::UnexpectedFile,
            Self::StructureMismatch { .. } => ValidationErrorKind::StructureMismatch,
            Self::Io(_) | Self::Walk(_) => ValidationErrorKind::Traversal,
        }
    }
}

/// Coarse classification of a [`ValidationError`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    NotFound,
    FormatMismatch,
    CountMismatch,
    UnexpectedFile,
    StructureMismatch,
    /// The filesystem could not be read; says nothing about the layout.
    Traversal,
}

/// Errors that can occur while loading validator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
