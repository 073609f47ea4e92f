//! Error types for the orchestrator
//!
//! Validator failures (including timed-out or crashed external commands)
//! are never errors: they are recorded in the run report. The variants here
//! stop a run before any report exists.

use specgate_document::DocumentError;
use std::path::{Path, PathBuf};

/// Main orchestrator error type
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The target document could not be read
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Configuration file unreadable or malformed
    #[error("configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Validator name not recognised
    #[error("unknown validator: '{0}'")]
    UnknownValidator(String),

    /// Async runtime for external commands could not start
    #[error("runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    /// Caller cancelled the run
    #[error("validation run cancelled")]
    Cancelled,
}

impl OrchestratorError {
    /// Create configuration error for path
    #[inline]
    pub fn config(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Whether the target document is missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Document(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_is_not_found() {
        let err: OrchestratorError = DocumentError::io_error(
            "SPEC.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        )
        .into();
        assert!(err.is_not_found());
        assert!(!OrchestratorError::Cancelled.is_not_found());
    }

    #[test]
    fn config_error_names_the_file() {
        let err = OrchestratorError::config("specgate.toml", "expected a table");
        assert_eq!(
            err.to_string(),
            "configuration error in specgate.toml: expected a table"
        );
    }
}
