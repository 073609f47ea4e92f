//! Error types for document loading
//!
//! Feature extraction itself is total over any string; the only failures
//! are reading the document from disk.

use std::path::{Path, PathBuf};

/// Errors while loading a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The document does not exist
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// IO error during file read
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Create IO error for path, mapping `NotFound` to its own variant
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error means the file is missing
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Path that failed to load
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } => path,
        }
    }
}
