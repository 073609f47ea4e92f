//! Error types for the checks
//!
//! Heuristic findings are reported as [`Issue`](crate::Issue)s. These errors
//! cover broken invariants and documents that cannot be read.

use crate::quality::Dimension;
use specgate_document::DocumentError;
use std::path::PathBuf;

/// Errors while building scores
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    /// A dimension score exceeds its maximum
    #[error("{dimension} score {score} exceeds maximum {max}")]
    OverMax {
        dimension: Dimension,
        score: u32,
        max: u32,
    },

    /// Report total does not equal the sum of its dimensions
    #[error("total score {total} does not match dimension sum {sum}")]
    TotalMismatch { total: u32, sum: u32 },

    /// Scoring was requested for no dimension at all
    #[error("no dimensions selected for scoring")]
    NoDimensions,

    /// Dimension name not recognised
    #[error("unknown dimension: '{0}'")]
    UnknownDimension(String),
}

/// Errors while reading documents during alignment
#[derive(Debug, thiserror::Error)]
pub enum AlignmentError {
    /// A discovered document could not be read
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Walking the project tree failed
    #[error("failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },
}

impl AlignmentError {
    /// Create scan error for path
    pub fn scan(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Scan {
            path: path.into(),
            message: message.into(),
        }
    }
}
