//! Validators for specification documents
//!
//! Every validator reads a parsed [`Document`](specgate_document::Document)
//! (or, for alignment, a project directory) and returns plain data:
//!
//! - [`StructureValidator`]: required outline, hierarchy, tables, placeholders
//! - [`LinkValidator`]: anchors, relative files and reference links
//! - [`QualityScorer`]: four 25-point dimensions built from sub-checks
//! - [`TraceabilityValidator`]: architecture / acceptance / risk traces
//! - [`AlignmentValidator`]: spec vs roadmap vs phase plans
//! - [`ImprovementAnalyzer`]: prioritized improvement suggestions
//!
//! Findings carry a [`Severity`]. `ERROR` fails a check, `WARNING` fails it
//! only in strict mode and `INFO` never does.
//!
//! # Example
//!
//! ```rust
//! use specgate_checks::{StructureOptions, StructureValidator};
//! use specgate_document::Document;
//!
//! let doc = Document::parse("# Spec\n## Executive Summary\nShort.\n");
//! let findings = StructureValidator::new(StructureOptions::new()).validate(&doc);
//! assert!(findings.has_errors());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod alignment;
pub mod error;
pub mod improvements;
pub mod issue;
pub mod links;
pub mod quality;
pub mod structure;
pub mod traceability;

pub use alignment::{AlignmentRecord, AlignmentValidator, Outcome};
pub use error::{AlignmentError, ScoreError};
pub use improvements::{ImprovementAnalyzer, ImprovementReport, Priority, Suggestion};
pub use issue::{category, Findings, Issue, Severity};
pub use links::{LinkReport, LinkStats, LinkValidator};
pub use quality::{Dimension, DimensionScore, QualityScorer, SubCheck, ValidationReport};
pub use structure::{StructureOptions, StructureValidator};
pub use traceability::{TraceOptions, TraceReport, TraceRow, TraceabilityValidator};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
