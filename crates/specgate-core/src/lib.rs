//! specgate core - validation orchestrator
//!
//! Runs the specgate validators against one document in a fixed order:
//!
//! 1. structure
//! 2. links
//! 3. quality
//! 4. traceability
//! 5. alignment, only when the document sits in a project layout
//! 6. external commands from the configuration
//!
//! Each task is critical or advisory. A failing critical task fails the run;
//! advisory failures are recorded only. A failed run triggers the improvement
//! analyzer as a best-effort follow-up.
//!
//! # Example
//!
//! ```rust
//! use specgate_core::{Orchestrator, ValidationConfig, ValidatorKind};
//! use specgate_document::Document;
//!
//! let config = ValidationConfig::new().with_only(&[ValidatorKind::Structure]);
//! let doc = Document::parse("# Spec\n\n## Executive Summary\n\nShort.\n");
//! let report = Orchestrator::new(config).run(&doc).unwrap();
//!
//! assert_eq!(report.verdict(), "Validation FAILED");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod command;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod task;

pub use config::{ValidationConfig, CONFIG_FILE_NAME, DEFAULT_COMMAND_TIMEOUT_SECS};
pub use error::OrchestratorError;
pub use report::{
    RunReport, ScoreSummary, TaskRecord, TaskStatus, COMMAND_CATEGORY, TIMEOUT_CATEGORY,
    VERDICT_FAILED, VERDICT_PASSED,
};
pub use runner::Orchestrator;
pub use task::{CommandSpec, Criticality, ValidatorKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
