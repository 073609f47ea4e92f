//! Specification document model
//!
//! Turns raw markdown into a [`FeatureSet`]: headings and the section
//! outline, `FR-`/`NFR-` requirement declarations, quantified metrics,
//! placeholders, tables, diagram blocks and links.
//!
//! Extraction is pattern based and total over any input string. The only
//! fallible operation is [`Document::load`].
//!
//! # Example
//!
//! ```rust
//! use specgate_document::Document;
//!
//! let doc = Document::parse("## Requirements\n### FR-001: Login\nUsers sign in.\n");
//! assert_eq!(doc.features().functional_count(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod anchor;
mod document;
mod error;
mod extract;
mod features;
mod fences;
mod patterns;

pub use anchor::slugify;
pub use document::{contains_token, Document, Section};
pub use error::DocumentError;
pub use extract::extract;
pub use features::{
    FeatureSet, Heading, Link, LinkTarget, PlaceholderHit, PlaceholderKind, ReferenceLink,
    Requirement, RequirementKind, Table, TraceFlags, TraceKind, HIGH_RISK_KEYWORDS,
};
pub use patterns::{DIAGRAM_LANGUAGES, PLACEHOLDER_MARKERS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
