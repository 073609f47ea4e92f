//! Validator kinds, criticality and external command tasks

use crate::error::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in validators, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    Structure,
    Links,
    Quality,
    Traceability,
    Alignment,
}

impl ValidatorKind {
    /// Fixed run order
    pub const ALL: [Self; 5] = [
        Self::Structure,
        Self::Links,
        Self::Quality,
        Self::Traceability,
        Self::Alignment,
    ];

    /// Name used by `--only`, `--skip` and config files
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Links => "links",
            Self::Quality => "quality",
            Self::Traceability => "traceability",
            Self::Alignment => "alignment",
        }
    }

    /// Heading used in reports
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Structure => "Structure Validation",
            Self::Links => "Link Validation",
            Self::Quality => "Quality Scoring",
            Self::Traceability => "Requirements Traceability",
            Self::Alignment => "Document Alignment",
        }
    }

    /// Criticality unless overridden by configuration
    ///
    /// Alignment spans several documents the spec author may not own, so its
    /// failures are recorded without failing the run.
    #[inline]
    #[must_use]
    pub fn default_criticality(self) -> Criticality {
        match self {
            Self::Alignment => Criticality::Advisory,
            _ => Criticality::Critical,
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValidatorKind {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OrchestratorError::UnknownValidator(s.to_string()))
    }
}

/// Whether a failing task fails the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Failure flips the verdict
    #[default]
    Critical,
    /// Failure is recorded only
    Advisory,
}

impl Criticality {
    #[inline]
    #[must_use]
    pub fn is_critical(self) -> bool {
        self == Self::Critical
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "critical",
            Self::Advisory => "advisory",
        })
    }
}

/// External validator program run after the built-in validators
///
/// Arguments equal to `{spec}` are replaced with the document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub criticality: Criticality,
    /// Overrides the run-wide command timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CommandSpec {
    /// Command with no arguments
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            criticality: Criticality::Critical,
            timeout_secs: None,
        }
    }

    /// Append arguments
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Arguments with `{spec}` substituted
    pub(crate) fn resolved_args(&self, spec: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| if a == "{spec}" { spec.to_string() } else { a.clone() })
            .collect()
    }
}
