//! Quality report

use super::{Dimension, DimensionScore};
use crate::error::ScoreError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness of a scored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ready,
    NeedsImprovement,
    RequiresSignificantWork,
}

impl Status {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready for approval",
            Self::NeedsImprovement => "Needs improvement",
            Self::RequiresSignificantWork => "Requires significant work",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery risk implied by the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// Five-tier grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Unacceptable,
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
            Self::Poor => "Poor",
            Self::Unacceptable => "Unacceptable",
        })
    }
}

/// `total / max >= percent / 100` without floating point
fn at_least(total: u32, max: u32, percent: u32) -> bool {
    u64::from(total) * 100 >= u64::from(percent) * u64::from(max)
}

/// Graded result of scoring one document
///
/// Totals are derived from the dimension scores at construction and the
/// report is never mutated afterwards. Deserialization re-checks every
/// invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReport")]
pub struct ValidationReport {
    spec_file: String,
    timestamp: DateTime<Utc>,
    dimensions: Vec<DimensionScore>,
    total_score: u32,
    max_score: u32,
    status: Status,
    risk_level: RiskLevel,
    grade: Grade,
}

impl ValidationReport {
    /// Build a report from dimension scores
    ///
    /// # Errors
    ///
    /// [`ScoreError::NoDimensions`] for an empty score list.
    pub fn new(
        spec_file: impl Into<String>,
        timestamp: DateTime<Utc>,
        dimensions: Vec<DimensionScore>,
    ) -> Result<Self, ScoreError> {
        if dimensions.is_empty() {
            return Err(ScoreError::NoDimensions);
        }
        let total_score = dimensions.iter().map(DimensionScore::score).sum();
        let max_score = dimensions.iter().map(DimensionScore::max_score).sum();

        let (status, risk_level) = if at_least(total_score, max_score, 90) {
            (Status::Ready, RiskLevel::Low)
        } else if at_least(total_score, max_score, 85) {
            (Status::NeedsImprovement, RiskLevel::Medium)
        } else {
            (Status::RequiresSignificantWork, RiskLevel::High)
        };

        let grade = if at_least(total_score, max_score, 95) {
            Grade::Excellent
        } else if at_least(total_score, max_score, 90) {
            Grade::Good
        } else if at_least(total_score, max_score, 85) {
            Grade::Acceptable
        } else if at_least(total_score, max_score, 70) {
            Grade::Poor
        } else {
            Grade::Unacceptable
        };

        Ok(Self {
            spec_file: spec_file.into(),
            timestamp,
            dimensions,
            total_score,
            max_score,
            status,
            risk_level,
            grade,
        })
    }

    /// Parse a previously serialized report
    ///
    /// # Errors
    ///
    /// Malformed JSON, or scores that break the report invariants.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[inline]
    #[must_use]
    pub fn spec_file(&self) -> &str {
        &self.spec_file
    }

    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> &[DimensionScore] {
        &self.dimensions
    }

    /// Score of one dimension, if it was requested
    #[must_use]
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension() == dimension)
    }

    #[inline]
    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[inline]
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    #[inline]
    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Total as a percentage of the maximum
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.total_score) * 100.0 / f64::from(self.max_score)
    }

    /// Whether the document is ready for approval
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == Status::Ready
    }

    /// Every suggestion across dimensions, in scoring order
    pub fn suggestions(&self) -> impl Iterator<Item = &str> + '_ {
        self.dimensions
            .iter()
            .flat_map(|d| d.suggestions().iter().map(String::as_str))
    }

    /// Pretty JSON
    ///
    /// # Errors
    ///
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text report for terminals
    #[must_use]
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        out.push_str(&format!("{rule}\n"));
        out.push_str(&format!("SPEC QUALITY SCORE: {}\n", self.spec_file));
        out.push_str(&format!("{rule}\n"));
        for dim in &self.dimensions {
            out.push_str(&format!(
                "\n{}: {}/{}\n",
                dim.dimension().title(),
                dim.score(),
                dim.max_score()
            ));
            for (name, detail) in dim.details() {
                out.push_str(&format!("  - {name}: {detail}\n"));
            }
        }
        out.push_str(&format!(
            "\nTOTAL: {}/{} ({:.1}%)\n",
            self.total_score,
            self.max_score,
            self.percentage()
        ));
        out.push_str(&format!("Status: {}\n", self.status));
        out.push_str(&format!("Risk: {}\n", self.risk_level));
        out.push_str(&format!("Grade: {}\n", self.grade));

        let suggestions: Vec<&str> = self.suggestions().collect();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for (i, s) in suggestions.iter().enumerate() {
                out.push_str(&format!("  {}. {s}\n", i + 1));
            }
        }
        out.push_str(&format!("{rule}\n"));
        out
    }

    /// Markdown report
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("# Spec Quality Report\n\n");
        out.push_str(&format!("- **Document:** `{}`\n", self.spec_file));
        out.push_str(&format!("- **Scored:** {}\n", self.timestamp.to_rfc3339()));
        out.push_str(&format!(
            "- **Total:** {}/{} ({})\n",
            self.total_score, self.max_score, self.grade
        ));
        out.push_str(&format!("- **Status:** {}\n", self.status));
        out.push_str(&format!("- **Risk:** {}\n\n", self.risk_level));

        out.push_str("| Dimension | Score |\n");
        out.push_str("|-----------|-------|\n");
        for dim in &self.dimensions {
            out.push_str(&format!(
                "| {} | {}/{} |\n",
                dim.dimension().title(),
                dim.score(),
                dim.max_score()
            ));
        }

        for dim in &self.dimensions {
            out.push_str(&format!("\n## {}\n\n", dim.dimension().title()));
            for (name, detail) in dim.details() {
                out.push_str(&format!("- `{name}`: {detail}\n"));
            }
            if !dim.suggestions().is_empty() {
                out.push_str("\n**Suggestions**\n\n");
                for s in dim.suggestions() {
                    out.push_str(&format!("- {s}\n"));
                }
            }
        }
        out
    }
}

#[derive(Deserialize)]
struct RawDimension {
    dimension: Dimension,
    score: u32,
    max_score: u32,
    #[serde(default)]
    details: IndexMap<String, String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
struct RawReport {
    spec_file: String,
    timestamp: DateTime<Utc>,
    dimensions: Vec<RawDimension>,
    total_score: u32,
}

impl TryFrom<RawReport> for ValidationReport {
    type Error = ScoreError;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        let dimensions = raw
            .dimensions
            .into_iter()
            .map(|d| DimensionScore::new(d.dimension, d.score, d.max_score, d.details, d.suggestions))
            .collect::<Result<Vec<_>, _>>()?;
        let report = Self::new(raw.spec_file, raw.timestamp, dimensions)?;
        if report.total_score != raw.total_score {
            return Err(ScoreError::TotalMismatch {
                total: raw.total_score,
                sum: report.total_score,
            });
        }
        Ok(report)
    }
}
