//! Quality scorer
//!
//! Four independent dimensions, each worth 25 points, built from named
//! sub-checks. A sub-check is a pure strategy over a [`Document`]: it returns
//! bounded points, a detail string and a suggestion that is kept only when
//! the sub-check under-scores.
//!
//! # Example
//!
//! ```rust
//! use specgate_checks::quality::{Dimension, QualityScorer};
//! use specgate_document::Document;
//!
//! let doc = Document::parse("# Empty\n");
//! let report = QualityScorer::for_dimensions(&[Dimension::Clarity])
//!     .unwrap()
//!     .score(&doc)
//!     .unwrap();
//! assert_eq!(report.max_score(), 25);
//! ```

use crate::error::ScoreError;
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use specgate_document::Document;
use std::fmt;
use std::str::FromStr;

mod clarity;
mod completeness;
mod implementability;
mod report;
mod signals;
mod testability;

pub use clarity::{HeadingHierarchy, LanguagePrecision, Terminology, VisualAids};
pub use completeness::{CoreSections, CrossReferences, Placeholders, RequirementCoverage};
pub use implementability::{Dependencies, ResourcePlanning, RiskMitigation, TechnicalFeasibility};
pub use report::{Grade, RiskLevel, Status, ValidationReport};
pub use testability::{AcceptanceCriteria, MeasurableRequirements, QualityMetrics, TestScenarios};

/// Points available per dimension
pub const DIMENSION_MAX: u32 = 25;

/// Quality dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Completeness,
    Clarity,
    Implementability,
    Testability,
}

impl Dimension {
    /// All dimensions in scoring order
    pub const ALL: [Self; 4] = [
        Self::Completeness,
        Self::Clarity,
        Self::Implementability,
        Self::Testability,
    ];

    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Clarity => "clarity",
            Self::Implementability => "implementability",
            Self::Testability => "testability",
        }
    }

    /// Capitalised name for reports
    #[inline]
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Completeness => "Completeness",
            Self::Clarity => "Clarity",
            Self::Implementability => "Implementability",
            Self::Testability => "Testability",
        }
    }

    /// Standard sub-checks of this dimension
    #[must_use]
    pub fn standard_checks(self) -> Vec<Box<dyn SubCheck>> {
        match self {
            Self::Completeness => vec![
                Box::new(CoreSections),
                Box::new(RequirementCoverage),
                Box::new(Placeholders),
                Box::new(CrossReferences),
            ],
            Self::Clarity => vec![
                Box::new(LanguagePrecision),
                Box::new(HeadingHierarchy),
                Box::new(Terminology),
                Box::new(VisualAids),
            ],
            Self::Implementability => vec![
                Box::new(TechnicalFeasibility),
                Box::new(ResourcePlanning),
                Box::new(Dependencies),
                Box::new(RiskMitigation),
            ],
            Self::Testability => vec![
                Box::new(MeasurableRequirements),
                Box::new(TestScenarios),
                Box::new(AcceptanceCriteria),
                Box::new(QualityMetrics),
            ],
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScoreError::UnknownDimension(s.to_string()))
    }
}

/// Result of one sub-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Points awarded
    pub points: u32,
    /// Formatted detail, e.g. `6/8 sections found`
    pub detail: String,
    /// Improvement hint, dropped when the sub-check scores full marks
    pub suggestion: String,
}

impl Evaluation {
    /// Create evaluation
    #[must_use]
    pub fn new(points: u32, detail: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            points,
            detail: detail.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// A named scoring heuristic
///
/// Implementations must be pure: the same document always yields the same
/// evaluation.
pub trait SubCheck: Send + Sync {
    /// Stable name used as the detail key
    fn name(&self) -> &'static str;

    /// Maximum points
    fn max_points(&self) -> u32;

    /// Evaluate a document
    fn evaluate(&self, doc: &Document) -> Evaluation;
}

impl fmt::Debug for dyn SubCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCheck")
            .field("name", &self.name())
            .field("max_points", &self.max_points())
            .finish()
    }
}

/// `max * min(count, target) / target`, rounded down
#[must_use]
pub fn capped(max: u32, count: usize, target: u32) -> u32 {
    if target == 0 {
        return max;
    }
    let count = u32::try_from(count).unwrap_or(u32::MAX).min(target);
    max * count / target
}

/// Partial credit: `floor` once the signal shows up at all, rising to `max`
/// at `target`; zero when the signal is absent
#[must_use]
pub fn floored(max: u32, floor: u32, count: usize, target: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    let floor = floor.min(max);
    floor + capped(max - floor, count, target)
}

/// Score of one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionScore {
    dimension: Dimension,
    score: u32,
    max_score: u32,
    details: IndexMap<String, String>,
    suggestions: Vec<String>,
}

impl DimensionScore {
    /// Create a dimension score
    ///
    /// # Errors
    ///
    /// [`ScoreError::OverMax`] when `score > max_score`.
    pub fn new(
        dimension: Dimension,
        score: u32,
        max_score: u32,
        details: IndexMap<String, String>,
        suggestions: Vec<String>,
    ) -> Result<Self, ScoreError> {
        if score > max_score {
            return Err(ScoreError::OverMax {
                dimension,
                score,
                max: max_score,
            });
        }
        Ok(Self {
            dimension,
            score,
            max_score,
            details,
            suggestions,
        })
    }

    #[inline]
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[inline]
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Sub-check name → detail, in evaluation order
    #[inline]
    #[must_use]
    pub fn details(&self) -> &IndexMap<String, String> {
        &self.details
    }

    #[inline]
    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }
}

/// Sub-checks of one dimension
#[derive(Debug)]
pub struct DimensionScorer {
    dimension: Dimension,
    checks: Vec<Box<dyn SubCheck>>,
}

impl DimensionScorer {
    /// Scorer with the standard sub-checks
    #[must_use]
    pub fn standard(dimension: Dimension) -> Self {
        Self {
            dimension,
            checks: dimension.standard_checks(),
        }
    }

    /// Replace the sub-check with the same name, or append it
    #[must_use]
    pub fn with_check(mut self, check: Box<dyn SubCheck>) -> Self {
        match self.checks.iter().position(|c| c.name() == check.name()) {
            Some(i) => self.checks[i] = check,
            None => self.checks.push(check),
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Sub-check names in evaluation order
    pub fn check_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|c| c.name())
    }

    /// Score a document
    ///
    /// # Errors
    ///
    /// [`ScoreError::OverMax`] when the sub-checks award more than
    /// [`DIMENSION_MAX`] points in total.
    pub fn score(&self, doc: &Document) -> Result<DimensionScore, ScoreError> {
        let mut total = 0;
        let mut details = IndexMap::new();
        let mut suggestions = Vec::new();

        for check in &self.checks {
            let max = check.max_points();
            let eval = check.evaluate(doc);
            let points = eval.points.min(max);

            details.insert(
                check.name().to_string(),
                format!("{} ({points}/{max})", eval.detail),
            );
            if points < max && !eval.suggestion.is_empty() {
                suggestions.push(eval.suggestion);
            }
            total += points;
        }

        DimensionScore::new(self.dimension, total, DIMENSION_MAX, details, suggestions)
    }
}

/// Scores documents across a selection of dimensions
#[derive(Debug)]
pub struct QualityScorer {
    dimensions: Vec<DimensionScorer>,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityScorer {
    /// Scorer over all four dimensions
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimensions: Dimension::ALL
                .into_iter()
                .map(DimensionScorer::standard)
                .collect(),
        }
    }

    /// Scorer over a subset of dimensions; duplicates are ignored
    ///
    /// # Errors
    ///
    /// [`ScoreError::NoDimensions`] for an empty selection.
    pub fn for_dimensions(selection: &[Dimension]) -> Result<Self, ScoreError> {
        if selection.is_empty() {
            return Err(ScoreError::NoDimensions);
        }
        let mut dimensions: Vec<DimensionScorer> = Vec::new();
        for &dimension in selection {
            if !dimensions.iter().any(|d| d.dimension == dimension) {
                dimensions.push(DimensionScorer::standard(dimension));
            }
        }
        Ok(Self { dimensions })
    }

    /// Swap in a sub-check for one selected dimension
    #[must_use]
    pub fn with_sub_check(mut self, dimension: Dimension, check: Box<dyn SubCheck>) -> Self {
        if let Some(position) = self.dimensions.iter().position(|d| d.dimension == dimension) {
            let scorer = self.dimensions.remove(position);
            self.dimensions.insert(position, scorer.with_check(check));
        }
        self
    }

    /// Selected dimensions in scoring order
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.dimensions.iter().map(DimensionScorer::dimension)
    }

    /// Score a document
    ///
    /// # Errors
    ///
    /// [`ScoreError`] when a sub-check set breaks the per-dimension bound.
    pub fn score(&self, doc: &Document) -> Result<ValidationReport, ScoreError> {
        let scores = self
            .dimensions
            .iter()
            .map(|d| d.score(doc))
            .collect::<Result<Vec<_>, _>>()?;

        let report = ValidationReport::new(doc.identifier(), Utc::now(), scores)?;
        tracing::info!(
            document = %report.spec_file(),
            total = report.total_score(),
            max = report.max_score(),
            status = %report.status(),
            "quality scored"
        );
        Ok(report)
    }
}
