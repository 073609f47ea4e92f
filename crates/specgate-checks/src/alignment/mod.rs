//! Cross-document alignment
//!
//! A project is a spec (`spec/SPEC.md` or `SPEC.md`), a roadmap
//! (`*roadmap*.md` anywhere under the root) and optional phase plans
//! (`phase-plans/*.yml`). Facts are pulled from each and compared:
//!
//! 1. the first spec requirements share a keyword with the roadmap
//! 2. every roadmap phase has a plan
//! 3. plans reuse the spec's frontend/backend technologies
//! 4. plan durations add up to the spec timeline (±2 weeks)
//! 5. no plan needs a bigger team than the spec mentions
//!
//! A missing spec or roadmap aborts the run. Everything else is a warning.

mod checks;
mod discovery;
mod facts;

pub use checks::TIMELINE_TOLERANCE_WEEKS;
pub use discovery::{project_root_for, Layout, PHASE_PLANS_DIR};
pub use facts::{tech_names, Phase, PhasePlan, RoadmapFacts, SpecFacts, TechStack, Timeline};

use crate::error::AlignmentError;
use crate::issue::{category, Findings, Issue};
use serde::{Deserialize, Serialize};
use specgate_document::{Document, DocumentError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Warnings tolerated before a project needs review
pub const MAX_ALIGNED_WARNINGS: usize = 5;

/// Verdict of an alignment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No errors and fewer than five warnings
    Aligned,
    /// No errors, but enough warnings to warrant a review
    NeedsReview,
    /// The spec or the roadmap is missing
    Aborted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aligned => "Documents are well-aligned",
            Self::NeedsReview => "Alignment issues found - review warnings",
            Self::Aborted => "Alignment aborted",
        })
    }
}

/// Which documents contributed facts to one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub component: String,
    pub spec: bool,
    /// `None` when roadmaps never carry this component
    pub roadmap: Option<bool>,
    pub phase_plans: bool,
}

/// Facts, errors and warnings of one alignment run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub root: PathBuf,
    pub spec_path: Option<PathBuf>,
    pub roadmap_path: Option<PathBuf>,
    pub spec: SpecFacts,
    pub roadmap: RoadmapFacts,
    pub phase_plans: Vec<PhasePlan>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl AlignmentRecord {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    /// Derived verdict
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if !self.errors.is_empty() {
            Outcome::Aborted
        } else if self.warnings.len() < MAX_ALIGNED_WARNINGS {
            Outcome::Aligned
        } else {
            Outcome::NeedsReview
        }
    }

    /// Errors fail, as do [`MAX_ALIGNED_WARNINGS`] or more warnings; under
    /// `strict` any warning fails
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.outcome() == Outcome::Aligned && (!strict || self.warnings.is_empty())
    }

    /// Errors and warnings as issues
    #[must_use]
    pub fn findings(&self) -> Findings {
        let errors = self
            .errors
            .iter()
            .map(|e| Issue::error(category::ALIGNMENT, e.as_str()));
        let warnings = self
            .warnings
            .iter()
            .map(|w| Issue::warning(category::ALIGNMENT, w.as_str()));
        errors.chain(warnings).collect()
    }

    /// Per-component provenance of the extracted facts
    #[must_use]
    pub fn matrix(&self) -> Vec<MatrixRow> {
        let plans = &self.phase_plans;
        let row = |component: &str, spec: bool, roadmap: Option<bool>, phase_plans: bool| MatrixRow {
            component: component.to_string(),
            spec,
            roadmap,
            phase_plans,
        };
        vec![
            row(
                "Requirements",
                !self.spec.requirements.is_empty(),
                Some(self.roadmap.phases.iter().any(|p| !p.deliverables.is_empty())),
                plans.iter().any(|p| !p.objectives.is_empty()),
            ),
            row(
                "Tech Stack",
                !self.spec.tech_stack.is_empty(),
                None,
                plans.iter().any(|p| p.frontend.is_some() || p.backend.is_some()),
            ),
            row(
                "Timeline",
                self.spec.timeline.is_some(),
                Some(!self.roadmap.phases.is_empty()),
                plans.iter().any(|p| p.duration_weeks > 0),
            ),
            row(
                "Resources",
                self.spec.team_size.is_some(),
                None,
                plans.iter().any(|p| p.team_size > 0),
            ),
        ]
    }

    /// Plain-text report
    #[must_use]
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        out.push_str("Alignment Summary:\n");
        out.push_str(&format!(
            "  Documents analyzed: SPEC, Roadmap, {} phase plans\n",
            self.phase_plans.len()
        ));
        out.push_str(&format!("  Errors found: {}\n", self.errors.len()));
        out.push_str(&format!("  Warnings found: {}\n", self.warnings.len()));

        for (title, list) in [("ERRORS", &self.errors), ("WARNINGS", &self.warnings)] {
            if !list.is_empty() {
                out.push_str(&format!("\n{title} ({}):\n", list.len()));
                for item in list {
                    out.push_str(&format!("  - {item}\n"));
                }
            }
        }

        out.push_str(&format!("\n  {:<12} | SPEC | Roadmap | Phase Plans\n", "Component"));
        out.push_str(&format!("  {}\n", "-".repeat(46)));
        for row in self.matrix() {
            out.push_str(&format!(
                "  {:<12} | {:<4} | {:<7} | {}\n",
                row.component,
                mark(Some(row.spec)),
                mark(row.roadmap),
                mark(Some(row.phase_plans))
            ));
        }
        out.push_str(&format!("\n{}\n", self.outcome()));
        out
    }

    /// Markdown report
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = format!("## Alignment\n\n**Outcome:** {}\n", self.outcome());
        for item in &self.errors {
            out.push_str(&format!("- **ERROR** {item}\n"));
        }
        for item in &self.warnings {
            out.push_str(&format!("- WARNING {item}\n"));
        }
        out.push_str("\n| Component | SPEC | Roadmap | Phase Plans |\n|---|---|---|---|\n");
        for row in self.matrix() {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.component,
                mark(Some(row.spec)),
                mark(row.roadmap),
                mark(Some(row.phase_plans))
            ));
        }
        out
    }
}

fn mark(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

/// Alignment validator over a project root
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentValidator;

impl AlignmentValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Discover and compare the project documents
    ///
    /// Missing documents are recorded in the returned record, not raised.
    ///
    /// # Errors
    ///
    /// A discovered document exists but cannot be read.
    pub fn validate(&self, root: &Path) -> Result<AlignmentRecord, AlignmentError> {
        let mut record = AlignmentRecord::new(root);

        if !root.is_dir() {
            return Err(AlignmentError::scan(root, "not a directory"));
        }
        let layout = Layout::discover(root);

        let Some(spec_path) = layout.spec.clone() else {
            record
                .errors
                .push(format!("SPEC.md not found in {}", root.display()));
            tracing::warn!(root = %root.display(), "alignment aborted: no spec");
            return Ok(record);
        };
        let Some(roadmap_path) = layout.roadmaps.first().cloned() else {
            record.errors.push("No roadmap file found".to_string());
            tracing::warn!(root = %root.display(), "alignment aborted: no roadmap");
            return Ok(record);
        };
        if layout.roadmaps.len() > 1 {
            record.warnings.push(format!(
                "Multiple roadmap files found, using {}",
                display_relative(root, &roadmap_path)
            ));
        }
        if layout.phase_plans_dir.is_none() {
            record.warnings.push("No phase-plans directory found".to_string());
        }

        record.spec = SpecFacts::extract(&Document::load(&spec_path)?);
        record.roadmap = RoadmapFacts::extract(&read(&roadmap_path)?);
        record.spec_path = Some(spec_path);
        record.roadmap_path = Some(roadmap_path);

        for path in &layout.phase_plans {
            match PhasePlan::parse(path, &read(path)?) {
                Ok(plan) => record.phase_plans.push(plan),
                Err(err) => record.warnings.push(format!(
                    "Could not parse {}: {err}",
                    display_name(path)
                )),
            }
        }

        checks::requirements_in_roadmap(&record.spec, &record.roadmap, &mut record.warnings);
        checks::phases_have_plans(&record.roadmap, &record.phase_plans, &mut record.warnings);
        checks::tech_stack_consistent(&record.spec, &record.phase_plans, &mut record.warnings);
        checks::timeline_consistent(&record.spec, &record.phase_plans, &mut record.warnings);
        checks::resources_consistent(&record.spec, &record.phase_plans, &mut record.warnings);

        tracing::info!(
            root = %root.display(),
            phases = record.roadmap.phases.len(),
            phase_plans = record.phase_plans.len(),
            warnings = record.warnings.len(),
            outcome = ?record.outcome(),
            "alignment checked"
        );
        Ok(record)
    }
}

fn read(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|e| DocumentError::io_error(path, e))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
