//! Requirement traceability
//!
//! Every declared requirement must be referenced, by its literal identifier
//! token, from the collaborating parts of the specification:
//!
//! - `architecture`: inside the "System Architecture" section
//! - `acceptance`: anywhere outside its own declaration heading, or in a
//!   sibling acceptance-scenario file
//! - `risk`: inside the "Risks" section, for high-risk requirements only
//!
//! Functional requirements without an architecture trace are errors; every
//! other gap is a warning.

use crate::issue::{category, Findings, Issue};
use serde::{Deserialize, Serialize};
use specgate_document::{contains_token, Document, Requirement, RequirementKind, TraceKind};
use std::path::PathBuf;

/// Sibling acceptance-scenario files, relative to the document directory
pub const ACCEPTANCE_PATHS: [&str; 3] = [
    ".spec/acceptance-scenarios.md",
    "requirements/acceptance-scenarios.md",
    "acceptance-scenarios.md",
];

/// Section holding architecture traces (level ≤ 2, title prefix)
pub const ARCHITECTURE_SECTION: &str = "System Architecture";

/// Section holding risk traces (level ≤ 2, title prefix)
pub const RISK_SECTION: &str = "Risk";

/// Traceability options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    /// Acceptance files probed beside the document; missing ones are skipped
    pub acceptance_paths: Vec<PathBuf>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            acceptance_paths: ACCEPTANCE_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl TraceOptions {
    /// Replace the probed acceptance paths
    #[must_use]
    pub fn with_acceptance_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.acceptance_paths = paths.into_iter().map(Into::into).collect();
        self
    }
}

/// One row of the traceability matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRow {
    pub id: String,
    pub kind: RequirementKind,
    pub architecture: bool,
    pub acceptance: bool,
    /// `None` when the requirement is not high-risk
    pub risk: Option<bool>,
}

impl TraceRow {
    fn from_requirement(req: &Requirement) -> Self {
        let traces = req.traces();
        Self {
            id: req.id.clone(),
            kind: req.kind,
            architecture: traces.is_set(TraceKind::Architecture),
            acceptance: traces.is_set(TraceKind::Acceptance),
            risk: req
                .is_high_risk()
                .then(|| traces.is_set(TraceKind::Risk)),
        }
    }

    /// Risk cell as rendered in reports
    #[must_use]
    pub fn risk_label(&self) -> &'static str {
        match self.risk {
            Some(true) => "yes",
            Some(false) => "no",
            None => "N/A",
        }
    }
}

/// Traceability totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub total: usize,
    pub architecture: usize,
    pub acceptance: usize,
    pub high_risk: usize,
    pub risk_addressed: usize,
}

impl TraceSummary {
    fn from_rows(rows: &[TraceRow]) -> Self {
        Self {
            total: rows.len(),
            architecture: rows.iter().filter(|r| r.architecture).count(),
            acceptance: rows.iter().filter(|r| r.acceptance).count(),
            high_risk: rows.iter().filter(|r| r.risk.is_some()).count(),
            risk_addressed: rows.iter().filter(|r| r.risk == Some(true)).count(),
        }
    }

    /// Share of `count` in the total, as a whole percentage
    #[must_use]
    pub fn percent(&self, count: usize) -> usize {
        count * 100 / self.total.max(1)
    }
}

/// Traceability result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceReport {
    pub issues: Findings,
    pub matrix: Vec<TraceRow>,
    pub summary: TraceSummary,
}

impl TraceReport {
    /// ERRORs fail; WARNINGs fail only when `strict`
    #[inline]
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.issues.passes(strict)
    }

    /// Matrix row for one requirement
    #[must_use]
    pub fn row(&self, id: &str) -> Option<&TraceRow> {
        self.matrix.iter().find(|r| r.id == id)
    }

    /// Plain-text summary and matrix
    #[must_use]
    pub fn render_console(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        out.push_str("Traceability Summary:\n");
        out.push_str(&format!("  Total requirements: {}\n", s.total));
        out.push_str(&format!(
            "  Traced to architecture: {} ({}%)\n",
            s.architecture,
            s.percent(s.architecture)
        ));
        out.push_str(&format!(
            "  Have acceptance scenarios: {} ({}%)\n",
            s.acceptance,
            s.percent(s.acceptance)
        ));
        out.push_str(&format!("  High-risk addressed: {}/{}\n", s.risk_addressed, s.high_risk));

        out.push_str(&format!(
            "\n  {:<11} | {:<12} | {:<10} | Risk\n",
            "Requirement", "Architecture", "Acceptance"
        ));
        out.push_str(&format!("  {}\n", "-".repeat(50)));
        for row in &self.matrix {
            out.push_str(&format!(
                "  {:<11} | {:<12} | {:<10} | {}\n",
                row.id,
                yes_no(row.architecture),
                yes_no(row.acceptance),
                row.risk_label()
            ));
        }
        out
    }

    /// Markdown matrix
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("| Requirement | Architecture | Acceptance | Risk |\n");
        out.push_str("|-------------|--------------|------------|------|\n");
        for row in &self.matrix {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.id,
                yes_no(row.architecture),
                yes_no(row.acceptance),
                row.risk_label()
            ));
        }
        out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Traceability validator
#[derive(Debug, Clone, Default)]
pub struct TraceabilityValidator {
    options: TraceOptions,
}

impl TraceabilityValidator {
    /// Create validator with options
    #[must_use]
    pub fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    /// Trace every requirement of a document
    #[must_use]
    pub fn validate(&self, doc: &Document) -> TraceReport {
        let mut requirements: Vec<Requirement> =
            doc.features().requirements.values().cloned().collect();
        let mut issues = Findings::new();

        if requirements.is_empty() {
            issues.push(Issue::info(category::TRACEABILITY, "No requirements declared"));
            return TraceReport {
                issues,
                ..TraceReport::default()
            };
        }

        let architecture = doc.section(ARCHITECTURE_SECTION, 2);
        let risks = doc.section(RISK_SECTION, 2);
        let acceptance_files = self.acceptance_texts(doc);

        for req in &mut requirements {
            if architecture.is_some_and(|s| s.contains_token(&req.id)) {
                req.mark_traced(TraceKind::Architecture);
            }

            let in_document = doc
                .lines()
                .iter()
                .enumerate()
                .any(|(i, line)| i + 1 != req.line && contains_token(line, &req.id));
            if in_document || acceptance_files.iter().any(|text| contains_token(text, &req.id)) {
                req.mark_traced(TraceKind::Acceptance);
            }

            if req.is_high_risk() && risks.is_some_and(|s| s.contains_token(&req.id)) {
                req.mark_traced(TraceKind::Risk);
            }
        }

        for req in &requirements {
            coverage_issues(req, &mut issues);
        }

        let matrix: Vec<TraceRow> = requirements.iter().map(TraceRow::from_requirement).collect();
        let summary = TraceSummary::from_rows(&matrix);
        tracing::info!(
            document = %doc.identifier(),
            requirements = summary.total,
            architecture = summary.architecture,
            acceptance = summary.acceptance,
            issues = issues.len(),
            "traceability checked"
        );

        TraceReport {
            issues,
            matrix,
            summary,
        }
    }

    fn acceptance_texts(&self, doc: &Document) -> Vec<String> {
        let Some(dir) = doc.directory() else {
            return Vec::new();
        };
        self.options
            .acceptance_paths
            .iter()
            .map(|relative| dir.join(relative))
            .filter(|path| path.is_file())
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "acceptance scenarios loaded");
                    Some(text)
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "acceptance file unreadable");
                    None
                }
            })
            .collect()
    }
}

fn coverage_issues(req: &Requirement, issues: &mut Findings) {
    let traces = req.traces();
    let id = &req.id;

    match req.kind {
        RequirementKind::Functional => {
            if !traces.is_set(TraceKind::Architecture) {
                issues.push(
                    Issue::error(
                        category::TRACEABILITY,
                        format!("Functional requirement {id} not traced to architecture"),
                    )
                    .at_line(req.line),
                );
            }
            if !traces.is_set(TraceKind::Acceptance) {
                issues.push(
                    Issue::warning(
                        category::TRACEABILITY,
                        format!("Functional requirement {id} lacks acceptance scenarios"),
                    )
                    .at_line(req.line),
                );
            }
        }
        RequirementKind::NonFunctional => {
            if !traces.is_set(TraceKind::Architecture) {
                issues.push(
                    Issue::warning(
                        category::TRACEABILITY,
                        format!("Non-functional requirement {id} not traced to architecture"),
                    )
                    .at_line(req.line),
                );
            }
        }
    }

    if req.is_high_risk() && !traces.is_set(TraceKind::Risk) {
        issues.push(
            Issue::warning(
                category::TRACEABILITY,
                format!("High-risk requirement {id} not addressed in risk section"),
            )
            .at_line(req.line),
        );
    }
}
