//! Aggregate run report
//!
//! One [`TaskRecord`] per task that ran, in run order. Skipped validators
//! never appear; tasks cut off by stop-on-first-critical are listed by name
//! in `not_run`.

use crate::task::{Criticality, ValidatorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specgate_checks::quality::Status;
use specgate_checks::{Findings, ImprovementReport, Severity};
use std::fmt;

/// Category of issues recorded for timed-out commands
pub const TIMEOUT_CATEGORY: &str = "TIMEOUT";

/// Category of issues recorded for failed commands
pub const COMMAND_CATEGORY: &str = "COMMAND";

/// Verdict line of a passing run
pub const VERDICT_PASSED: &str = "All validations PASSED";

/// Verdict line of a failing run
pub const VERDICT_FAILED: &str = "Validation FAILED";

/// Outcome of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Passed,
    Failed,
    /// External command exceeded its timeout and was killed
    Timeout,
    /// The task could not run (spawn failure, unreadable inputs)
    Error,
}

impl TaskStatus {
    #[inline]
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Self::Passed
    }

    #[inline]
    #[must_use]
    pub fn from_pass(passed: bool) -> Self {
        if passed {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
        })
    }
}

/// Quality total carried by the quality task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub max: u32,
    pub status: Status,
}

impl ScoreSummary {
    /// Approval gate reached by this score
    #[must_use]
    pub fn gate(&self) -> &'static str {
        let at_least = |percent: u32| self.total * 100 >= self.max * percent;
        if at_least(90) {
            "READY FOR STANDARD APPROVAL"
        } else if at_least(85) {
            "CONDITIONAL APPROVAL"
        } else if at_least(80) {
            "EXTENDED APPROVAL POSSIBLE"
        } else {
            "REQUIRES IMPROVEMENT"
        }
    }
}

/// Result of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    /// `None` for external commands
    pub kind: Option<ValidatorKind>,
    pub criticality: Criticality,
    pub status: TaskStatus,
    /// Rendered validator output or captured command output
    pub output: String,
    pub issues: Findings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSummary>,
    pub duration_ms: u64,
}

impl TaskRecord {
    pub(crate) fn new(
        name: impl Into<String>,
        kind: Option<ValidatorKind>,
        criticality: Criticality,
        status: TaskStatus,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            criticality,
            status,
            output: String::new(),
            issues: Findings::new(),
            score: None,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub(crate) fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    #[must_use]
    pub(crate) fn with_issues(mut self, issues: Findings) -> Self {
        self.issues = issues;
        self
    }

    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status.is_pass()
    }

    /// Failed and critical
    #[inline]
    #[must_use]
    pub fn is_critical_failure(&self) -> bool {
        !self.passed() && self.criticality.is_critical()
    }
}

/// Aggregate report of one orchestrated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub spec_file: String,
    pub timestamp: DateTime<Utc>,
    pub strict: bool,
    pub records: Vec<TaskRecord>,
    /// Tasks not run after a critical failure stopped the sequence
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_run: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<ImprovementReport>,
    /// Failure of the improvement follow-up; never affects the verdict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_error: Option<String>,
}

impl RunReport {
    pub(crate) fn new(spec_file: impl Into<String>, strict: bool) -> Self {
        Self {
            spec_file: spec_file.into(),
            timestamp: Utc::now(),
            strict,
            records: Vec::new(),
            not_run: Vec::new(),
            suggestions: None,
            follow_up_error: None,
        }
    }

    /// Tasks that passed
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.passed()).count()
    }

    /// Tasks that did not pass, advisory ones included
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.records.len() - self.passed_count()
    }

    /// Critical tasks that did not pass
    pub fn critical_failures(&self) -> impl Iterator<Item = &TaskRecord> + '_ {
        self.records.iter().filter(|r| r.is_critical_failure())
    }

    /// No critical task failed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.critical_failures().next().is_none()
    }

    #[must_use]
    pub fn verdict(&self) -> &'static str {
        if self.passed() {
            VERDICT_PASSED
        } else {
            VERDICT_FAILED
        }
    }

    /// Record of a built-in validator, if it ran
    #[must_use]
    pub fn record(&self, kind: ValidatorKind) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.kind == Some(kind))
    }

    /// Quality score, if the quality task ran
    #[must_use]
    pub fn quality(&self) -> Option<ScoreSummary> {
        self.records.iter().find_map(|r| r.score)
    }

    /// # Errors
    ///
    /// Serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Failed tasks with their first `max_issues` blocking issues
    #[must_use]
    pub fn failure_summary(&self, max_issues: usize) -> String {
        let mut out = String::new();
        for record in self.records.iter().filter(|r| !r.passed()) {
            out.push_str(&format!(
                "{} {} ({})\n",
                record.name, record.status, record.criticality
            ));
            let blocking = record
                .issues
                .iter()
                .filter(|i| i.severity() != Severity::Info)
                .take(max_issues);
            for issue in blocking {
                out.push_str(&format!("  - {issue}\n"));
            }
        }
        out
    }

    /// Plain-text report
    #[must_use]
    pub fn render_console(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        out.push_str(&format!("{rule}\nSPEC VALIDATION: {}\n{rule}\n", self.spec_file));

        for record in &self.records {
            out.push_str(&format!(
                "\n{} [{}] {}\n{}\n",
                record.name,
                record.criticality,
                record.status,
                "-".repeat(60)
            ));
            let output = record.output.trim_end();
            if !output.is_empty() {
                out.push_str(&format!("{output}\n"));
            }
        }

        out.push_str(&format!("\n{rule}\nFINAL VALIDATION REPORT\n{rule}\n"));
        out.push_str(&format!(
            "Summary: {}/{} validations passed\n",
            self.passed_count(),
            self.records.len()
        ));
        if let Some(score) = self.quality() {
            out.push_str(&format!("Quality Score: {}/{} - {}\n", score.total, score.max, score.gate()));
        }
        for record in &self.records {
            out.push_str(&format!("  {}: {}\n", record.name, record.status));
        }
        if !self.not_run.is_empty() {
            out.push_str(&format!("Not run: {}\n", self.not_run.join(", ")));
        }
        if let Some(suggestions) = &self.suggestions {
            let high = suggestions
                .with_priority(specgate_checks::Priority::High)
                .count();
            out.push_str(&format!(
                "Improvement suggestions: {} ({high} high priority)\n",
                suggestions.len()
            ));
        }
        if let Some(error) = &self.follow_up_error {
            out.push_str(&format!("Improvement follow-up failed: {error}\n"));
        }
        out.push_str(&format!("\n{}\n", self.verdict()));
        out
    }

    /// Markdown report
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Validation Report\n\n");
        out.push_str(&format!("**Spec**: {}  \n", self.spec_file));
        out.push_str(&format!("**Date**: {}  \n", self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        out.push_str(&format!("**Verdict**: {}\n\n", self.verdict()));

        out.push_str("| Validator | Criticality | Status | Issues |\n");
        out.push_str("|-----------|-------------|--------|--------|\n");
        for record in &self.records {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                record.name,
                record.criticality,
                record.status,
                record.issues.len()
            ));
        }

        if let Some(score) = self.quality() {
            out.push_str(&format!(
                "\n**Quality Score**: {}/{} ({})\n",
                score.total,
                score.max,
                score.gate()
            ));
        }

        let failing: Vec<&TaskRecord> = self.records.iter().filter(|r| !r.passed()).collect();
        if !failing.is_empty() {
            out.push_str("\n## Failures\n\n");
            for record in failing {
                out.push_str(&format!("### {}\n\n", record.name));
                for issue in record.issues.iter() {
                    out.push_str(&format!("- {issue}\n"));
                }
                out.push('\n');
            }
        }

        if let Some(suggestions) = &self.suggestions {
            out.push_str(&format!("\n{}\n", suggestions.render_markdown()));
        }
        out
    }

    /// Short summary for `validation-summary.txt`
    #[must_use]
    pub fn summary_text(&self) -> String {
        let mut out = String::from("Validation Summary\n==================\n\n");
        out.push_str(&format!("Spec: {}\n", self.spec_file));
        out.push_str(&format!("Date: {}\n", self.timestamp.to_rfc3339()));
        out.push_str(&format!(
            "Results: {}/{} passed\n",
            self.passed_count(),
            self.records.len()
        ));
        if let Some(score) = self.quality() {
            out.push_str(&format!("Quality Score: {}/{}\n", score.total, score.max));
        }
        out.push_str(&format!("Verdict: {}\n", self.verdict()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specgate_checks::{category, Issue};

    fn record(name: &str, criticality: Criticality, status: TaskStatus) -> TaskRecord {
        TaskRecord::new(name, None, criticality, status)
    }

    #[test]
    fn advisory_failures_do_not_flip_the_verdict() {
        let mut report = RunReport::new("SPEC.md", false);
        report.records.push(record("structure", Criticality::Critical, TaskStatus::Passed));
        report.records.push(record("alignment", Criticality::Advisory, TaskStatus::Failed));

        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.passed());
        assert_eq!(report.verdict(), VERDICT_PASSED);

        report.records.push(record("lint", Criticality::Critical, TaskStatus::Timeout));
        assert!(!report.passed());
        assert_eq!(report.verdict(), VERDICT_FAILED);
        assert!(report.render_console().ends_with("Validation FAILED\n"));
    }

    #[test]
    fn failure_summary_lists_first_issues() {
        let mut issues = Findings::new();
        for n in 0..4 {
            issues.push(Issue::error(category::STRUCTURE, format!("problem {n}")));
        }
        issues.push(Issue::info(category::MODULAR, "No modular spec files found"));

        let mut report = RunReport::new("SPEC.md", false);
        report.records.push(
            record("Structure Validation", Criticality::Critical, TaskStatus::Failed)
                .with_issues(issues),
        );

        let summary = report.failure_summary(2);
        assert!(summary.starts_with("Structure Validation FAILED (critical)"));
        assert!(summary.contains("problem 1"));
        assert!(!summary.contains("problem 2"));
        assert!(!summary.contains("modular"));
    }

    #[test]
    fn quality_gates() {
        let gate = |total| {
            ScoreSummary {
                total,
                max: 100,
                status: Status::Ready,
            }
            .gate()
        };
        assert_eq!(gate(92), "READY FOR STANDARD APPROVAL");
        assert_eq!(gate(85), "CONDITIONAL APPROVAL");
        assert_eq!(gate(80), "EXTENDED APPROVAL POSSIBLE");
        assert_eq!(gate(79), "REQUIRES IMPROVEMENT");
    }

    #[test]
    fn json_names_statuses_in_upper_case() {
        let mut report = RunReport::new("SPEC.md", true);
        report.records.push(record("lint", Criticality::Advisory, TaskStatus::Timeout));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"status\": \"TIMEOUT\""));
        assert!(json.contains("\"criticality\": \"advisory\""));

        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
