//! Sequential validation runner
//!
//! Runs the built-in validators in their fixed order, then the configured
//! external commands, and folds the results into one [`RunReport`].

use crate::command::{build_runtime, run_command};
use crate::config::ValidationConfig;
use crate::error::OrchestratorError;
use crate::report::{RunReport, ScoreSummary, TaskRecord, TaskStatus};
use crate::task::{CommandSpec, ValidatorKind};
use specgate_checks::alignment::{project_root_for, Layout};
use specgate_checks::{
    category, AlignmentValidator, Findings, ImprovementAnalyzer, Issue, LinkValidator,
    StructureValidator, TraceabilityValidator,
};
use specgate_document::Document;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Category of quality-gate issues
const QUALITY_CATEGORY: &str = "Quality";

/// Validation orchestrator
///
/// Holds the configuration and a cancellation flag shared with the caller.
/// Setting the flag aborts the run at the next task boundary.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: ValidationConfig,
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Create orchestrator with configuration
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing cancellation flag
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that cancels the run when set
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Load a document and run every planned task
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Document`] if the document cannot be read, plus
    /// the errors of [`Orchestrator::run`].
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<RunReport, OrchestratorError> {
        let doc = Document::load(path)?;
        self.run(&doc)
    }

    /// Run every planned task against a document
    ///
    /// # Errors
    ///
    /// - [`OrchestratorError::Cancelled`] when the cancel flag is set; no
    ///   partial report is returned
    /// - [`OrchestratorError::Runtime`] when commands are configured but the
    ///   async runtime cannot start
    pub fn run(&self, doc: &Document) -> Result<RunReport, OrchestratorError> {
        let mut report = RunReport::new(doc.identifier(), self.config.strict);
        let validators = self.planned_validators(doc);
        let commands = &self.config.commands;
        tracing::info!(
            document = %report.spec_file,
            validators = validators.len(),
            commands = commands.len(),
            "validation run started"
        );

        let mut stopped = false;
        for (position, &kind) in validators.iter().enumerate() {
            self.check_cancelled()?;
            let record = self.run_validator(kind, doc);
            stopped = self.push(&mut report, record);
            if stopped {
                report.not_run = validators[position + 1..]
                    .iter()
                    .map(|k| k.title().to_string())
                    .chain(commands.iter().map(|c| c.name.clone()))
                    .collect();
                break;
            }
        }

        if !stopped && !commands.is_empty() {
            let runtime = build_runtime()?;
            let document = doc
                .path()
                .map_or_else(|| doc.identifier(), |p| p.display().to_string());

            for (position, command) in commands.iter().enumerate() {
                self.check_cancelled()?;
                let record = self.run_external(&runtime, command, &document);
                if self.push(&mut report, record) {
                    report.not_run = commands[position + 1..]
                        .iter()
                        .map(|c| c.name.clone())
                        .collect();
                    break;
                }
            }
        }

        self.check_cancelled()?;
        if !report.passed() && self.config.suggest_improvements {
            self.follow_up(doc, &mut report);
        }

        tracing::info!(
            document = %report.spec_file,
            passed = report.passed_count(),
            failed = report.failed_count(),
            verdict = report.verdict(),
            "validation run finished"
        );
        Ok(report)
    }

    /// Run one built-in validator on its own
    ///
    /// Skip lists and project detection do not apply; alignment on a
    /// document outside a project layout records an `ERROR` task.
    #[must_use]
    pub fn run_validator(&self, kind: ValidatorKind, doc: &Document) -> TaskRecord {
        let started = Instant::now();
        let strict = self.config.strict;
        let record = TaskRecord::new(
            kind.title(),
            Some(kind),
            self.config.criticality_of(kind),
            TaskStatus::Passed,
        );

        let mut record = match kind {
            ValidatorKind::Structure => {
                let findings =
                    StructureValidator::new(self.config.structure_options()).validate(doc);
                let output = render_findings(&findings, "No structural issues found");
                finish(record, findings.passes(strict), output, findings)
            }
            ValidatorKind::Links => {
                let links = LinkValidator::new().validate(doc);
                let mut output = links.summary();
                output.push('\n');
                output.push_str(&render_findings(&links.issues, "All links valid"));
                finish(record, links.passes(strict), output, links.issues)
            }
            ValidatorKind::Quality => match self.config.quality_scorer().and_then(|s| s.score(doc)) {
                Ok(quality) => {
                    let ready = quality.is_ready();
                    let mut issues = Findings::new();
                    if !ready {
                        issues.push(Issue::error(
                            QUALITY_CATEGORY,
                            format!(
                                "Quality score {}/{} is below the 90% target",
                                quality.total_score(),
                                quality.max_score()
                            ),
                        ));
                    }
                    for suggestion in quality.suggestions() {
                        issues.push(Issue::info(QUALITY_CATEGORY, suggestion));
                    }
                    let mut record = finish(record, ready, quality.render_console(), issues);
                    record.score = Some(ScoreSummary {
                        total: quality.total_score(),
                        max: quality.max_score(),
                        status: quality.status(),
                    });
                    record
                }
                Err(e) => errored(record, QUALITY_CATEGORY, e.to_string()),
            },
            ValidatorKind::Traceability => {
                let trace = TraceabilityValidator::new(self.config.trace_options()).validate(doc);
                finish(record, trace.passes(strict), trace.render_console(), trace.issues)
            }
            ValidatorKind::Alignment => match project_root(doc) {
                Some(root) => match AlignmentValidator::new().validate(&root) {
                    Ok(alignment) => finish(
                        record,
                        alignment.passes(strict),
                        alignment.render_console(),
                        alignment.findings(),
                    ),
                    Err(e) => errored(record, category::ALIGNMENT, e.to_string()),
                },
                None => errored(
                    record,
                    category::ALIGNMENT,
                    format!("No project layout found for {}", doc.identifier()),
                ),
            },
        };

        record.duration_ms = elapsed_ms(started);
        record
    }

    fn run_external(
        &self,
        runtime: &tokio::runtime::Runtime,
        command: &CommandSpec,
        document: &str,
    ) -> TaskRecord {
        let started = Instant::now();
        tracing::debug!(
            command = %command.name,
            program = %command.program,
            "running external validator"
        );
        let timeout = self.config.timeout_for(command);
        let mut record = runtime.block_on(run_command(command, document, timeout));
        record.duration_ms = elapsed_ms(started);
        record
    }

    /// Validators to run, in order, after skips and project detection
    fn planned_validators(&self, doc: &Document) -> Vec<ValidatorKind> {
        ValidatorKind::ALL
            .into_iter()
            .filter(|&kind| {
                if self.config.is_skipped(kind) {
                    tracing::debug!(validator = %kind, "skipped by configuration");
                    return false;
                }
                if kind == ValidatorKind::Alignment && project_root(doc).is_none() {
                    tracing::debug!("alignment skipped: no project layout detected");
                    return false;
                }
                true
            })
            .collect()
    }

    /// Append a record; true when the run must stop
    fn push(&self, report: &mut RunReport, record: TaskRecord) -> bool {
        tracing::info!(
            task = %record.name,
            status = %record.status,
            criticality = %record.criticality,
            duration_ms = record.duration_ms,
            "task finished"
        );
        let stop = self.config.stop_on_first_critical && record.is_critical_failure();
        if stop {
            tracing::warn!(task = %record.name, "critical failure, stopping run");
        }
        report.records.push(record);
        stop
    }

    fn check_cancelled(&self) -> Result<(), OrchestratorError> {
        if self.cancel.load(Ordering::SeqCst) {
            tracing::warn!("validation run cancelled");
            return Err(OrchestratorError::Cancelled);
        }
        Ok(())
    }

    /// Improvement analysis after a failed run; never changes the verdict
    fn follow_up(&self, doc: &Document, report: &mut RunReport) {
        let suggestions = ImprovementAnalyzer::new().analyze(doc);
        if let Some(path) = &self.config.suggestions_file {
            if let Err(e) = std::fs::write(path, suggestions.render_markdown()) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not write improvement suggestions"
                );
                report.follow_up_error = Some(format!("could not write {}: {e}", path.display()));
            }
        }
        report.suggestions = Some(suggestions);
    }
}

/// Project root of a document on disk, if it sits in a full project layout
fn project_root(doc: &Document) -> Option<PathBuf> {
    doc.path()
        .and_then(project_root_for)
        .filter(|root| Layout::discover(root).is_project())
}

fn finish(mut record: TaskRecord, passed: bool, output: String, issues: Findings) -> TaskRecord {
    record.status = TaskStatus::from_pass(passed);
    record.with_output(output).with_issues(issues)
}

fn errored(record: TaskRecord, category: &str, message: String) -> TaskRecord {
    tracing::warn!(task = %record.name, error = %message, "validator could not run");
    let mut issues = Findings::new();
    issues.push(Issue::error(category, message.as_str()));
    let mut record = record.with_output(message).with_issues(issues);
    record.status = TaskStatus::Error;
    record
}

fn render_findings(findings: &Findings, clean: &str) -> String {
    if findings.is_empty() {
        return clean.to_string();
    }
    let mut out = String::new();
    for issue in findings.iter() {
        out.push_str(&format!("{issue}\n"));
    }
    out
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Criticality;
    use specgate_test_utils::{SpecFixture, FULL_SPEC};

    #[test]
    fn full_spec_passes_every_in_memory_validator() {
        let report = Orchestrator::default().run(&Document::parse(FULL_SPEC)).unwrap();
        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Structure Validation",
                "Link Validation",
                "Quality Scoring",
                "Requirements Traceability"
            ]
        );
        assert!(report.passed(), "{}", report.render_console());
        assert!(report.suggestions.is_none());
    }

    #[test]
    fn critical_failure_fails_and_suggests() {
        let doc = Document::parse(SpecFixture::new().without_section("Stakeholders").build());
        let report = Orchestrator::default().run(&doc).unwrap();

        assert!(!report.passed());
        assert_eq!(report.verdict(), "Validation FAILED");
        assert!(!report.record(ValidatorKind::Structure).unwrap().passed());
        assert!(report.suggestions.is_some());
    }

    #[test]
    fn advisory_override_keeps_the_verdict() {
        let config = ValidationConfig::new()
            .with_only(&[ValidatorKind::Quality])
            .with_criticality(ValidatorKind::Quality, Criticality::Advisory);
        let doc = Document::parse(SpecFixture::new().build());
        let report = Orchestrator::new(config).run(&doc).unwrap();

        assert_eq!(report.failed_count(), 1);
        assert!(report.passed());
        assert!(report.quality().is_some());
    }

    #[test]
    fn stop_on_first_critical_lists_the_rest() {
        let config = ValidationConfig::new()
            .with_stop_on_first_critical(true)
            .with_suggestions(false);
        let doc = Document::parse(SpecFixture::new().without_section("Stakeholders").build());
        let report = Orchestrator::new(config).run(&doc).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(
            report.not_run,
            vec!["Link Validation", "Quality Scoring", "Requirements Traceability"]
        );
        assert!(report.suggestions.is_none());
    }

    #[test]
    fn cancelled_run_returns_no_report() {
        let orchestrator = Orchestrator::default();
        orchestrator.cancel_flag().store(true, Ordering::SeqCst);
        assert!(matches!(
            orchestrator.run(&Document::parse(FULL_SPEC)),
            Err(OrchestratorError::Cancelled)
        ));
    }

    #[test]
    fn alignment_without_layout_is_an_error_record() {
        let record = Orchestrator::default()
            .run_validator(ValidatorKind::Alignment, &Document::parse(FULL_SPEC));
        assert_eq!(record.status, TaskStatus::Error);
        assert!(!record.is_critical_failure());
    }
}
