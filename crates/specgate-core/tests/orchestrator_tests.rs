use pretty_assertions::assert_eq;
use specgate_core::{
    CommandSpec, Criticality, Orchestrator, OrchestratorError, TaskStatus, ValidationConfig,
    ValidatorKind, TIMEOUT_CATEGORY,
};
use specgate_test_utils::{roadmap, PhasePlanFixture, ProjectFixture, SpecFixture, FULL_SPEC};

fn project() -> ProjectFixture {
    let project = ProjectFixture::new();
    project.spec(FULL_SPEC);
    project.roadmap(&roadmap(&[
        (1, "Order capture", "order capture, order search and audit trail"),
        (2, "Billing", "invoice export and shipping notices"),
    ]));
    for phase in [1, 2] {
        project.phase_plan(
            &PhasePlanFixture::new(phase, 12, 5)
                .backend(&["Rust", "Axum"])
                .frontend(&["React"]),
        );
    }
    project
}

#[test]
fn project_layout_adds_alignment() {
    let project = project();
    let report = Orchestrator::default()
        .run_path(project.root().join("spec/SPEC.md"))
        .unwrap();

    let kinds: Vec<ValidatorKind> = report.records.iter().filter_map(|r| r.kind).collect();
    assert_eq!(kinds, ValidatorKind::ALL.to_vec());
    assert!(report.passed(), "{}", report.render_console());
    assert_eq!(report.verdict(), "All validations PASSED");
    assert_eq!(report.passed_count(), 5);
}

#[test]
fn alignment_failure_is_advisory() {
    let project = project();
    project.phase_plan(&PhasePlanFixture::new(2, 12, 9).backend(&["Rust"]));

    let config = ValidationConfig::new().with_strict(true);
    let report = Orchestrator::new(config)
        .run_path(project.root().join("spec/SPEC.md"))
        .unwrap();

    let alignment = report.record(ValidatorKind::Alignment).unwrap();
    assert_eq!(alignment.status, TaskStatus::Failed);
    assert_eq!(alignment.criticality, Criticality::Advisory);
    assert!(report.critical_failures().all(|r| r.kind != Some(ValidatorKind::Alignment)));
}

#[test]
fn alignment_with_many_warnings_fails_without_strict() {
    let project = ProjectFixture::new();
    project.spec(FULL_SPEC);
    project.roadmap(&roadmap(&[
        (1, "A", "x"),
        (2, "B", "y"),
        (3, "C", "z"),
        (4, "D", "w"),
        (5, "E", "v"),
    ]));
    std::fs::create_dir_all(project.root().join("phase-plans")).unwrap();

    let report = Orchestrator::default()
        .run_path(project.root().join("spec/SPEC.md"))
        .unwrap();
    let alignment = report.record(ValidatorKind::Alignment).unwrap();
    assert_eq!(alignment.status, TaskStatus::Failed);
    assert!(!alignment.is_critical_failure());
}

#[test]
fn skipped_validators_contribute_nothing() {
    let project = project();
    let config = ValidationConfig::new().with_skip([ValidatorKind::Alignment, ValidatorKind::Links]);
    let report = Orchestrator::new(config)
        .run_path(project.root().join("spec/SPEC.md"))
        .unwrap();

    assert_eq!(report.records.len(), 3);
    assert!(report.record(ValidatorKind::Links).is_none());
    assert!(report.record(ValidatorKind::Alignment).is_none());
}

#[test]
fn missing_document_is_fatal() {
    let project = ProjectFixture::new();
    let err = Orchestrator::default()
        .run_path(project.root().join("SPEC.md"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn config_beside_document_applies() {
    let project = ProjectFixture::new();
    let spec = project.file("SPEC.md", &SpecFixture::new().build());
    project.file("specgate.toml", "skip = [\"quality\", \"traceability\"]\n");

    let config = ValidationConfig::for_document(&spec, None).unwrap();
    let report = Orchestrator::new(config).run_path(&spec).unwrap();
    let kinds: Vec<ValidatorKind> = report.records.iter().filter_map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ValidatorKind::Structure, ValidatorKind::Links]);
}

#[test]
fn follow_up_failure_keeps_the_verdict() {
    let project = ProjectFixture::new();
    let spec = project.file("SPEC.md", &SpecFixture::new().without_section("Stakeholders").build());
    let unwritable = project.root().join("missing-dir").join("suggestions.md");

    let config = ValidationConfig::new()
        .with_only(&[ValidatorKind::Structure])
        .with_suggestions_file(&unwritable);
    let report = Orchestrator::new(config).run_path(&spec).unwrap();

    assert!(!report.passed());
    assert!(report.suggestions.is_some());
    assert!(report.follow_up_error.is_some());
    assert_eq!(report.verdict(), "Validation FAILED");
}

#[test]
fn suggestions_are_written_on_failure() {
    let project = ProjectFixture::new();
    let spec = project.file("SPEC.md", &SpecFixture::new().without_section("Stakeholders").build());
    let target = project.root().join("suggestions.md");

    let config = ValidationConfig::new()
        .with_only(&[ValidatorKind::Structure])
        .with_suggestions_file(&target);
    Orchestrator::new(config).run_path(&spec).unwrap();

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("# Spec Improvement Suggestions"));
}

#[test]
fn cancellation_between_tasks() {
    let orchestrator = Orchestrator::default();
    let flag = orchestrator.cancel_flag();
    flag.store(true, std::sync::atomic::Ordering::SeqCst);

    let project = project();
    assert!(matches!(
        orchestrator.run_path(project.root().join("spec/SPEC.md")),
        Err(OrchestratorError::Cancelled)
    ));
}

#[cfg(unix)]
mod commands {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn timed_out_command_fails_the_run() {
        let project = ProjectFixture::new();
        let spec = project.file("SPEC.md", FULL_SPEC);

        let config = ValidationConfig::new()
            .with_only(&[])
            .with_command(CommandSpec::new("slow", "sleep").with_args(["5"]).with_timeout_secs(1))
            .with_suggestions(false);
        let report = Orchestrator::new(config).run_path(&spec).unwrap();

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.status, TaskStatus::Timeout);
        assert_eq!(record.issues.issues()[0].category(), TIMEOUT_CATEGORY);
        assert!(!report.passed());
    }

    #[test]
    fn commands_receive_the_document_path() {
        let project = ProjectFixture::new();
        let spec = project.file("SPEC.md", FULL_SPEC);

        let config = ValidationConfig::new()
            .with_only(&[])
            .with_command(CommandSpec::new("exists", "test").with_args(["-f", "{spec}"]))
            .with_command(
                CommandSpec::new("advisory", "false").with_criticality(Criticality::Advisory),
            );
        let report = Orchestrator::new(config).run_path(&spec).unwrap();

        let statuses: Vec<TaskStatus> = report.records.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Passed, TaskStatus::Failed]);
        assert!(report.passed());
    }

    #[test]
    fn stop_on_first_critical_skips_later_commands() {
        let project = ProjectFixture::new();
        let spec = project.file("SPEC.md", FULL_SPEC);

        let config = ValidationConfig::new()
            .with_only(&[])
            .with_stop_on_first_critical(true)
            .with_suggestions(false)
            .with_command(CommandSpec::new("first", "false"))
            .with_command(CommandSpec::new("second", "true"));
        let report = Orchestrator::new(config).run_path(&spec).unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.not_run, vec!["second".to_string()]);
    }
}
