use pretty_assertions::assert_eq;
use specgate_checks::alignment::{project_root_for, Layout, MAX_ALIGNED_WARNINGS};
use specgate_checks::{AlignmentRecord, AlignmentValidator, Outcome, Severity};
use specgate_test_utils::{roadmap, PhasePlanFixture, ProjectFixture, SpecFixture, FULL_SPEC};

fn aligned_project() -> ProjectFixture {
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
fn consistent_project_is_aligned() {
    let project = aligned_project();
    let record = AlignmentValidator::new().validate(project.root()).unwrap();

    assert!(record.warnings.is_empty(), "{:?}", record.warnings);
    assert_eq!(record.outcome(), Outcome::Aligned);
    assert!(record.passes(true));
    assert_eq!(record.roadmap.phases.len(), 2);
    assert_eq!(record.phase_plans.len(), 2);
    assert!(record.matrix().iter().all(|row| row.spec && row.phase_plans));
}

#[test]
fn missing_phase_plan_is_reported_once() {
    let project = aligned_project();
    std::fs::remove_file(project.root().join("phase-plans/phase-2.yml")).unwrap();
    // keep the timeline consistent so only the missing plan is reported
    project.phase_plan(&PhasePlanFixture::new(1, 24, 5).backend(&["Rust"]).frontend(&["React"]));

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    let missing: Vec<&String> = record
        .warnings
        .iter()
        .filter(|w| w.contains("no phase plan found"))
        .collect();
    assert_eq!(missing, vec!["Phase 2 in roadmap but no phase plan found"]);
}

#[test]
fn timeline_mismatch_warns() {
    let project = aligned_project();
    for phase in [1, 2] {
        project.phase_plan(
            &PhasePlanFixture::new(phase, 10, 5)
                .backend(&["Rust"])
                .frontend(&["React"]),
        );
    }
    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(record
        .warnings
        .contains(&"Timeline mismatch: SPEC says 6 months, phases total 20 weeks".to_string()));
}

#[test]
fn timeline_within_two_weeks_is_silent() {
    let project = aligned_project();
    project.phase_plan(&PhasePlanFixture::new(2, 10, 5).backend(&["Rust"]).frontend(&["React"]));
    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(!record.warnings.iter().any(|w| w.starts_with("Timeline mismatch")));
}

#[test]
fn larger_team_and_other_stack_warn() {
    let project = aligned_project();
    project.phase_plan(&PhasePlanFixture::new(2, 12, 8).backend(&["Django"]).frontend(&["React"]));

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(record
        .warnings
        .contains(&"Phase 2 requires 8 people but SPEC only mentions 5".to_string()));
    assert!(record
        .warnings
        .contains(&"Phase 2 uses different backend tech than SPEC".to_string()));
    assert!(record.passes(false));
    assert!(!record.passes(true));
}

#[test]
fn missing_roadmap_aborts() {
    let project = ProjectFixture::new();
    project.spec(FULL_SPEC);

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert_eq!(record.outcome(), Outcome::Aborted);
    assert_eq!(record.errors, vec!["No roadmap file found"]);
    assert_eq!(record.findings().count(Severity::Error), 1);
}

#[test]
fn missing_spec_aborts() {
    let project = ProjectFixture::new();
    project.roadmap(&roadmap(&[(1, "Start", "everything")]));

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert_eq!(record.outcome(), Outcome::Aborted);
    assert!(record.errors[0].starts_with("SPEC.md not found in"));
}

#[test]
fn missing_phase_plan_directory_warns_and_continues() {
    let project = ProjectFixture::new();
    project.spec(&SpecFixture::new().build());
    project.roadmap(&roadmap(&[(1, "Orders", "order capture")]));

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(record.warnings.contains(&"No phase-plans directory found".to_string()));
    assert!(record
        .warnings
        .contains(&"Phase 1 in roadmap but no phase plan found".to_string()));
    assert_eq!(record.outcome(), Outcome::Aligned);
}

#[test]
fn unparseable_plan_and_extra_roadmap() {
    let project = aligned_project();
    project.file("phase-plans/broken.yaml", "metadata: [unclosed");
    project.file("docs/old-roadmap.md", "# Old\n");

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(record
        .warnings
        .iter()
        .any(|w| w.starts_with("Could not parse broken.yaml")));
    assert!(record
        .warnings
        .iter()
        .any(|w| w.starts_with("Multiple roadmap files found, using docs/old-roadmap.md")));
}

#[test]
fn many_warnings_need_review() {
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

    let record = AlignmentValidator::new().validate(project.root()).unwrap();
    assert!(record.warnings.len() >= 5);
    assert_eq!(record.outcome(), Outcome::NeedsReview);
    assert!(!record.passes(false));
    assert!(record.render_console().contains("review warnings"));
}

fn with_warnings(count: usize) -> AlignmentRecord {
    AlignmentRecord {
        warnings: (1..=count).map(|i| format!("warning {i}")).collect(),
        ..AlignmentRecord::default()
    }
}

#[test]
fn warning_count_decides_the_pass() {
    let below = with_warnings(MAX_ALIGNED_WARNINGS - 1);
    assert_eq!(below.outcome(), Outcome::Aligned);
    assert!(below.passes(false));
    assert!(!below.passes(true));

    let at_limit = with_warnings(MAX_ALIGNED_WARNINGS);
    assert_eq!(at_limit.outcome(), Outcome::NeedsReview);
    assert!(!at_limit.passes(false));

    let aborted = AlignmentRecord {
        errors: vec!["No roadmap file found".to_string()],
        ..AlignmentRecord::default()
    };
    assert!(!aborted.passes(false));
}

#[test]
fn layout_detection_from_spec_path() {
    let project = aligned_project();
    let root = project_root_for(&project.root().join("spec/SPEC.md")).unwrap();
    assert_eq!(root, project.root());
    assert!(Layout::discover(&root).is_project());
}
