use specgate_checks::{
    ImprovementAnalyzer, LinkValidator, Priority, Severity, StructureOptions, StructureValidator,
    TraceabilityValidator,
};
use specgate_document::Document;
use specgate_test_utils::{ProjectFixture, SpecFixture, FULL_SPEC, SECTION_ORDER};

#[test]
fn each_missing_section_is_exactly_one_error() {
    let validator = StructureValidator::new(StructureOptions::new().with_modular(false));
    for section in SECTION_ORDER {
        let doc = Document::parse(SpecFixture::new().without_section(section).build());
        let findings = validator.validate(&doc);

        let errors: Vec<&str> = findings
            .with_severity(Severity::Error)
            .map(|i| i.message())
            .collect();
        assert_eq!(
            errors,
            vec![format!("Missing required section: {section}").as_str()],
            "removing {section}"
        );
        assert!(!findings.passes(false));
    }
}

#[test]
fn full_spec_passes_structure_links_and_traceability() {
    let doc = Document::parse(FULL_SPEC);

    let structure = StructureValidator::new(StructureOptions::new().with_internal_links(true))
        .validate(&doc);
    assert!(structure.passes(true), "{:?}", structure);

    let links = LinkValidator::new().validate(&doc);
    assert!(links.passes(true), "{:?}", links.issues);
    assert_eq!(links.stats.total, links.stats.valid);

    let trace = TraceabilityValidator::default().validate(&doc);
    assert!(trace.passes(true), "{:?}", trace.issues);
    assert_eq!(trace.summary.total, 9);
}

#[test]
fn security_requirement_outside_risks_warns() {
    let requirements = concat!(
        "### Functional Requirements\n\n",
        "#### FR-001: Order capture\nOrders are accepted over HTTP.\n\n",
        "#### FR-007: Security review of admin actions\nAdmins are audited.\n\n",
        "### Non-Functional Requirements\n\n",
        "#### NFR-001: Latency\nResponses within 200ms.\n"
    );
    let architecture = concat!(
        "### High-Level Architecture\n\nFR-001, FR-007 and NFR-001 run in one service.\n\n",
        "### Technology Stack\n\n- Backend: Rust\n"
    );
    let doc = Document::parse(
        SpecFixture::new()
            .with_body("Requirements", requirements)
            .with_body("System Architecture", architecture)
            .build(),
    );

    let trace = TraceabilityValidator::default().validate(&doc);
    let row = trace.row("FR-007").unwrap();
    assert!(row.architecture);
    assert_eq!(row.risk, Some(false));

    let warnings: Vec<&str> = trace
        .issues
        .with_severity(Severity::Warning)
        .map(|i| i.message())
        .collect();
    assert_eq!(
        warnings,
        vec!["High-risk requirement FR-007 not addressed in risk section"]
    );
    assert!(trace.passes(false));
    assert!(!trace.passes(true));
}

#[test]
fn modular_files_are_checked_beside_the_document() {
    let project = ProjectFixture::new();
    let spec = project.file("SPEC.md", &SpecFixture::new().build());
    project.file(".spec/requirements.md", "TBD\n");

    let findings = StructureValidator::default().validate(&Document::load(&spec).unwrap());
    let messages: Vec<&str> = findings.iter().map(|i| i.message()).collect();

    assert!(messages.contains(&"Missing modular file: outcomes.md"));
    assert!(messages.iter().any(|m| m.starts_with("requirements.md is too short")));
    assert!(messages.contains(&"Placeholder found in requirements.md: TBD"));
}

#[test]
fn relative_links_resolve_against_the_document() {
    let project = ProjectFixture::new();
    project.file("docs/guide.md", "# Guide\n\n## Setup\n");
    let spec = project.file(
        "SPEC.md",
        "# Spec\n\n[ok](docs/guide.md#setup) [bad anchor](docs/guide.md#teardown) [gone](docs/missing.md)\n",
    );

    let report = LinkValidator::new().validate(&Document::load(&spec).unwrap());
    assert_eq!(report.stats.file, 3);
    assert_eq!(report.stats.valid, 1);
    assert_eq!(report.issues.count(Severity::Error), 1);
    assert_eq!(report.issues.count(Severity::Warning), 1);
}

#[test]
fn improvement_report_for_sparse_fixture() {
    let report = ImprovementAnalyzer::new().analyze(&Document::parse(SpecFixture::new().build()));
    assert!(report.with_priority(Priority::High).count() > 0);
    assert!(report.with_priority(Priority::Medium).count() > 0);
    assert!(report.render_console().starts_with("Found "));
}
