use proptest::prelude::*;
use specgate_checks::quality::{
    capped, floored, Dimension, Evaluation, Grade, Placeholders, QualityScorer, RiskLevel, Status, SubCheck,
    DIMENSION_MAX,
};
use specgate_checks::ScoreError;
use specgate_document::Document;
use specgate_test_utils::{SpecFixture, FULL_SPEC};

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("## Executive Summary\nBudget $10,000 over 3 months with 2 engineers.\n".to_string()),
        Just("### FR-001: Login\nThe system must respond < 200ms.\n".to_string()),
        Just("#### NFR-001: Performance\nUptime shall be ≥ 99.9%.\n".to_string()),
        Just("```mermaid\ngraph TD\n```\n".to_string()),
        Just("| a | b |\n|---|---|\n| 1 | 2 |\n".to_string()),
        Just("Scenario: test case for acceptance criteria\n".to_string()),
        Just("Risk mitigated by contingency; depends on billing.\n".to_string()),
        Just("Rust 1.75 chosen because of safety.\n".to_string()),
        Just("# Title\n#### Deep\n".to_string()),
        Just("TODO TBD FIXME\n".to_string()),
        Just("[x](#executive-summary)\n".to_string()),
    ]
}

proptest! {
    #[test]
    fn scores_respect_bounds(parts in proptest::collection::vec(fragment(), 0..40)) {
        let doc = Document::parse(parts.concat());
        let report = QualityScorer::new().score(&doc).unwrap();

        let sum: u32 = report.dimensions().iter().map(|d| d.score()).sum();
        prop_assert_eq!(report.total_score(), sum);
        prop_assert_eq!(report.max_score(), 100);
        for dim in report.dimensions() {
            prop_assert!(dim.score() <= dim.max_score());
            prop_assert_eq!(dim.max_score(), DIMENSION_MAX);
        }
    }

    #[test]
    fn scoring_is_idempotent(parts in proptest::collection::vec(fragment(), 0..30)) {
        let doc = Document::parse(parts.concat());
        let scorer = QualityScorer::new();
        let first = scorer.score(&doc).unwrap();
        let second = scorer.score(&doc).unwrap();
        prop_assert_eq!(first.dimensions(), second.dimensions());
        prop_assert_eq!(first.total_score(), second.total_score());
    }

    #[test]
    fn capped_never_exceeds_max(max in 0u32..30, count in 0usize..1000, target in 0u32..50) {
        prop_assert!(capped(max, count, target) <= max);
    }

    #[test]
    fn floored_stays_between_floor_and_max(
        max in 0u32..30,
        floor in 0u32..30,
        count in 1usize..1000,
        target in 0u32..50,
    ) {
        let points = floored(max, floor, count, target);
        prop_assert!(points <= max);
        prop_assert!(points >= floor.min(max));
    }
}

#[test]
fn full_spec_is_ready() {
    let report = QualityScorer::new().score(&Document::parse(FULL_SPEC)).unwrap();
    assert!(report.total_score() >= 90, "{}", report.render_console());
    assert_eq!(report.status(), Status::Ready);
    assert_eq!(report.risk_level(), RiskLevel::Low);
    assert!(report.grade() >= Grade::Good);
}

/// Eight H2 sections, no placeholders, 25 metrics, 2 mermaid diagrams,
/// 12 table rows and 15 internal links
const SCENARIO_SPEC: &str = r#"# Checkout Service Specification

## Executive Summary

The checkout service replaces the current batch flow. Budget is $250,000 over 6 months with 5 engineers.
Jump to [stakeholders](#stakeholders), [requirements](#requirements), [functional](#functional-requirements),
[non-functional](#non-functional-requirements), [architecture](#system-architecture), [stack](#technology-stack),
[risks](#risks-and-mitigations), [approach](#implementation-approach), [metrics](#success-metrics),
[technical metrics](#technical-metrics), [acceptance](#acceptance-criteria),
[constraints](#constraints-and-assumptions), [summary](#executive-summary), [overview](#high-level-architecture)
and [business metrics](#business-metrics).

## Stakeholders

| Role | Owner |
|------|-------|
| Sponsor | Finance |
| Users | Support |

## Requirements

### Functional Requirements

#### FR-001: Cart checkout
The service must complete a checkout in < 300ms.

#### FR-002: Cart review
Customers must see their cart total before paying.

#### FR-003: Receipts
The service must email a receipt within 60 seconds.

#### FR-004: Refunds
Refunds must post back to the card in 5 days.

#### FR-005: Audit trail
Every order must keep an audit entry.

### Non-Functional Requirements

#### NFR-001: Performance
p95 latency must stay < 200ms.

#### NFR-002: Availability
Uptime must be ≥ 99.9% each month.

#### NFR-003: Security
Card data must never leave the vault; keys rotate every 30 days.

#### NFR-004: Throughput
The service must sustain 400 req/sec at < 70% CPU.

## System Architecture

### High-Level Architecture

FR-001 through FR-005 run in the checkout service; NFR-001 to NFR-004 are enforced at the gateway.

```mermaid
graph TD
    Client --> Gateway
    Gateway --> Checkout
    Checkout --> Payments
```

```mermaid
sequenceDiagram
    Checkout->>Payments: charge
    Payments->>Checkout: receipt
```

### Technology Stack

- Backend: Rust 1.75 with Axum 0.7, chosen because of predictable latency
- Frontend: React 18.2, selected for team familiarity
- Database: PostgreSQL 16.1, chosen for transactional guarantees
- Cache: Redis 7.2, using it for session storage
- Deployment: Kubernetes 1.29, selected due to existing operations tooling

## Risks and Mitigations

| Risk | Impact | Mitigation |
|------|--------|------------|
| Payment gateway outage | High | Contingency: queue charges for 2 hours |
| Latency regression on NFR-001 | Medium | Load test every release |
| Card data exposure on NFR-003 | High | Quarterly penetration test |

Every risk has an owner and a mitigation reviewed weekly.

## Implementation Approach

Phase 1 (12 weeks) builds the cart and depends on the identity service.
Phase 2 (12 weeks) requires the payments API and is a prerequisite for launch.
Refunds wait on the ledger; the dependency map lists every prerequisite.
Budget reserve of 10% covers overruns.

## Success Metrics

### Technical Metrics

| Metric | Current | Target |
|--------|---------|--------|
| Test coverage | 40% | > 85% |

### Business Metrics

- Current checkout time of 3 minutes drops to < 30 seconds.
- Support tickets fall by 20% within 60 days.

### Acceptance Criteria

- Scenario: FR-001 checkout completes in < 300ms under load.
- Scenario: FR-003 receipt arrives within 60 seconds.
- Scenario: FR-004 refund posts within 5 days.
- Test case: NFR-002 failover keeps uptime ≥ 99.9%.
- Test case: NFR-004 soak test holds 400 req/sec for 30 minutes.
- Test case: NFR-001 latency stays < 200ms during the soak test.

Each requirement has acceptance criteria, a definition of done and success criteria.
Acceptance criteria are reviewed every sprint and quality gates block merges below 85% coverage.

## Constraints and Assumptions

- Pages must load in < 2 seconds on mobile.
- Releases must pass the full regression suite.
- Performance tests run on production-like hardware.
- Availability and quality reports go to the SRE team weekly.
- Uptime dashboards stay public.
- The existing identity provider stays in place.
"#;

#[test]
fn scenario_document_is_ready() {
    let doc = Document::parse(SCENARIO_SPEC);
    let features = doc.features();
    let h2 = features.headings.iter().filter(|h| h.level == 2).count();
    assert_eq!(h2, 8);
    assert_eq!(features.placeholder_count(), 0);
    assert_eq!(features.metric_count, 25);
    assert_eq!(features.diagram_blocks, 2);
    assert_eq!(features.table_rows, 12);
    assert_eq!(features.internal_link_count(), 15);

    let report = QualityScorer::new().score(&doc).unwrap();
    assert!(report.total_score() >= 90, "{}", report.render_console());
    assert_eq!(report.status(), Status::Ready);
    assert_eq!(report.risk_level(), RiskLevel::Low);
}

#[test]
fn sparse_fixture_needs_work() {
    let report = QualityScorer::new()
        .score(&Document::parse(SpecFixture::new().build()))
        .unwrap();
    assert_eq!(report.status(), Status::RequiresSignificantWork);
    assert!(report.suggestions().count() > 0);
}

#[test]
fn placeholder_points_drop_one_per_hit() {
    let points: Vec<u32> = (0..5)
        .map(|n| {
            let doc = Document::parse(SpecFixture::new().with_placeholders(n).build());
            Placeholders.evaluate(&doc).points
        })
        .collect();
    assert_eq!(points, vec![3, 2, 1, 0, 0]);
}

#[test]
fn subset_scoring() {
    let scorer = QualityScorer::for_dimensions(&[Dimension::Clarity, Dimension::Clarity]).unwrap();
    assert_eq!(scorer.dimensions().collect::<Vec<_>>(), vec![Dimension::Clarity]);

    let report = scorer.score(&Document::parse(FULL_SPEC)).unwrap();
    assert_eq!(report.max_score(), 25);
    assert_eq!(report.dimensions().len(), 1);

    assert!(matches!(
        QualityScorer::for_dimensions(&[]),
        Err(ScoreError::NoDimensions)
    ));
}

#[test]
fn dimension_names_parse() {
    assert_eq!("Testability".parse::<Dimension>().unwrap(), Dimension::Testability);
    assert!(matches!(
        "style".parse::<Dimension>(),
        Err(ScoreError::UnknownDimension(name)) if name == "style"
    ));
}

struct Generous;

impl SubCheck for Generous {
    fn name(&self) -> &'static str {
        "terminology"
    }

    fn max_points(&self) -> u32 {
        7
    }

    fn evaluate(&self, _doc: &Document) -> Evaluation {
        Evaluation::new(50, "overreaching", "never shown")
    }
}

#[test]
fn swapped_sub_check_is_clamped() {
    let scorer = QualityScorer::for_dimensions(&[Dimension::Clarity])
        .unwrap()
        .with_sub_check(Dimension::Clarity, Box::new(Generous));
    let report = scorer.score(&Document::parse("# Empty\n")).unwrap();
    let clarity = report.dimension(Dimension::Clarity).unwrap();

    assert_eq!(clarity.details()["terminology"], "overreaching (7/7)");
    assert!(clarity.score() <= 25);
}

#[test]
fn details_follow_evaluation_order() {
    let report = QualityScorer::new().score(&Document::parse(FULL_SPEC)).unwrap();
    let completeness = report.dimension(Dimension::Completeness).unwrap();
    let keys: Vec<&str> = completeness.details().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["core_sections", "requirements", "placeholders", "cross_references"]
    );
    assert_eq!(completeness.details()["core_sections"], "8/8 sections found (10/10)");
}
