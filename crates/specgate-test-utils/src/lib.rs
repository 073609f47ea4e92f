//! Testing utilities for the specgate workspace
//!
//! Shared markdown fixtures and on-disk project layouts.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sections every specification must carry, in document order
pub const SECTION_ORDER: [&str; 8] = [
    "Executive Summary",
    "Stakeholders",
    "Requirements",
    "System Architecture",
    "Risks and Mitigations",
    "Implementation Approach",
    "Success Metrics",
    "Constraints and Assumptions",
];

/// A specification that clears every quality heuristic, passes the
/// structural checks and traces every requirement.
pub const FULL_SPEC: &str = r#"# Order Platform Specification

## Executive Summary

The order platform replaces the current manual workflow. Budget is $250,000 over 6 months with 5 engineers.

See [requirements](#requirements), [architecture](#system-architecture), [risks](#risks-and-mitigations),
[approach](#implementation-approach), [metrics](#success-metrics), [constraints](#constraints-and-assumptions),
[stakeholders](#stakeholders), [tests](#test-strategy), [stack](#technology-stack),
[functional](#functional-requirements) and [non-functional](#non-functional-requirements).

## Stakeholders

| Role | Owner | Interest |
|------|-------|----------|
| Sponsor | Operations | Cost |
| Users | Support team | Speed |
| Platform | SRE | Uptime |

## Requirements

### Functional Requirements

#### FR-001: Order capture
The system must accept orders through the REST API.

#### FR-002: Order search
Users must search orders by customer and date.

#### FR-003: Invoice export
The system shall export invoices as PDF.

#### FR-004: Shipping notices
The system must notify customers when an order ships.

#### FR-005: Audit trail
Every change must be recorded with the acting user.

### Non-Functional Requirements

#### NFR-001: Performance
API latency must stay < 200ms at p95.

#### NFR-002: Availability
Uptime must be ≥ 99.9% per month.

#### NFR-003: Security
All traffic must use TLS 1.3 end to end.

#### NFR-004: Scalability
The system must sustain 500 req/sec with < 70% CPU.

## System Architecture

### High-Level Architecture

Services for FR-001, FR-002, FR-003, FR-004 and FR-005 sit behind the gateway.
NFR-001, NFR-002, NFR-003 and NFR-004 are enforced at the edge, where performance budgets live.

```mermaid
graph TD
    Client --> Gateway
    Gateway --> Orders
    Orders --> Billing
```

```mermaid
sequenceDiagram
    Orders->>Billing: invoice
    Billing->>Mailer: receipt
```

### Technology Stack

- Backend: Rust 1.75 with Axum 0.7, chosen because of predictable latency
- Frontend: React 18.2, selected for team familiarity
- Database: PostgreSQL 16.1, chosen for transactional guarantees
- Cache: Redis 7.2, using it for session storage
- Deployment: Kubernetes 1.29, selected due to existing operations tooling

## Risks and Mitigations

| Risk | Impact | Likelihood | Mitigation |
|------|--------|------------|------------|
| Latency regression on NFR-001 | High | Medium | Load test every release, rollback within 5 minutes |
| Credential leak affecting NFR-003 | High | Low | Rotate secrets every 30 days |
| Payment vendor outage | Medium | Medium | Contingency: queue orders for 24 hours |
| Schema migration failure | Medium | Low | Blue-green deploys with a tested restore |
| Staff turnover | Low | Medium | Pair on every risk item |

## Implementation Approach

Phase 1 (12 weeks) delivers order capture and depends on the identity service.
Phase 2 (12 weeks) requires the billing API and is a prerequisite for launch.
The team of 5 engineers keeps a shared dependency map; search depends on the indexing job.

We deploy with Kubernetes to staging, then production.

## Success Metrics

### Technical Metrics

| Metric | Current | Target |
|--------|---------|--------|
| p95 latency | 900ms | < 200ms |
| Uptime | 99.0% | ≥ 99.9% |
| Test coverage | 40% | > 85% |
| Error rate | 2% | < 0.5% |

### Business Metrics

- Current order processing time of 3 days drops to < 4 hours
- Support tickets fall by 30% within 60 days

## Test Strategy

### Acceptance Criteria

- Scenario: FR-001 order capture returns 201 within 150ms.
- Scenario: FR-002 search returns results in < 300ms for 10,000 orders.
- Scenario: FR-003 invoice export completes in < 2 seconds.
- Scenario: FR-004 notification is sent within 60 seconds.
- Scenario: FR-005 audit entries appear within 5 seconds.
- Test case: NFR-002 failover keeps uptime above 99.9%.
- Test case: NFR-004 load test holds 500 req/sec for 30 minutes.
- Test case: NFR-001 latency stays < 200ms during the soak test.

Each requirement has acceptance criteria, a definition of done and success criteria reviewed by QA.
Acceptance criteria are tracked per sprint; quality gates block merges below 85% coverage.

## Constraints and Assumptions

- Hosting spend is capped at $4,000 per month.
- The existing identity provider stays in place.
- Releases must pass the full regression suite.
- Customer data must stay in the EU region.
- Performance testing runs on production-like hardware.
"#;

/// Builder for small specification documents
///
/// Starts with every required section and mandated subsection, each with a
/// line of body text.
#[derive(Debug, Clone)]
pub struct SpecFixture {
    title: String,
    omitted: Vec<String>,
    extra: Vec<(String, String)>,
    placeholders: usize,
}

impl Default for SpecFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecFixture {
    /// Fixture with all required sections
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Fixture Specification".to_string(),
            omitted: Vec::new(),
            extra: Vec::new(),
            placeholders: 0,
        }
    }

    /// Drop a required section
    #[must_use]
    pub fn without_section(mut self, name: &str) -> Self {
        self.omitted.push(name.to_string());
        self
    }

    /// Append markdown to the body of a section
    #[must_use]
    pub fn with_body(mut self, section: &str, markdown: &str) -> Self {
        self.extra.push((section.to_string(), markdown.to_string()));
        self
    }

    /// Add `count` TODO markers, one per line, to the executive summary
    #[must_use]
    pub fn with_placeholders(mut self, count: usize) -> Self {
        self.placeholders += count;
        self
    }

    /// Render the markdown
    #[must_use]
    pub fn build(&self) -> String {
        let mut out = format!("# {}\n", self.title);

        for section in SECTION_ORDER {
            if self.omitted.iter().any(|s| s == section) {
                continue;
            }
            out.push_str(&format!("\n## {section}\n\n{}\n", default_body(section)));
            if section == "Executive Summary" {
                for i in 0..self.placeholders {
                    out.push_str(&format!("TODO item {}\n", i + 1));
                }
            }
            for (_, markdown) in self.extra.iter().filter(|(s, _)| s == section) {
                out.push_str(&format!("\n{}\n", markdown.trim_end()));
            }
        }

        out
    }
}

fn default_body(section: &str) -> &'static str {
    match section {
        "Executive Summary" => "A small fixture used by the test suite.",
        "Stakeholders" => "Operations and support.",
        "Requirements" => concat!(
            "### Functional Requirements\n\n",
            "#### FR-001: Order capture\nOrders are accepted over HTTP.\n\n",
            "### Non-Functional Requirements\n\n",
            "#### NFR-001: Latency\nResponses within 200ms.\n"
        ),
        "System Architecture" => concat!(
            "### High-Level Architecture\n\nA gateway in front of FR-001 and NFR-001 services.\n\n",
            "### Technology Stack\n\n- Backend: Rust\n- Frontend: React\n- Database: PostgreSQL\n"
        ),
        "Risks and Mitigations" => "Vendor outage is mitigated by queueing.",
        "Implementation Approach" => "Two phases of delivery.",
        "Success Metrics" => concat!(
            "### Technical Metrics\n\nCurrent latency 900ms.\n\n",
            "### Business Metrics\n\nFewer tickets.\n"
        ),
        "Constraints and Assumptions" => "The identity provider stays.",
        _ => "Body text.",
    }
}

/// Roadmap markdown with `Phase N: name` blocks and `Delivers:` lines
#[must_use]
pub fn roadmap(phases: &[(u32, &str, &str)]) -> String {
    let mut out = String::from("# Delivery Roadmap\n");
    for (number, name, delivers) in phases {
        out.push_str(&format!(
            "\n## Phase {number}: {name}\n\nDelivers: {delivers}\n"
        ));
    }
    out
}

/// Phase plan YAML record
#[derive(Debug, Clone)]
pub struct PhasePlanFixture {
    pub phase: u32,
    pub duration_weeks: u32,
    pub team_size: u32,
    pub objectives: Vec<String>,
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
}

impl PhasePlanFixture {
    /// Plan for `phase` lasting `duration_weeks` with a team of `team_size`
    #[must_use]
    pub fn new(phase: u32, duration_weeks: u32, team_size: u32) -> Self {
        Self {
            phase,
            duration_weeks,
            team_size,
            objectives: vec![format!("Ship phase {phase}")],
            frontend: Vec::new(),
            backend: Vec::new(),
        }
    }

    /// Set backend technologies
    #[must_use]
    pub fn backend(mut self, tech: &[&str]) -> Self {
        self.backend = tech.iter().map(ToString::to_string).collect();
        self
    }

    /// Set frontend technologies
    #[must_use]
    pub fn frontend(mut self, tech: &[&str]) -> Self {
        self.frontend = tech.iter().map(ToString::to_string).collect();
        self
    }

    /// Render YAML
    #[must_use]
    pub fn to_yaml(&self) -> String {
        let list = |items: &[String]| -> String {
            if items.is_empty() {
                " []\n".to_string()
            } else {
                items.iter().map(|i| format!("\n    - {i}")).collect::<String>() + "\n"
            }
        };
        format!(
            "metadata:\n  phase: {}\n  team_size: {}\n  duration_weeks: {}\nobjectives:\n  primary:{}technical_requirements:\n  frontend:{}  backend:{}",
            self.phase,
            self.team_size,
            self.duration_weeks,
            list(&self.objectives),
            list(&self.frontend),
            list(&self.backend),
        )
    }
}

/// Project directory on disk, removed on drop
#[derive(Debug)]
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Empty project directory
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project dir"),
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the root, creating parent directories
    pub fn file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Write `spec/SPEC.md`
    pub fn spec(&self, contents: &str) -> PathBuf {
        self.file("spec/SPEC.md", contents)
    }

    /// Write `roadmap/roadmap.md`
    pub fn roadmap(&self, contents: &str) -> PathBuf {
        self.file("roadmap/roadmap.md", contents)
    }

    /// Write `phase-plans/phase-N.yml`
    pub fn phase_plan(&self, plan: &PhasePlanFixture) -> PathBuf {
        self.file(&format!("phase-plans/phase-{}.yml", plan.phase), &plan.to_yaml())
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_contains_sections() {
        let text = SpecFixture::new().without_section("Stakeholders").build();
        assert!(text.contains("## Executive Summary"));
        assert!(!text.contains("## Stakeholders"));
    }

    #[test]
    fn placeholders_are_one_per_line() {
        let text = SpecFixture::new().with_placeholders(2).build();
        assert_eq!(text.matches("TODO").count(), 2);
    }

    #[test]
    fn phase_plan_yaml_shape() {
        let yaml = PhasePlanFixture::new(2, 8, 4).backend(&["Rust", "Axum"]).to_yaml();
        assert!(yaml.contains("phase: 2"));
        assert!(yaml.contains("duration_weeks: 8"));
        assert!(yaml.contains("  backend:\n    - Rust\n    - Axum\n"));
        assert!(yaml.contains("  frontend: []\n"));
    }

    #[test]
    fn project_writes_files() {
        let project = ProjectFixture::new();
        let spec = project.spec("# Spec\n");
        assert!(spec.ends_with("spec/SPEC.md"));
        assert!(project.root().join("spec").is_dir());
    }
}
