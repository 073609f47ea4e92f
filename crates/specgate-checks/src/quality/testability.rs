//! Testability sub-checks

use super::signals::{self, ACCEPTANCE, MODAL, QUALITY, SCENARIO};
use super::{floored, Evaluation, SubCheck};
use specgate_document::Document;

/// Binding requirement statements and explicit thresholds (10 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurableRequirements;

impl SubCheck for MeasurableRequirements {
    fn name(&self) -> &'static str {
        "measurable_requirements"
    }

    fn max_points(&self) -> u32 {
        10
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let statements = signals::count(&MODAL, doc.text());
        let thresholds = doc.features().threshold_count;

        Evaluation::new(
            floored(5, 2, statements, 10) + floored(5, 2, thresholds, 10),
            format!("{statements} shall/must statements, {thresholds} thresholds"),
            "Phrase requirements as 'must' statements with explicit thresholds ('< 200ms')",
        )
    }
}

/// Test scenario mentions (8 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct TestScenarios;

impl SubCheck for TestScenarios {
    fn name(&self) -> &'static str {
        "test_scenarios"
    }

    fn max_points(&self) -> u32 {
        8
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let mentions = signals::count(&SCENARIO, doc.text());
        Evaluation::new(
            floored(8, 4, mentions, 8),
            format!("{mentions} test scenario mentions"),
            "Describe test scenarios for each major requirement",
        )
    }
}

/// Acceptance criteria mentions (3 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptanceCriteria;

impl SubCheck for AcceptanceCriteria {
    fn name(&self) -> &'static str {
        "acceptance_criteria"
    }

    fn max_points(&self) -> u32 {
        3
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let mentions = signals::count(&ACCEPTANCE, doc.text());
        Evaluation::new(
            floored(3, 1, mentions, 5),
            format!("{mentions} acceptance criteria sections"),
            "Add acceptance criteria or a definition of done per requirement",
        )
    }
}

/// Quality metric mentions (4 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityMetrics;

impl SubCheck for QualityMetrics {
    fn name(&self) -> &'static str {
        "quality_metrics"
    }

    fn max_points(&self) -> u32 {
        4
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let mentions = signals::count(&QUALITY, doc.text());
        Evaluation::new(
            floored(4, 1, mentions, 10),
            format!("{mentions} quality metric mentions"),
            "Set targets for coverage, uptime and performance",
        )
    }
}
