//! Implementability sub-checks

use super::signals::{self, BUDGET, DEPENDENCY, JUSTIFICATION, RISK, TEAM, TIMELINE, VERSIONED_TECH};
use super::{capped, floored, Evaluation, SubCheck};
use specgate_document::Document;

/// Versioned technology choices and their justification (10 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalFeasibility;

impl SubCheck for TechnicalFeasibility {
    fn name(&self) -> &'static str {
        "technical_feasibility"
    }

    fn max_points(&self) -> u32 {
        10
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let versioned = signals::count(&VERSIONED_TECH, doc.text());
        let justified = signals::count(&JUSTIFICATION, doc.text());

        Evaluation::new(
            floored(5, 3, versioned, 5) + floored(5, 3, justified, 5),
            format!("{versioned} versioned technologies, {justified} justified choices"),
            "Pin technology versions and justify each choice ('chosen because ...')",
        )
    }
}

/// Timeline, team and budget (2 points each)
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcePlanning;

impl SubCheck for ResourcePlanning {
    fn name(&self) -> &'static str {
        "resource_planning"
    }

    fn max_points(&self) -> u32 {
        6
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let text = doc.text();
        let families = [
            ("timeline", TIMELINE.is_match(text)),
            ("team", TEAM.is_match(text)),
            ("budget", BUDGET.is_match(text)),
        ];
        let present = families.iter().filter(|(_, found)| *found).count();
        let missing: Vec<&str> = families
            .iter()
            .filter(|(_, found)| !found)
            .map(|(name, _)| *name)
            .collect();

        Evaluation::new(
            capped(6, present, 3),
            format!("{present}/3 of timeline, team, budget"),
            format!("State the {}", missing.join(", ")),
        )
    }
}

/// Dependency mentions (5 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct Dependencies;

impl SubCheck for Dependencies {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn max_points(&self) -> u32 {
        5
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let mentions = signals::count(&DEPENDENCY, doc.text());
        Evaluation::new(
            floored(5, 2, mentions, 5),
            format!("{mentions} dependency mentions"),
            "Call out what each phase depends on and its prerequisites",
        )
    }
}

/// Risk and mitigation mentions (4 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskMitigation;

impl SubCheck for RiskMitigation {
    fn name(&self) -> &'static str {
        "risk_mitigation"
    }

    fn max_points(&self) -> u32 {
        4
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let mentions = signals::count(&RISK, doc.text());
        Evaluation::new(
            floored(4, 2, mentions, 10),
            format!("{mentions} risk-related mentions"),
            "Pair every identified risk with a mitigation or contingency",
        )
    }
}
