//! Completeness sub-checks

use super::{capped, floored, Evaluation, SubCheck};
use crate::structure::REQUIRED_SECTIONS;
use specgate_document::Document;

/// Required-section coverage (10 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreSections;

impl SubCheck for CoreSections {
    fn name(&self) -> &'static str {
        "core_sections"
    }

    fn max_points(&self) -> u32 {
        10
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let missing: Vec<&str> = REQUIRED_SECTIONS
            .into_iter()
            .filter(|name| doc.features().find_heading(name, 3).is_none())
            .collect();
        let found = REQUIRED_SECTIONS.len() - missing.len();

        Evaluation::new(
            capped(10, found, 8),
            format!("{found}/{} sections found", REQUIRED_SECTIONS.len()),
            format!("Add missing sections: {}", missing.join(", ")),
        )
    }
}

/// Functional and non-functional requirement counts (8 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementCoverage;

impl SubCheck for RequirementCoverage {
    fn name(&self) -> &'static str {
        "requirements"
    }

    fn max_points(&self) -> u32 {
        8
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let functional = doc.features().functional_count();
        let non_functional = doc.features().non_functional_count();

        Evaluation::new(
            floored(4, 2, functional, 5) + floored(4, 2, non_functional, 4),
            format!("{functional} functional, {non_functional} non-functional"),
            "Declare at least 5 functional (FR-###) and 4 non-functional (NFR-###) requirements",
        )
    }
}

/// Inverse placeholder count (3 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholders;

impl SubCheck for Placeholders {
    fn name(&self) -> &'static str {
        "placeholders"
    }

    fn max_points(&self) -> u32 {
        3
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let count = doc.features().placeholder_count();
        let penalty = u32::try_from(count.min(3)).unwrap_or(3);

        Evaluation::new(
            3 - penalty,
            format!("{count} placeholders found"),
            "Replace placeholder markers and filler text with real content",
        )
    }
}

/// In-document anchor link density (4 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossReferences;

impl SubCheck for CrossReferences {
    fn name(&self) -> &'static str {
        "cross_references"
    }

    fn max_points(&self) -> u32 {
        4
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let links = doc.features().internal_link_count();

        Evaluation::new(
            floored(4, 2, links, 10),
            format!("{links} internal links"),
            "Cross-reference related sections with [text](#anchor) links (10 or more)",
        )
    }
}
