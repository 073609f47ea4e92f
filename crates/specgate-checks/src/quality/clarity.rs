//! Clarity sub-checks

use super::{floored, Evaluation, SubCheck};
use specgate_document::Document;

/// Quantified metric density (8 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguagePrecision;

impl SubCheck for LanguagePrecision {
    fn name(&self) -> &'static str {
        "language_precision"
    }

    fn max_points(&self) -> u32 {
        8
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let metrics = doc.features().metric_count;
        Evaluation::new(
            floored(8, 4, metrics, 20),
            format!("{metrics} quantified metrics"),
            "Quantify statements with units and thresholds, e.g. 'p95 < 200ms' (20 or more)",
        )
    }
}

/// Heading levels never skip (6 points, 2 lost per skip)
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingHierarchy;

impl SubCheck for HeadingHierarchy {
    fn name(&self) -> &'static str {
        "heading_hierarchy"
    }

    fn max_points(&self) -> u32 {
        6
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let skips = doc.features().level_skips().len();
        let lost = u32::try_from(skips).unwrap_or(u32::MAX).saturating_mul(2);

        Evaluation::new(
            6u32.saturating_sub(lost),
            format!("{skips} heading level skips"),
            "Nest headings one level at a time (H2 → H3 → H4)",
        )
    }
}

/// Terminology consistency
///
/// No heuristic is applied yet; the sub-check always awards full marks and
/// therefore never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminology;

impl SubCheck for Terminology {
    fn name(&self) -> &'static str {
        "terminology"
    }

    fn max_points(&self) -> u32 {
        7
    }

    fn evaluate(&self, _doc: &Document) -> Evaluation {
        Evaluation::new(7, "baseline", "")
    }
}

/// Diagrams and tables (4 points)
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualAids;

impl SubCheck for VisualAids {
    fn name(&self) -> &'static str {
        "visual_aids"
    }

    fn max_points(&self) -> u32 {
        4
    }

    fn evaluate(&self, doc: &Document) -> Evaluation {
        let features = doc.features();
        Evaluation::new(
            floored(2, 1, features.diagram_blocks, 2) + floored(2, 1, features.table_rows, 5),
            format!(
                "{} diagrams, {} table rows",
                features.diagram_blocks, features.table_rows
            ),
            "Add mermaid diagrams (2 or more) and summary tables",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_loses_two_points_per_skip() {
        let clean = Document::parse("# A\n## B\n### C\n## D\n");
        assert_eq!(HeadingHierarchy.evaluate(&clean).points, 6);

        let one = Document::parse("# A\n### B\n");
        assert_eq!(HeadingHierarchy.evaluate(&one).points, 4);

        let many = Document::parse("# A\n### B\n# C\n### D\n# E\n#### F\n# G\n### H\n");
        assert_eq!(HeadingHierarchy.evaluate(&many).points, 0);
    }

    #[test]
    fn terminology_is_always_full() {
        let eval = Terminology.evaluate(&Document::parse(""));
        assert_eq!(eval.points, 7);
    }

    #[test]
    fn visual_aids_combine_diagrams_and_tables() {
        let doc = Document::parse("```mermaid\ngraph TD\n```\n\n| a |\n|---|\n| 1 |\n");
        // (1 + 1 * 1 / 2) + (1 + 1 * 3 / 5)
        assert_eq!(VisualAids.evaluate(&doc).points, 2);
    }
}
