//! Structural validator
//!
//! Checks that a specification has the required outline and is free of
//! obvious authoring debris:
//!
//! - required sections and their mandated subsections
//! - heading hierarchy (no skipped levels)
//! - empty sections and malformed tables
//! - placeholders and filler prose
//! - optionally, in-document anchor links and the modular companion files

use crate::issue::{category, Findings, Issue};
use serde::{Deserialize, Serialize};
use specgate_document::{extract, Document, PlaceholderHit, PlaceholderKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Sections every specification must have (heading level 1-3, prefix match)
pub const REQUIRED_SECTIONS: [&str; 8] = [
    "Executive Summary",
    "Stakeholders",
    "Requirements",
    "System Architecture",
    "Risks and Mitigations",
    "Implementation Approach",
    "Success Metrics",
    "Constraints and Assumptions",
];

/// Subsections (heading level 2-4) mandated under a present parent
pub const REQUIRED_SUBSECTIONS: [(&str, [&str; 2]); 3] = [
    (
        "Requirements",
        ["Functional Requirements", "Non-Functional Requirements"],
    ),
    (
        "System Architecture",
        ["High-Level Architecture", "Technology Stack"],
    ),
    ("Success Metrics", ["Technical Metrics", "Business Metrics"]),
];

/// Conventional files of a modular specification
pub const MODULAR_FILES: [&str; 4] = ["outcomes.md", "requirements.md", "architecture.md", "risks.md"];

/// Minimum stripped length of a modular file
pub const MIN_MODULAR_CHARS: usize = 100;

/// Structural validator options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureOptions {
    /// Resolve every `[text](#anchor)` against heading anchors
    pub check_internal_links: bool,

    /// Inspect the modular companion directory
    pub check_modular: bool,

    /// Companion directory, relative to the document
    pub modular_dir: PathBuf,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            check_internal_links: false,
            check_modular: true,
            modular_dir: PathBuf::from(".spec"),
        }
    }
}

impl StructureOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the internal-link check
    #[must_use]
    pub fn with_internal_links(mut self, enabled: bool) -> Self {
        self.check_internal_links = enabled;
        self
    }

    /// Enable or disable the modular-file check
    #[must_use]
    pub fn with_modular(mut self, enabled: bool) -> Self {
        self.check_modular = enabled;
        self
    }

    /// Set the companion directory name
    #[must_use]
    pub fn with_modular_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modular_dir = dir.into();
        self
    }
}

/// Structural validator
#[derive(Debug, Clone, Default)]
pub struct StructureValidator {
    options: StructureOptions,
}

impl StructureValidator {
    /// Create validator with options
    #[must_use]
    pub fn new(options: StructureOptions) -> Self {
        Self { options }
    }

    /// Options in use
    #[inline]
    #[must_use]
    pub fn options(&self) -> &StructureOptions {
        &self.options
    }

    /// Validate a document
    #[must_use]
    pub fn validate(&self, doc: &Document) -> Findings {
        let mut findings = Findings::new();

        check_sections(doc, &mut findings);
        check_hierarchy(doc, &mut findings);
        check_empty_sections(doc, &mut findings);
        check_tables(doc, &mut findings);
        findings.extend(placeholder_issues(&doc.features().placeholders, None));

        if self.options.check_internal_links {
            check_internal_links(doc, &mut findings);
        }
        if self.options.check_modular {
            if let Some(dir) = doc.directory() {
                check_modular(&dir.join(&self.options.modular_dir), &mut findings);
            }
        }

        tracing::debug!(
            document = %doc.identifier(),
            issues = findings.len(),
            "structure validation finished"
        );
        findings
    }
}

fn check_sections(doc: &Document, findings: &mut Findings) {
    let headings = &doc.features().headings;
    let present = |name: &str, levels: std::ops::RangeInclusive<u8>| {
        headings
            .iter()
            .any(|h| levels.contains(&h.level) && h.title_starts_with(name))
    };

    for section in REQUIRED_SECTIONS {
        if !present(section, 1..=3) {
            findings.push(Issue::error(
                category::STRUCTURE,
                format!("Missing required section: {section}"),
            ));
        }
    }

    for (parent, subsections) in REQUIRED_SUBSECTIONS {
        if !present(parent, 1..=3) {
            continue;
        }
        for sub in subsections {
            if !present(sub, 2..=4) {
                findings.push(Issue::warning(
                    category::STRUCTURE,
                    format!("Missing subsection '{sub}' under {parent}"),
                ));
            }
        }
    }
}

fn check_hierarchy(doc: &Document, findings: &mut Findings) {
    for (heading, previous) in doc.features().level_skips() {
        findings.push(
            Issue::warning(
                category::HIERARCHY,
                format!("Heading level skipped (H{previous} → H{})", heading.level),
            )
            .at_line(heading.line),
        );
    }
}

/// A heading followed, after at most one blank line, by a heading of the
/// same or shallower level (or by end of file) has no content.
fn check_empty_sections(doc: &Document, findings: &mut Findings) {
    let lines = doc.lines();
    let headings = &doc.features().headings;

    for (position, heading) in headings.iter().enumerate() {
        // 0-based index of the line after the heading
        let mut next = heading.line;
        if lines.get(next).is_some_and(|l| l.trim().is_empty()) {
            next += 1;
        }

        let empty = lines[heading.line..].iter().all(|l| l.trim().is_empty())
            || headings
                .get(position + 1)
                .is_some_and(|h| h.line == next + 1 && h.level <= heading.level);

        if empty {
            findings.push(
                Issue::warning(
                    category::CONTENT,
                    format!("Empty section: {}", heading.title),
                )
                .at_line(heading.line),
            );
        }
    }
}

fn check_tables(doc: &Document, findings: &mut Findings) {
    for table in &doc.features().tables {
        if !table.has_separator {
            findings.push(
                Issue::warning(category::TABLE, "Table missing separator row").at_line(table.line),
            );
        }
    }
}

fn placeholder_issues<'a>(
    hits: &'a [PlaceholderHit],
    file: Option<&'a str>,
) -> impl Iterator<Item = Issue> + 'a {
    hits.iter().map(move |hit| {
        let location = file.map(|f| format!(" in {f}")).unwrap_or_default();
        let message = match hit.kind {
            PlaceholderKind::Marker => format!("Placeholder found{location}: {}", hit.term),
            PlaceholderKind::Filler => format!("Filler text found{location}: '{}'", hit.term),
        };
        Issue::warning(category::PLACEHOLDER, message).at_line(hit.line)
    })
}

fn check_internal_links(doc: &Document, findings: &mut Findings) {
    let features = doc.features();
    for (link, anchor) in features.anchor_links() {
        if !features.has_anchor(anchor) {
            findings.push(
                Issue::error(category::LINK, format!("Broken internal link: #{anchor}"))
                    .at_line(link.line),
            );
        }
    }
}

fn check_modular(dir: &Path, findings: &mut Findings) {
    let mut files: Vec<PathBuf> = if dir.is_dir() {
        WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
            .collect()
    } else {
        Vec::new()
    };

    if files.is_empty() {
        findings.push(Issue::info(category::MODULAR, "No modular spec files found"));
        return;
    }
    files.sort();

    for name in MODULAR_FILES {
        if !dir.join(name).is_file() {
            findings.push(Issue::warning(
                category::MODULAR,
                format!("Missing modular file: {name}"),
            ));
        }
    }

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable modular file");
                findings.push(Issue::warning(
                    category::MODULAR,
                    format!("Could not read {name}: {e}"),
                ));
                continue;
            }
        };

        let length = text.trim().chars().count();
        if length < MIN_MODULAR_CHARS {
            findings.push(Issue::warning(
                category::MODULAR,
                format!("{name} is too short ({length} characters)"),
            ));
        }

        let features = extract(&text);
        findings.extend(placeholder_issues(&features.placeholders, Some(&name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use specgate_test_utils::SpecFixture;

    fn messages(findings: &Findings, severity: Severity) -> Vec<String> {
        findings
            .with_severity(severity)
            .map(|i| i.message().to_string())
            .collect()
    }

    fn validate(text: &str) -> Findings {
        StructureValidator::new(StructureOptions::new().with_modular(false))
            .validate(&Document::parse(text))
    }

    #[test]
    fn complete_fixture_has_no_errors() {
        let findings = validate(&SpecFixture::new().build());
        assert!(findings.is_empty(), "{findings:?}");
        assert!(findings.passes(true));
    }

    #[test]
    fn missing_section_is_one_error() {
        let findings = validate(&SpecFixture::new().without_section("Stakeholders").build());
        assert_eq!(
            messages(&findings, Severity::Error),
            vec!["Missing required section: Stakeholders"]
        );
        assert!(!findings.passes(false));
    }

    #[test]
    fn missing_parent_skips_subsection_checks() {
        let findings = validate(&SpecFixture::new().without_section("Success Metrics").build());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings.count(Severity::Warning), 0);
    }

    #[test]
    fn heading_skips_reported_per_occurrence() {
        let findings = validate("# A\n\ntext\n\n### B\n\ntext\n\n## C\n\ntext\n\n#### D\n\ntext\n");
        let skips: Vec<(String, Option<usize>)> = findings
            .iter()
            .filter(|i| i.category() == category::HIERARCHY)
            .map(|i| (i.message().to_string(), i.line()))
            .collect();
        assert_eq!(
            skips,
            vec![
                ("Heading level skipped (H1 → H3)".to_string(), Some(5)),
                ("Heading level skipped (H2 → H4)".to_string(), Some(13)),
            ]
        );
    }

    #[test]
    fn empty_sections() {
        let text = "## Filled\n\ntext\n## Empty\n\n## Parent\n### Child\nbody\n## Last\n";
        let findings = validate(text);
        let empty: Vec<Option<usize>> = findings
            .iter()
            .filter(|i| i.category() == category::CONTENT)
            .map(Issue::line)
            .collect();
        assert_eq!(empty, vec![Some(4), Some(9)]);
    }

    #[test]
    fn table_without_separator() {
        let text = "## Executive Summary\n\n| a | b |\n| 1 | 2 |\n\n| x | y |\n|---|---|\n";
        let findings = validate(text);
        let tables: Vec<Option<usize>> = findings
            .iter()
            .filter(|i| i.category() == category::TABLE)
            .map(Issue::line)
            .collect();
        assert_eq!(tables, vec![Some(3)]);
    }

    #[test]
    fn placeholders_and_filler_are_warnings() {
        let text = SpecFixture::new()
            .with_body("Stakeholders", "Owner: TBD\n\nLorem ipsum dolor.")
            .build();
        let findings = validate(&text);
        let warnings = messages(&findings, Severity::Warning);
        assert_eq!(
            warnings,
            vec![
                "Placeholder found: TBD".to_string(),
                "Filler text found: 'Lorem ipsum'".to_string()
            ]
        );
        assert!(findings.passes(false));
        assert!(!findings.passes(true));
    }

    #[test]
    fn broken_internal_links_only_when_enabled() {
        let text = SpecFixture::new()
            .with_body("Stakeholders", "See [risks](#risks-and-mitigations) and [gone](#nowhere).")
            .build();
        let doc = Document::parse(text);

        let relaxed = StructureValidator::new(StructureOptions::new().with_modular(false));
        assert!(relaxed.validate(&doc).is_empty());

        let checked = StructureValidator::new(
            StructureOptions::new()
                .with_modular(false)
                .with_internal_links(true),
        );
        assert_eq!(
            messages(&checked.validate(&doc), Severity::Error),
            vec!["Broken internal link: #nowhere"]
        );
    }
}
