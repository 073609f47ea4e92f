//! Line-oriented feature extraction
//!
//! The extractor never fails: malformed markdown simply yields fewer
//! features. Fenced code blocks are masked out for headings, tables and
//! links.

use crate::anchor::SlugRegistry;
use crate::features::{
    FeatureSet, Heading, Link, LinkTarget, PlaceholderHit, PlaceholderKind, ReferenceLink,
    Requirement, RequirementKind, Table,
};
use crate::fences::{self, FenceScan};
use crate::patterns::{
    FILLER, LINK, METRIC, PLACEHOLDER, REFERENCE_DEFINITION, REFERENCE_LINK, REQUIREMENT_ID,
    TABLE_SEPARATOR, THRESHOLD,
};
use indexmap::IndexMap;

/// Extract the feature set of a markdown document
#[must_use]
pub fn extract(text: &str) -> FeatureSet {
    let starts = fences::line_starts(text);
    let fences = fences::scan(text, &starts);
    let lines: Vec<&str> = text.lines().collect();

    let headings = collect_headings(&lines, &fences);
    let sections = outline(&headings);
    let requirements = collect_requirements(&lines, &fences, &headings);

    let (links, reference_links, reference_definitions) = collect_links(&lines, &fences);

    let tables = collect_tables(&lines, &fences);
    let table_rows = tables.iter().map(|t| t.rows).sum();

    FeatureSet {
        headings,
        sections,
        requirements,
        metric_count: METRIC.find_iter(text).count(),
        threshold_count: THRESHOLD.find_iter(text).count(),
        placeholders: collect_placeholders(&lines),
        diagram_blocks: fences.diagram_blocks,
        table_rows,
        tables,
        links,
        reference_links,
        reference_definitions,
    }
}

/// Parse an ATX heading line into level and raw title
fn parse_heading(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let title = rest.trim();
    if title.is_empty() {
        return None;
    }

    // Optional closing sequence: `## Title ##`
    let unclosed = title.trim_end_matches('#');
    let title = if unclosed.len() < title.len() && unclosed.ends_with(' ') {
        unclosed.trim_end()
    } else {
        title
    };

    Some((u8::try_from(level).ok()?, title))
}

/// Split a trailing `{#id}` off a heading title
fn extract_heading_id(title: &str) -> (String, Option<String>) {
    if let Some(start) = title.rfind("{#") {
        if let Some(end) = title[start..].find('}') {
            let id = title[start + 2..start + end].trim();
            if !id.is_empty() {
                let clean_title = title[..start].trim().to_string();
                return (clean_title, Some(id.to_string()));
            }
        }
    }
    (title.to_string(), None)
}

fn collect_headings(lines: &[&str], fences: &FenceScan) -> Vec<Heading> {
    let mut slugs = SlugRegistry::default();
    let mut headings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if fences.is_code(index) {
            continue;
        }
        let Some((level, raw_title)) = parse_heading(line) else {
            continue;
        };

        let (title, custom_id) = extract_heading_id(raw_title);
        headings.push(Heading {
            level,
            anchor: slugs.claim(&title),
            title,
            line: index + 1,
            custom_id,
        });
    }

    headings
}

/// Section outline from H2/H3 headings; an H1 closes the open section
fn outline(headings: &[Heading]) -> IndexMap<String, Vec<String>> {
    let mut sections: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut current: Option<&str> = None;

    for heading in headings {
        match heading.level {
            1 => current = None,
            2 => {
                sections.entry(heading.title.clone()).or_default();
                current = Some(&heading.title);
            }
            3 => {
                if let Some(subsections) = current.and_then(|title| sections.get_mut(title)) {
                    subsections.push(heading.title.clone());
                }
            }
            _ => {}
        }
    }

    sections
}

fn collect_requirements(
    lines: &[&str],
    fences: &FenceScan,
    headings: &[Heading],
) -> IndexMap<String, Requirement> {
    let mut requirements = IndexMap::new();

    for (position, heading) in headings.iter().enumerate() {
        if !matches!(heading.level, 3 | 4) {
            continue;
        }
        let Some(caps) = REQUIREMENT_ID.captures(&heading.title) else {
            continue;
        };

        let id = caps[0].to_string();
        let kind = if &caps[1] == "NFR" {
            RequirementKind::NonFunctional
        } else {
            RequirementKind::Functional
        };

        let remainder = heading.title[caps[0].len()..]
            .trim_start_matches(|c: char| matches!(c, ':' | '-' | '–' | '—') || c.is_whitespace())
            .trim_end();

        // Body runs to the next heading of level <= 4
        let body_end = headings[position + 1..]
            .iter()
            .find(|h| h.level <= 4)
            .map_or(lines.len(), |h| h.line - 1);
        let summary = (heading.line..body_end)
            .filter(|&i| !fences.is_code(i))
            .map(|i| lines[i].trim())
            .find(|line| !line.is_empty())
            .unwrap_or_default();

        requirements.entry(id.clone()).or_insert_with(|| {
            Requirement::new(id, kind, remainder, summary, heading.line)
        });
    }

    requirements
}

fn collect_placeholders(lines: &[&str]) -> Vec<PlaceholderHit> {
    let mut hits = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let mut on_line: Vec<(usize, PlaceholderHit)> = Vec::new();

        for caps in PLACEHOLDER.captures_iter(line) {
            let start = caps.get(0).map_or(0, |m| m.start());
            on_line.push((
                start,
                PlaceholderHit {
                    term: caps[1].to_string(),
                    kind: PlaceholderKind::Marker,
                    line: index + 1,
                },
            ));
        }
        for m in FILLER.find_iter(line) {
            on_line.push((
                m.start(),
                PlaceholderHit {
                    term: m.as_str().to_string(),
                    kind: PlaceholderKind::Filler,
                    line: index + 1,
                },
            ));
        }

        on_line.sort_by_key(|(start, _)| *start);
        hits.extend(on_line.into_iter().map(|(_, hit)| hit));
    }

    hits
}

fn collect_tables(lines: &[&str], fences: &FenceScan) -> Vec<Table> {
    let is_row = |i: usize| !fences.is_code(i) && lines[i].trim_start().starts_with('|');
    let mut tables = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        if !is_row(index) {
            index += 1;
            continue;
        }
        let start = index;
        while index < lines.len() && is_row(index) {
            index += 1;
        }
        let has_separator = index - start > 1 && TABLE_SEPARATOR.is_match(lines[start + 1].trim());
        tables.push(Table {
            line: start + 1,
            rows: index - start,
            has_separator,
        });
    }

    tables
}

type LinkScan = (Vec<Link>, Vec<ReferenceLink>, IndexMap<String, String>);

fn collect_links(lines: &[&str], fences: &FenceScan) -> LinkScan {
    let mut links = Vec::new();
    let mut reference_links = Vec::new();
    let mut definitions = IndexMap::new();

    for (index, line) in lines.iter().enumerate() {
        if fences.is_code(index) {
            continue;
        }
        let number = index + 1;

        if let Some(caps) = REFERENCE_DEFINITION.captures(line) {
            definitions
                .entry(caps[1].trim().to_lowercase())
                .or_insert_with(|| caps[2].to_string());
            continue;
        }

        for caps in LINK.captures_iter(line) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if is_image(line, start) {
                continue;
            }
            links.push(Link {
                text: caps[1].to_string(),
                target: LinkTarget::classify(&caps[2]),
                line: number,
            });
        }

        for caps in REFERENCE_LINK.captures_iter(line) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if is_image(line, start) {
                continue;
            }
            reference_links.push(ReferenceLink {
                text: caps[1].to_string(),
                label: caps[2].trim().to_string(),
                line: number,
            });
        }
    }

    (links, reference_links, definitions)
}

fn is_image(line: &str, start: usize) -> bool {
    start > 0 && line.as_bytes()[start - 1] == b'!'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_heading_levels() {
        assert_eq!(parse_heading("# Title"), Some((1, "Title")));
        assert_eq!(parse_heading("### Deep ###"), Some((3, "Deep")));
        assert_eq!(parse_heading("## C#"), Some((2, "C#")));
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("#   "), None);
    }

    #[test]
    fn heading_custom_id() {
        let (title, id) = extract_heading_id("Overview {#intro}");
        assert_eq!(title, "Overview");
        assert_eq!(id.as_deref(), Some("intro"));

        let (title, id) = extract_heading_id("Plain");
        assert_eq!(title, "Plain");
        assert_eq!(id, None);
    }

    #[test]
    fn outline_groups_subsections() {
        let text = "# Doc\n## Requirements\n### Functional Requirements\n### Non-Functional Requirements\n## Risks\n# Appendix\n### Orphan\n";
        let features = extract(text);

        let expected: Vec<(&str, Vec<&str>)> = vec![
            (
                "Requirements",
                vec!["Functional Requirements", "Non-Functional Requirements"],
            ),
            ("Risks", vec![]),
        ];
        let actual: Vec<(&str, Vec<&str>)> = features
            .sections
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().map(String::as_str).collect()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn requirements_with_summary() {
        let text = "## Requirements\n### FR-001: User login\nUsers sign in with SSO.\n### NFR-002\n\nResponses under 200ms.\n#### FR-003 - Export\n### FR-001: Duplicate\nIgnored.\n";
        let features = extract(text);

        assert_eq!(features.requirements.len(), 3);
        let login = &features.requirements["FR-001"];
        assert_eq!(login.title, "User login");
        assert_eq!(login.summary, "Users sign in with SSO.");
        assert_eq!(login.line, 2);

        let nfr = &features.requirements["NFR-002"];
        assert_eq!(nfr.kind, RequirementKind::NonFunctional);
        assert_eq!(nfr.title, "");
        assert_eq!(nfr.summary, "Responses under 200ms.");

        let export = &features.requirements["FR-003"];
        assert_eq!(export.title, "Export");
        assert_eq!(export.summary, "");
    }

    #[test]
    fn requirement_must_lead_the_heading() {
        let features = extract("### Covers FR-001\n## FR-002 too shallow\n");
        assert!(features.requirements.is_empty());
    }

    #[test]
    fn code_fences_hide_headings_tables_and_links() {
        let text = "# Real\n```text\n# fake\n| a | b |\n[x](#nowhere)\n```\n| a | b |\n";
        let features = extract(text);
        assert_eq!(features.headings.len(), 1);
        assert_eq!(features.table_rows, 1);
        assert!(features.links.is_empty());
    }

    #[test]
    fn tables_track_separator_rows() {
        let text = "| a | b |\n|---|:-:|\n| 1 | 2 |\n\ntext\n| x | y |\n| 3 | 4 |\n";
        let features = extract(text);
        assert_eq!(features.table_rows, 5);
        assert_eq!(
            features.tables,
            vec![
                Table { line: 1, rows: 3, has_separator: true },
                Table { line: 6, rows: 2, has_separator: false },
            ]
        );
    }

    #[test]
    fn placeholders_in_line_order() {
        let text = "Intro\nLorem ipsum TODO\n[TBD] later\n";
        let features = extract(text);
        let terms: Vec<(&str, usize)> = features
            .placeholders
            .iter()
            .map(|p| (p.term.as_str(), p.line))
            .collect();
        assert_eq!(terms, vec![("Lorem ipsum", 2), ("TODO", 2), ("TBD", 3)]);
    }

    #[test]
    fn links_and_references() {
        let text = "See [arch](#system-architecture), ![img](pic.png), [site](https://x.io)\nand [risks](risks.md#top) or [ref][Docs].\n\n[docs]: ./docs/index.md\n";
        let features = extract(text);

        assert_eq!(features.links.len(), 3);
        assert_eq!(features.internal_link_count(), 1);
        assert_eq!(features.reference_links.len(), 1);
        assert_eq!(features.reference_links[0].label, "Docs");
        assert_eq!(
            features.reference_definitions.get("docs").map(String::as_str),
            Some("./docs/index.md")
        );
    }

    #[test]
    fn duplicate_heading_anchors() {
        let features = extract("## Notes\n## Notes\n## Notes {#extra}\n");
        let anchors: Vec<&str> = features.headings.iter().map(|h| h.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["notes", "notes-1", "notes-2"]);
        assert!(features.has_anchor("extra"));
        assert_eq!(features.explicit_anchor_count(), 1);
    }

    #[test]
    fn empty_text() {
        assert_eq!(extract(""), FeatureSet::default());
    }
}
