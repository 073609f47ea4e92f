//! Regex patterns used by the feature extractor

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder markers, matched as whole upper-case words
pub const PLACEHOLDER_MARKERS: &[&str] = &["TODO", "TBD", "FIXME", "XXX", "PLACEHOLDER", "TBC"];

/// Fenced code block languages that count as diagrams
pub const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "diagram", "ascii"];

/// Units that make a number a quantified metric
const METRIC_UNITS: &str = r"%|percent\b|ms\b|seconds?\b|minutes?\b|hours?\b|days?\b|GB\b|MB\b|req/sec\b";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

pub(crate) static REQUIREMENT_ID: Lazy<Regex> = Lazy::new(|| compile(r"^(NFR|FR)-(\d+)\b"));

/// A comparator with its number (and optional unit) or a number with a unit.
/// Leftmost-first matching makes `< 200ms` a single occurrence.
pub(crate) static METRIC: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?:[<>≤≥]=?\s*\d+(?:\.\d+)?\s*(?:{METRIC_UNITS})?)|(?:\b\d+(?:\.\d+)?\s*(?:{METRIC_UNITS}))"
    ))
});

pub(crate) static THRESHOLD: Lazy<Regex> = Lazy::new(|| compile(r"[<>≤≥]=?\s*\d+"));

pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| compile(r"\[?\b(TODO|TBD|FIXME|XXX|PLACEHOLDER|TBC)\b\]?"));

pub(crate) static FILLER: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:lorem ipsum|insert [^\n.]{1,40}? here|coming soon|to be determined|fill in later)\b")
});

pub(crate) static LINK: Lazy<Regex> =
    Lazy::new(|| compile(r#"\[([^\]]+)\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#));

pub(crate) static REFERENCE_LINK: Lazy<Regex> = Lazy::new(|| compile(r"\[([^\]]+)\]\[([^\]]+)\]"));

pub(crate) static REFERENCE_DEFINITION: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s{0,3}\[([^\]]+)\]:\s*(\S+)"));

pub(crate) static TABLE_SEPARATOR: Lazy<Regex> = Lazy::new(|| compile(r"^\|[-:| ]+\|$"));

pub(crate) static ANCHOR_DISALLOWED: Lazy<Regex> = Lazy::new(|| compile(r"[^\w\s-]"));

pub(crate) static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| compile(r"\s+"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_counts_comparator_with_unit_once() {
        assert_eq!(METRIC.find_iter("p95 < 200ms").count(), 1);
        assert_eq!(METRIC.find_iter("99.9% uptime, 5 minutes, 2 GB").count(), 3);
        assert_eq!(METRIC.find_iter("FR-001 and version 3").count(), 0);
    }

    #[test]
    fn placeholder_is_case_sensitive_word() {
        assert_eq!(PLACEHOLDER.find_iter("[TODO] and TBD").count(), 2);
        assert_eq!(PLACEHOLDER.find_iter("a todo list, TODOS").count(), 0);
    }

    #[test]
    fn filler_phrases() {
        assert!(FILLER.is_match("Lorem ipsum dolor"));
        assert!(FILLER.is_match("Insert diagram here"));
        assert!(FILLER.is_match("coming soon"));
        assert!(!FILLER.is_match("Insert the record into the table."));
    }
}
