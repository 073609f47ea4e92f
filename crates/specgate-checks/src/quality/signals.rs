//! Keyword families counted by the quality sub-checks

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

/// `PostgreSQL 16.1`, `Rust 1.75`, `React v18.2`
pub(super) static VERSIONED_TECH: Lazy<Regex> =
    Lazy::new(|| compile(r"\b[A-Z][A-Za-z0-9+#.-]*\s+v?\d+(?:\.\d+)+\b"));

/// A choice verb followed, within 50 characters, by a reason
pub(super) static JUSTIFICATION: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:chose|chosen|selected|using|built with)\b[^\n]{0,50}?\b(?:because|due to|for)\b")
});

pub(super) static TIMELINE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b\d+\s*(?:weeks?|months?|sprints?)\b"));

pub(super) static TEAM: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b\d+\s*(?:developers?|engineers?|people|FTEs?)\b"));

pub(super) static BUDGET: Lazy<Regex> =
    Lazy::new(|| compile(r"\$\s?\d[\d,]*(?:\.\d+)?|(?i:\bbudget\b)"));

pub(super) static DEPENDENCY: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:depends on|requires|prerequisites?|dependenc(?:y|ies))\b")
});

pub(super) static RISK: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:risks?|mitigations?|mitigated|contingenc(?:y|ies))\b")
});

/// Requirement statements phrased with a binding modal verb
pub(super) static MODAL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)\b(?:shall|must)\b"));

pub(super) static SCENARIO: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:scenarios?|test cases?|acceptance criteria)\b")
});

pub(super) static ACCEPTANCE: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:acceptance criteria|definition of done|success criteria)\b")
});

pub(super) static QUALITY: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:coverage|uptime|availability|performance|quality)\b")
});

/// Occurrences of a pattern in text
pub(super) fn count(pattern: &Regex, text: &str) -> usize {
    pattern.find_iter(text).count()
}
