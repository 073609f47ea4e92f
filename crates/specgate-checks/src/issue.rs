//! Severity-graded findings shared by every validator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Always fails the check
    Error,
    /// Fails the check only in strict mode
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Upper-case label
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category labels used across validators
pub mod category {
    pub const STRUCTURE: &str = "Structure";
    pub const HIERARCHY: &str = "Hierarchy";
    pub const CONTENT: &str = "Content";
    pub const TABLE: &str = "Table";
    pub const PLACEHOLDER: &str = "Placeholder";
    pub const LINK: &str = "Link";
    pub const MODULAR: &str = "Modular";
    pub const TRACEABILITY: &str = "Traceability";
    pub const ALIGNMENT: &str = "Alignment";
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    severity: Severity,
    category: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

impl Issue {
    /// Create an issue without a line number
    #[must_use]
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            line: None,
        }
    }

    /// ERROR issue
    #[must_use]
    pub fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    /// WARNING issue
    #[must_use]
    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    /// INFO issue
    #[must_use]
    pub fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    /// Attach a 1-based line number
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

/// Ordered list of issues, kept in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Findings {
    issues: Vec<Issue>,
}

impl Findings {
    /// Empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue
    #[inline]
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// All issues in discovery order
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Iterate issues
    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of one severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Number of issues of one severity
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }

    /// Any ERROR present
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// ERRORs always fail; WARNINGs fail only when `strict`
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        !self.has_errors() && (!strict || self.count(Severity::Warning) == 0)
    }
}

impl Extend<Issue> for Findings {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

impl FromIterator<Issue> for Findings {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Findings {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_mode_escalates_warnings() {
        let mut findings = Findings::new();
        findings.push(Issue::warning(category::CONTENT, "Empty section").at_line(4));
        findings.push(Issue::info(category::MODULAR, "No modular spec files found"));

        assert!(findings.passes(false));
        assert!(!findings.passes(true));

        findings.push(Issue::error(category::STRUCTURE, "Missing required section: Risks"));
        assert!(!findings.passes(false));
        assert_eq!(findings.count(Severity::Error), 1);
    }

    #[test]
    fn display_includes_line() {
        let issue = Issue::warning(category::HIERARCHY, "Heading level skipped (H2 → H4)").at_line(7);
        assert_eq!(
            issue.to_string(),
            "[WARNING] Hierarchy: Heading level skipped (H2 → H4) (line 7)"
        );
    }

    #[test]
    fn severity_serializes_upper_case() {
        let json = serde_json::to_string(&Issue::info("Link", "ok")).expect("serialize");
        assert_eq!(json, r#"{"severity":"INFO","category":"Link","message":"ok"}"#);
    }
}
