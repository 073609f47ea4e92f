//! Feature set extracted from a specification document
//!
//! Everything downstream validators look at lives here: headings and the
//! section/subsection outline, requirement declarations, and the raw counts
//! used by the quality heuristics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keywords that make a requirement high-risk
pub const HIGH_RISK_KEYWORDS: [&str; 4] = ["real-time", "performance", "security", "integration"];

/// Heading found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level (1 = H1, 2 = H2, etc.)
    pub level: u8,

    /// Heading text without hashes or a trailing `{#id}`
    pub title: String,

    /// 1-based line number
    pub line: usize,

    /// Generated anchor slug, deduplicated across the document
    pub anchor: String,

    /// Explicit `{#id}` anchor
    pub custom_id: Option<String>,
}

impl Heading {
    /// Whether the heading answers to `anchor` (generated or explicit)
    #[inline]
    #[must_use]
    pub fn answers_to(&self, anchor: &str) -> bool {
        self.anchor == anchor || self.custom_id.as_deref() == Some(anchor)
    }

    /// Case-insensitive title prefix match
    #[must_use]
    pub fn title_starts_with(&self, prefix: &str) -> bool {
        self.title
            .to_lowercase()
            .starts_with(&prefix.to_lowercase())
    }
}

/// Requirement kind, derived from the identifier prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// `FR-###`
    Functional,
    /// `NFR-###`
    NonFunctional,
}

impl RequirementKind {
    /// Identifier prefix
    #[inline]
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Functional => "FR",
            Self::NonFunctional => "NFR",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Functional => "Functional",
            Self::NonFunctional => "Non-functional",
        }
    }
}

/// Trace type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// Referenced from the System Architecture section
    Architecture,
    /// Referenced from acceptance scenarios
    Acceptance,
    /// Referenced from the Risks section
    Risk,
}

/// Trace flags of a requirement
///
/// Flags can only be raised. There is no way to clear a flag once set, so
/// a validation pass is monotonic by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFlags {
    architecture: bool,
    acceptance: bool,
    risk: bool,
}

impl TraceFlags {
    /// Raise a flag
    #[inline]
    pub fn mark(&mut self, kind: TraceKind) {
        match kind {
            TraceKind::Architecture => self.architecture = true,
            TraceKind::Acceptance => self.acceptance = true,
            TraceKind::Risk => self.risk = true,
        }
    }

    /// Read a flag
    #[inline]
    #[must_use]
    pub fn is_set(&self, kind: TraceKind) -> bool {
        match kind {
            TraceKind::Architecture => self.architecture,
            TraceKind::Acceptance => self.acceptance,
            TraceKind::Risk => self.risk,
        }
    }
}

/// Requirement declared by an `FR-`/`NFR-` heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Identifier, e.g. `FR-001`
    pub id: String,

    /// Functional or non-functional
    pub kind: RequirementKind,

    /// Heading text after the identifier
    pub title: String,

    /// First non-empty body line after the heading
    pub summary: String,

    /// 1-based line of the declaring heading
    pub line: usize,

    traces: TraceFlags,
}

impl Requirement {
    /// Create an untraced requirement
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: RequirementKind,
        title: impl Into<String>,
        summary: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            summary: summary.into(),
            line,
            traces: TraceFlags::default(),
        }
    }

    /// Current trace flags
    #[inline]
    #[must_use]
    pub fn traces(&self) -> TraceFlags {
        self.traces
    }

    /// Record a trace
    #[inline]
    pub fn mark_traced(&mut self, kind: TraceKind) {
        self.traces.mark(kind);
    }

    /// One-line description: heading text, or the summary line when the
    /// heading carries only the identifier
    #[must_use]
    pub fn description(&self) -> &str {
        if self.title.is_empty() {
            &self.summary
        } else {
            &self.title
        }
    }

    /// Whether heading or summary mention a high-risk keyword
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        let haystack = format!("{} {}", self.title, self.summary).to_lowercase();
        HIGH_RISK_KEYWORDS.iter().any(|k| haystack.contains(k))
    }
}

/// Where a link points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkTarget {
    /// `http://`, `https://` or `mailto:`
    External { url: String },
    /// `#anchor` within the same document
    Anchor { anchor: String },
    /// Relative file, optionally with its own anchor
    File { path: String, anchor: Option<String> },
}

impl LinkTarget {
    /// Classify a raw link target
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("mailto:")
        {
            Self::External {
                url: raw.to_string(),
            }
        } else if let Some(anchor) = raw.strip_prefix('#') {
            Self::Anchor {
                anchor: anchor.to_string(),
            }
        } else {
            match raw.split_once('#') {
                Some((path, anchor)) => Self::File {
                    path: path.to_string(),
                    anchor: Some(anchor.to_string()),
                },
                None => Self::File {
                    path: raw.to_string(),
                    anchor: None,
                },
            }
        }
    }
}

impl std::fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::External { url } => write!(f, "{url}"),
            Self::Anchor { anchor } => write!(f, "#{anchor}"),
            Self::File {
                path,
                anchor: Some(anchor),
            } => write!(f, "{path}#{anchor}"),
            Self::File { path, anchor: None } => write!(f, "{path}"),
        }
    }
}

/// Inline link `[text](target)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link text
    pub text: String,
    /// Classified target
    pub target: LinkTarget,
    /// 1-based line
    pub line: usize,
}

/// Reference-style link `[text][label]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLink {
    /// Link text
    pub text: String,
    /// Reference label
    pub label: String,
    /// 1-based line
    pub line: usize,
}

/// Placeholder family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// `TODO`, `TBD`, `FIXME`, ...
    Marker,
    /// Generic filler prose such as "Lorem ipsum"
    Filler,
}

/// Placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderHit {
    /// Matched text
    pub term: String,
    /// Marker or filler
    pub kind: PlaceholderKind,
    /// 1-based line
    pub line: usize,
}

/// Pipe table: a run of consecutive `|` lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// 1-based line of the first row
    pub line: usize,
    /// Number of `|` lines in the run
    pub rows: usize,
    /// Whether the second line is a `|---|` separator row
    pub has_separator: bool,
}

/// Structural features of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// All headings in document order
    pub headings: Vec<Heading>,

    /// H2 title → H3 subsection titles, insertion ordered
    pub sections: IndexMap<String, Vec<String>>,

    /// Requirements keyed by identifier, in declaration order
    pub requirements: IndexMap<String, Requirement>,

    /// Quantified metric occurrences
    pub metric_count: usize,

    /// Threshold comparator occurrences (`< 200ms`, `≥ 99.9%`)
    pub threshold_count: usize,

    /// Placeholder occurrences
    pub placeholders: Vec<PlaceholderHit>,

    /// Fenced mermaid/diagram/ascii blocks
    pub diagram_blocks: usize,

    /// Lines starting with `|`
    pub table_rows: usize,

    /// Tables in document order
    pub tables: Vec<Table>,

    /// Inline links
    pub links: Vec<Link>,

    /// Reference-style links
    pub reference_links: Vec<ReferenceLink>,

    /// `[label]: target` definitions
    pub reference_definitions: IndexMap<String, String>,
}

impl FeatureSet {
    /// Number of functional requirements
    #[must_use]
    pub fn functional_count(&self) -> usize {
        self.count_kind(RequirementKind::Functional)
    }

    /// Number of non-functional requirements
    #[must_use]
    pub fn non_functional_count(&self) -> usize {
        self.count_kind(RequirementKind::NonFunctional)
    }

    fn count_kind(&self, kind: RequirementKind) -> usize {
        self.requirements.values().filter(|r| r.kind == kind).count()
    }

    /// Total placeholder occurrences
    #[inline]
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Links pointing at `#anchor` in this document
    pub fn anchor_links(&self) -> impl Iterator<Item = (&Link, &str)> {
        self.links.iter().filter_map(|link| match &link.target {
            LinkTarget::Anchor { anchor } => Some((link, anchor.as_str())),
            _ => None,
        })
    }

    /// Number of in-document cross-reference links
    #[must_use]
    pub fn internal_link_count(&self) -> usize {
        self.anchor_links().count()
    }

    /// Number of headings carrying an explicit `{#id}` anchor
    #[must_use]
    pub fn explicit_anchor_count(&self) -> usize {
        self.headings.iter().filter(|h| h.custom_id.is_some()).count()
    }

    /// Whether some heading answers to `anchor`
    #[must_use]
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.headings.iter().any(|h| h.answers_to(anchor))
    }

    /// First heading at level ≤ `max_level` whose title starts with `prefix`
    #[must_use]
    pub fn find_heading(&self, prefix: &str, max_level: u8) -> Option<&Heading> {
        self.headings
            .iter()
            .find(|h| h.level <= max_level && h.title_starts_with(prefix))
    }

    /// Headings more than one level deeper than their predecessor, paired
    /// with the predecessor's level
    #[must_use]
    pub fn level_skips(&self) -> Vec<(&Heading, u8)> {
        self.headings
            .windows(2)
            .filter(|pair| pair[1].level > pair[0].level + 1)
            .map(|pair| (&pair[1], pair[0].level))
            .collect()
    }

    /// Find requirement by ID
    #[inline]
    #[must_use]
    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_flags_only_raise() {
        let mut flags = TraceFlags::default();
        assert!(!flags.is_set(TraceKind::Risk));
        flags.mark(TraceKind::Risk);
        flags.mark(TraceKind::Risk);
        assert!(flags.is_set(TraceKind::Risk));
        assert!(!flags.is_set(TraceKind::Architecture));
    }

    #[test]
    fn high_risk_reads_title_and_summary() {
        let by_title = Requirement::new(
            "FR-007",
            RequirementKind::Functional,
            "Security audit logging",
            "Every admin action is recorded.",
            10,
        );
        assert!(by_title.is_high_risk());

        let by_summary = Requirement::new(
            "NFR-002",
            RequirementKind::NonFunctional,
            "",
            "Real-time updates within 500 ms.",
            12,
        );
        assert!(by_summary.is_high_risk());

        let plain = Requirement::new(
            "FR-001",
            RequirementKind::Functional,
            "User profile",
            "Users can edit their display name.",
            3,
        );
        assert!(!plain.is_high_risk());
    }

    #[test]
    fn link_targets_are_classified() {
        assert_eq!(
            LinkTarget::classify("https://example.com"),
            LinkTarget::External {
                url: "https://example.com".into()
            }
        );
        assert_eq!(
            LinkTarget::classify("#overview"),
            LinkTarget::Anchor {
                anchor: "overview".into()
            }
        );
        assert_eq!(
            LinkTarget::classify("docs/risks.md#top"),
            LinkTarget::File {
                path: "docs/risks.md".into(),
                anchor: Some("top".into())
            }
        );
        assert_eq!(LinkTarget::classify("mailto:a@b.c").to_string(), "mailto:a@b.c");
    }

    #[test]
    fn description_falls_back_to_summary() {
        let req = Requirement::new("FR-002", RequirementKind::Functional, "", "Export CSV", 4);
        assert_eq!(req.description(), "Export CSV");
    }
}
