//! Improvement suggestions
//!
//! A prioritized list of concrete edits that would raise a specification's
//! quality: quantify vague wording, add measurable criteria, diagrams,
//! acceptance criteria, risks and baselines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use specgate_document::{Document, Requirement, DIAGRAM_LANGUAGES};
use std::fmt;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static VAGUE_TERM: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:fast|slow|quick|good|bad|many|few|some)\b"));
static UNQUANTIFIED_CHANGE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:improve|enhance|optimize)\b"));
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| compile(r"\d+%"));
static QUALITATIVE_LEVEL: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(?:high|low|medium)\s+(?:performance|availability|quality)\b")
});
static DIGIT: Lazy<Regex> = Lazy::new(|| compile(r"\d+"));
static MEASURABLE: Lazy<Regex> = Lazy::new(|| compile(r"\d+\s*(?:ms|s|%|MB|GB|users?)"));
static VAGUE_TIMELINE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\b(?:soon|later|eventually|future)\b"));
static RISK_ROW: Lazy<Regex> = Lazy::new(|| compile(r"\|[^|\n]+\|[^|\n]+\|[^|\n]+\|[^|\n]+\|"));

/// Minimum "Acceptance Criteria" blocks
pub const MIN_ACCEPTANCE_BLOCKS: usize = 3;

/// Minimum risk table rows, header included
pub const MIN_RISK_ROWS: usize = 5;

/// Suggestion priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Medium Priority",
            Self::Low => "Low Priority",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One improvement opportunity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub issue: String,
    pub suggestion: String,
    pub example: String,
}

impl Suggestion {
    fn new(
        priority: Priority,
        issue: impl Into<String>,
        suggestion: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            line: None,
            issue: issue.into(),
            suggestion: suggestion.into(),
            example: example.into(),
        }
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Suggestions for one document, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementReport {
    pub spec_file: String,
    pub suggestions: Vec<Suggestion>,
}

impl ImprovementReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Suggestions of one priority
    pub fn with_priority(&self, priority: Priority) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(move |s| s.priority == priority)
    }

    /// Plain-text report
    #[must_use]
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Found {} improvement opportunities\n", self.len()));

        for priority in Priority::ALL {
            let items: Vec<&Suggestion> = self.with_priority(priority).collect();
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{} ({} items)\n", priority.label().to_uppercase(), items.len()));
            for (i, s) in items.iter().enumerate() {
                match s.line {
                    Some(line) => {
                        out.push_str(&format!("{}. Line {line}: {}\n", i + 1, s.issue));
                    }
                    None => {
                        out.push_str(&format!("{}. {}\n", i + 1, s.issue));
                    }
                }
                out.push_str(&format!("   Suggestion: {}\n", s.suggestion));
                // Multi-line examples only fit the markdown report
                if priority == Priority::High || !s.example.contains('\n') {
                    out.push_str(&format!("   Example: {}\n", s.example));
                }
            }
        }
        out
    }

    /// Markdown report
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = format!("# Spec Improvement Suggestions\n\nGenerated for: {}\n\n", self.spec_file);
        for priority in Priority::ALL {
            let mut items = self.with_priority(priority).peekable();
            if items.peek().is_none() {
                continue;
            }
            out.push_str(&format!("## {}\n\n", priority.label()));
            for s in items {
                out.push_str(&format!("- **Issue**: {}\n", s.issue));
                if let Some(line) = s.line {
                    out.push_str(&format!("  - **Line**: {line}\n"));
                }
                out.push_str(&format!("  - **Suggestion**: {}\n", s.suggestion));
                out.push_str(&format!("  - **Example**: {}\n\n", s.example));
            }
        }
        out
    }
}

/// Improvement analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct ImprovementAnalyzer;

impl ImprovementAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyze a document
    #[must_use]
    pub fn analyze(&self, doc: &Document) -> ImprovementReport {
        let mut suggestions = Vec::new();

        quantification(doc, &mut suggestions);
        measurable_requirements(doc, &mut suggestions);
        visual_aids(doc, &mut suggestions);
        acceptance_criteria(doc, &mut suggestions);
        risk_coverage(doc, &mut suggestions);
        deployment(doc, &mut suggestions);
        timeline(doc, &mut suggestions);
        success_metrics(doc, &mut suggestions);
        requirement_descriptions(doc, &mut suggestions);

        tracing::info!(
            document = %doc.identifier(),
            suggestions = suggestions.len(),
            "improvements analyzed"
        );
        ImprovementReport {
            spec_file: doc.identifier(),
            suggestions,
        }
    }
}

fn quantification(doc: &Document, out: &mut Vec<Suggestion>) {
    const EXAMPLE: &str = "Instead of 'fast response', use 'response time <200ms'";

    for (i, line) in doc.lines().iter().enumerate() {
        let number = i + 1;
        for m in VAGUE_TERM.find_iter(line) {
            out.push(
                Suggestion::new(
                    Priority::High,
                    format!("Vague term: '{}'", m.as_str()),
                    format!("Replace vague term '{}' with specific metric", m.as_str()),
                    EXAMPLE,
                )
                .at_line(number),
            );
        }
        for m in UNQUANTIFIED_CHANGE.find_iter(line) {
            if !PERCENTAGE.is_match(&line[m.end()..]) {
                out.push(
                    Suggestion::new(
                        Priority::High,
                        format!("Vague term: '{}'", m.as_str()),
                        "Quantify improvement - add specific percentage or metric",
                        EXAMPLE,
                    )
                    .at_line(number),
                );
            }
        }
        for m in QUALITATIVE_LEVEL.find_iter(line) {
            if !DIGIT.is_match(&line[m.end()..]) {
                out.push(
                    Suggestion::new(
                        Priority::High,
                        format!("Vague term: '{}'", m.as_str()),
                        format!("Define what '{}' means with specific thresholds", m.as_str()),
                        EXAMPLE,
                    )
                    .at_line(number),
                );
            }
        }
    }
}

/// Heading remainder and body of a requirement, up to the next heading
fn requirement_text(doc: &Document, req: &Requirement) -> String {
    let end = doc
        .features()
        .headings
        .iter()
        .find(|h| h.line > req.line)
        .map_or(doc.lines().len(), |h| h.line - 1);
    let body = doc.lines().get(req.line..end).unwrap_or_default().join("\n");
    format!("{}\n{body}", req.title)
}

fn measurable_requirements(doc: &Document, out: &mut Vec<Suggestion>) {
    for req in doc.features().requirements.values() {
        if !MEASURABLE.is_match(&requirement_text(doc, req)) {
            out.push(
                Suggestion::new(
                    Priority::High,
                    format!("Requirement {} lacks measurable criteria", req.id),
                    "Add specific, measurable acceptance criteria",
                    "Add: 'Must handle X requests/second with Y ms response time'",
                )
                .at_line(req.line),
            );
        }
    }
}

fn visual_aids(doc: &Document, out: &mut Vec<Suggestion>) {
    if let Some(section) = doc.section("System Architecture", 2) {
        let has_diagram = section.text().lines().any(|line| {
            line.trim_start()
                .strip_prefix("```")
                .is_some_and(|info| DIAGRAM_LANGUAGES.iter().any(|lang| info.starts_with(lang)))
        });
        if !has_diagram {
            out.push(
                Suggestion::new(
                    Priority::Medium,
                    "Architecture section lacks diagrams",
                    "Add system architecture diagram",
                    "Add a Mermaid diagram:\n```mermaid\ngraph TD\n    A[Client] --> B[API Gateway]\n    B --> C[Service 1]\n    B --> D[Service 2]\n```",
                )
                .at_line(section.heading.line),
            );
        }
    }

    let text = doc.text();
    let lower = text.to_lowercase();
    if let Some(at) = lower.find("data flow") {
        let start = floor_boundary(&lower, at.saturating_sub(100));
        let end = floor_boundary(&lower, (at + 100).min(lower.len()));
        if !lower[start..end].contains("```") {
            out.push(Suggestion::new(
                Priority::Medium,
                "Data flow mentioned but not visualized",
                "Add data flow diagram",
                "Show how data moves through the system components",
            ));
        }
    }
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn acceptance_criteria(doc: &Document, out: &mut Vec<Suggestion>) {
    if doc.text().matches("Acceptance Criteria").count() < MIN_ACCEPTANCE_BLOCKS {
        out.push(Suggestion::new(
            Priority::High,
            "Limited acceptance criteria sections",
            "Add acceptance criteria for each major requirement",
            "For each requirement add:\n**Acceptance Criteria**:\n- [ ] Specific measurable criterion 1\n- [ ] Specific measurable criterion 2\n- [ ] Performance threshold met",
        ));
    }
}

fn risk_coverage(doc: &Document, out: &mut Vec<Suggestion>) {
    let Some(section) = doc.section("Risk", 2) else {
        return;
    };
    let rows = RISK_ROW.find_iter(&section.text()).count();
    if rows < MIN_RISK_ROWS {
        out.push(
            Suggestion::new(
                Priority::Medium,
                format!("Only {rows} risks identified"),
                "Consider additional risk categories",
                "Common risks to consider:\n- Technical: Performance, scalability, integration\n- Schedule: Dependencies, resource availability\n- Security: Data breaches, vulnerabilities\n- Business: Market changes, user adoption",
            )
            .at_line(section.heading.line),
        );
    }
}

fn deployment(doc: &Document, out: &mut Vec<Suggestion>) {
    if !doc.text().to_lowercase().contains("deploy") {
        out.push(Suggestion::new(
            Priority::Medium,
            "No deployment architecture described",
            "Add deployment architecture section",
            "Add section:\n### Deployment Architecture\n- Environment strategy (dev/staging/prod)\n- Container orchestration\n- Scaling approach\n- Monitoring and logging",
        ));
    }
}

fn timeline(doc: &Document, out: &mut Vec<Suggestion>) {
    let mut terms: Vec<&str> = Vec::new();
    for m in VAGUE_TIMELINE.find_iter(doc.text()) {
        if !terms.contains(&m.as_str()) {
            terms.push(m.as_str());
        }
    }
    if !terms.is_empty() {
        out.push(Suggestion::new(
            Priority::High,
            format!("Vague timeline terms found: {}", terms.join(", ")),
            "Replace with specific dates or durations",
            "Instead of 'future enhancement', use 'Phase 2 (Month 4-6)'",
        ));
    }
}

fn success_metrics(doc: &Document, out: &mut Vec<Suggestion>) {
    let Some(section) = doc.section("Success Metrics", 2) else {
        return;
    };
    if !section.text().to_lowercase().contains("current") {
        out.push(
            Suggestion::new(
                Priority::High,
                "Success metrics lack baseline data",
                "Add current state metrics for comparison",
                "For each metric, show: Current → Target",
            )
            .at_line(section.heading.line),
        );
    }
}

fn requirement_descriptions(doc: &Document, out: &mut Vec<Suggestion>) {
    for req in doc.features().requirements.values() {
        if req.summary.is_empty() {
            out.push(
                Suggestion::new(
                    Priority::Low,
                    format!("Requirement {} has no description", req.id),
                    "Follow the heading with a one-line statement of the requirement",
                    "#### FR-001: Order capture\nThe system must accept orders through the REST API.",
                )
                .at_line(req.line),
            );
        }
    }
}
