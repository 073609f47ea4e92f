//! Facts extracted from the spec, the roadmap and the phase plans

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use specgate_document::{Document, RequirementKind};
use std::fmt;
use std::path::{Path, PathBuf};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static TIMELINE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(\d+)\s*(months?|weeks?)"));
static TEAM: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(\d+)\s*(?:developers?|engineers?|people)"));
static TECH_LINE: Lazy<Regex> =
    Lazy::new(|| compile(r"(Frontend|Backend|Database)[^\n]*?:\s*([^\n]+)"));
static TECH_NAME: Lazy<Regex> = Lazy::new(|| compile(r"\b[A-Z][A-Za-z0-9+#.]*"));
static PHASE_HEADING: Lazy<Regex> = Lazy::new(|| compile(r"(?i)Phase\s+(\d+)[:\s]+([^\n]+)"));
static PHASE_MARK: Lazy<Regex> = Lazy::new(|| compile(r"(?i)Phase\s+(\d+)\b"));
static DELIVERABLE: Lazy<Regex> = Lazy::new(|| compile(r"(?:Delivers|Outcomes?):\s*([^\n]+)"));

/// Declared delivery timeline, e.g. `6 months`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub amount: u32,
    /// Unit as written: `month`, `months`, `week` or `weeks`
    pub unit: String,
}

impl Timeline {
    /// Length in weeks, counting a month as four weeks
    #[must_use]
    pub fn weeks(&self) -> u32 {
        if self.unit.to_lowercase().starts_with("month") {
            self.amount.saturating_mul(4)
        } else {
            self.amount
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}

/// `Frontend` / `Backend` / `Database` lines of the Technology Stack section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    pub database: Vec<String>,
}

impl TechStack {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frontend.is_empty() && self.backend.is_empty() && self.database.is_empty()
    }
}

/// Technology names in a stack line: the capitalised words, or the whole
/// line when it has none
#[must_use]
pub fn tech_names(line: &str) -> Vec<String> {
    let names: Vec<String> = TECH_NAME
        .find_iter(line)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        vec![line.trim().to_string()]
    } else {
        names
    }
}

/// What the specification commits to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFacts {
    /// Requirement descriptions, functional first, in declaration order
    pub requirements: Vec<String>,
    pub tech_stack: TechStack,
    pub timeline: Option<Timeline>,
    pub team_size: Option<u32>,
}

impl SpecFacts {
    /// Extract facts from a parsed specification
    #[must_use]
    pub fn extract(doc: &Document) -> Self {
        let requirements = doc.features().requirements.values();
        let functional = requirements
            .clone()
            .filter(|r| r.kind == RequirementKind::Functional);
        let non_functional = requirements.filter(|r| r.kind == RequirementKind::NonFunctional);
        let requirements = functional
            .chain(non_functional)
            .map(|r| r.description().to_string())
            .collect();

        let mut tech_stack = TechStack::default();
        if let Some(section) = doc.section("Technology Stack", 3) {
            for caps in TECH_LINE.captures_iter(&section.text()) {
                let value = caps[2].trim().to_string();
                match &caps[1] {
                    "Frontend" => tech_stack.frontend.push(value),
                    "Backend" => tech_stack.backend.push(value),
                    _ => tech_stack.database.push(value),
                }
            }
        }

        let timeline = TIMELINE.captures(doc.text()).and_then(|caps| {
            Some(Timeline {
                amount: caps[1].parse().ok()?,
                unit: caps[2].to_string(),
            })
        });
        let team_size = TEAM
            .captures(doc.text())
            .and_then(|caps| caps[1].parse().ok());

        Self {
            requirements,
            tech_stack,
            timeline,
            team_size,
        }
    }
}

/// A roadmap phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub number: u32,
    pub name: String,
    pub deliverables: Vec<String>,
}

impl Phase {
    /// `Phase N`
    #[must_use]
    pub fn key(&self) -> String {
        format!("Phase {}", self.number)
    }
}

/// What the roadmap plans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapFacts {
    pub phases: Vec<Phase>,
    #[serde(skip)]
    text: String,
}

impl RoadmapFacts {
    /// Extract phases and their deliverables; the first mention of a phase
    /// number wins
    #[must_use]
    pub fn extract(text: &str) -> Self {
        let marks: Vec<(usize, u32)> = PHASE_MARK
            .captures_iter(text)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                Some((at, caps[1].parse().ok()?))
            })
            .collect();

        let mut phases: Vec<Phase> = Vec::new();
        for caps in PHASE_HEADING.captures_iter(text) {
            let Ok(number) = caps[1].parse::<u32>() else {
                continue;
            };
            if phases.iter().any(|p| p.number == number) {
                continue;
            }
            phases.push(Phase {
                number,
                name: caps[2].trim().to_string(),
                deliverables: deliverables(text, &marks, number),
            });
        }

        Self {
            phases,
            text: text.to_string(),
        }
    }

    /// Lower-cased roadmap text
    #[must_use]
    pub fn text_lower(&self) -> String {
        self.text.to_lowercase()
    }

    /// Phase by number
    #[must_use]
    pub fn phase(&self, number: u32) -> Option<&Phase> {
        self.phases.iter().find(|p| p.number == number)
    }
}

/// Deliverables between the first mark of `number` and the next phase mark
fn deliverables(text: &str, marks: &[(usize, u32)], number: u32) -> Vec<String> {
    let Some(position) = marks.iter().position(|&(_, n)| n == number) else {
        return Vec::new();
    };
    let start = marks[position].0;
    let end = marks.get(position + 1).map_or(text.len(), |&(at, _)| at);

    DELIVERABLE
        .captures_iter(&text[start..end])
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// One phase plan record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub file: PathBuf,
    /// `metadata.phase` as written, `unknown` when absent
    pub phase: String,
    pub team_size: u32,
    /// `metadata.duration_weeks`, or `metadata.duration_months` × 4
    pub duration_weeks: u32,
    pub objectives: Vec<String>,
    pub frontend: Option<Vec<String>>,
    pub backend: Option<Vec<String>>,
}

impl PhasePlan {
    /// `Phase N`
    #[must_use]
    pub fn key(&self) -> String {
        format!("Phase {}", self.phase)
    }

    /// Whether the plan belongs to roadmap phase `number`
    #[must_use]
    pub fn is_phase(&self, number: u32) -> bool {
        self.phase.trim() == number.to_string()
    }

    /// Parse a phase plan YAML document
    ///
    /// # Errors
    ///
    /// The YAML parser's message.
    pub fn parse(file: &Path, yaml: &str) -> Result<Self, serde_yaml::Error> {
        let raw: RawPlan = serde_yaml::from_str(yaml)?;
        let meta = raw.metadata;

        let duration_weeks = meta
            .duration_weeks
            .or_else(|| meta.duration_months.map(|m| m.saturating_mul(4)))
            .unwrap_or(0);

        Ok(Self {
            file: file.to_path_buf(),
            phase: meta.phase.as_ref().and_then(scalar).unwrap_or_else(|| "unknown".to_string()),
            team_size: meta.team_size.unwrap_or(0),
            duration_weeks,
            objectives: strings(&raw.objectives.primary),
            frontend: raw.technical_requirements.frontend.as_ref().map(strings),
            backend: raw.technical_requirements.backend.as_ref().map(strings),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlan {
    metadata: RawMetadata,
    objectives: RawObjectives,
    technical_requirements: RawTech,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    phase: Option<Value>,
    team_size: Option<u32>,
    duration_weeks: Option<u32>,
    duration_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawObjectives {
    primary: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTech {
    frontend: Option<Value>,
    backend: Option<Value>,
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flatten a scalar, list or mapping into its string leaves
fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().flat_map(strings).collect(),
        Value::Mapping(map) => map.values().flat_map(strings).collect(),
        Value::Tagged(tagged) => strings(&tagged.value),
        Value::Null => Vec::new(),
        other => scalar(other).into_iter().collect(),
    }
}
