//! Cross-document consistency checks
//!
//! Each check appends warning messages; none of them is fatal.

use super::facts::{tech_names, PhasePlan, RoadmapFacts, SpecFacts};

/// Requirements sampled against the roadmap
const REQUIREMENT_SAMPLE: usize = 5;

/// Leading words of a requirement used as keywords
const KEYWORDS_PER_REQUIREMENT: usize = 3;

/// Allowed difference between the spec timeline and the phase plans
pub const TIMELINE_TOLERANCE_WEEKS: u32 = 2;

/// The first few spec requirements share a keyword with the roadmap
pub(super) fn requirements_in_roadmap(
    spec: &SpecFacts,
    roadmap: &RoadmapFacts,
    warnings: &mut Vec<String>,
) {
    let roadmap_text = roadmap.text_lower();
    let untraced: Vec<String> = spec
        .requirements
        .iter()
        .take(REQUIREMENT_SAMPLE)
        .filter(|req| {
            let lower = req.to_lowercase();
            !lower
                .split_whitespace()
                .take(KEYWORDS_PER_REQUIREMENT)
                .any(|word| roadmap_text.contains(word))
        })
        .map(|req| format!("{}...", req.chars().take(50).collect::<String>()))
        .collect();

    if !untraced.is_empty() {
        warnings.push(format!(
            "Some requirements may not be in roadmap: {}",
            untraced.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        ));
    }
}

/// Every roadmap phase has a plan
pub(super) fn phases_have_plans(
    roadmap: &RoadmapFacts,
    plans: &[PhasePlan],
    warnings: &mut Vec<String>,
) {
    for phase in &roadmap.phases {
        if plans.iter().any(|p| p.is_phase(phase.number)) {
            tracing::debug!(phase = phase.number, "phase plan found");
        } else {
            warnings.push(format!("{} in roadmap but no phase plan found", phase.key()));
        }
    }
}

/// Plans reuse at least one spec technology per layer
pub(super) fn tech_stack_consistent(
    spec: &SpecFacts,
    plans: &[PhasePlan],
    warnings: &mut Vec<String>,
) {
    for plan in plans {
        let layers = [
            ("frontend", &spec.tech_stack.frontend, &plan.frontend),
            ("backend", &spec.tech_stack.backend, &plan.backend),
        ];
        for (layer, spec_lines, plan_items) in layers {
            let Some(plan_items) = plan_items else {
                continue;
            };
            if spec_lines.is_empty() || plan_items.is_empty() {
                continue;
            }
            let plan_text = plan_items.join(" ").to_lowercase();
            let shared = spec_lines
                .iter()
                .flat_map(|line| tech_names(line))
                .any(|name| plan_text.contains(&name.to_lowercase()));
            if !shared {
                warnings.push(format!("{} uses different {layer} tech than SPEC", plan.key()));
            }
        }
    }
}

/// Phase durations add up to the spec timeline
pub(super) fn timeline_consistent(spec: &SpecFacts, plans: &[PhasePlan], warnings: &mut Vec<String>) {
    let Some(timeline) = &spec.timeline else {
        return;
    };
    if plans.is_empty() {
        return;
    }
    let total: u32 = plans.iter().map(|p| p.duration_weeks).sum();
    let expected = timeline.weeks();

    if total.abs_diff(expected) > TIMELINE_TOLERANCE_WEEKS {
        warnings.push(format!(
            "Timeline mismatch: SPEC says {timeline}, phases total {total} weeks"
        ));
    } else {
        tracing::debug!(weeks = expected, "timeline aligned");
    }
}

/// No plan needs more people than the spec mentions
pub(super) fn resources_consistent(spec: &SpecFacts, plans: &[PhasePlan], warnings: &mut Vec<String>) {
    let Some(team) = spec.team_size else {
        return;
    };
    for plan in plans.iter().filter(|p| p.team_size > team) {
        warnings.push(format!(
            "{} requires {} people but SPEC only mentions {team}",
            plan.key(),
            plan.team_size
        ));
    }
}
