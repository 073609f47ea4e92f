//! Link validator
//!
//! External links are counted as valid without a network round trip.
//! Anchors are resolved against heading slugs, relative files against the
//! document directory, and reference-style links against their
//! `[label]: target` definitions.

use crate::issue::{category, Findings, Issue};
use serde::{Deserialize, Serialize};
use specgate_document::{extract, Document, FeatureSet, LinkTarget};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Link counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    /// Inline and reference links seen
    pub total: usize,
    /// Links that resolved
    pub valid: usize,
    pub external: usize,
    pub anchor: usize,
    pub file: usize,
    pub reference: usize,
}

/// Link validation result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    pub issues: Findings,
    pub stats: LinkStats,
}

impl LinkReport {
    /// ERRORs fail; WARNINGs fail only when `strict`
    #[inline]
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.issues.passes(strict)
    }

    /// One-line statistics
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} links checked, {} valid ({} external, {} anchor, {} file, {} reference)",
            self.stats.total,
            self.stats.valid,
            self.stats.external,
            self.stats.anchor,
            self.stats.file,
            self.stats.reference
        )
    }
}

/// Link validator
#[derive(Debug, Default)]
pub struct LinkValidator {
    /// Features of linked markdown files, loaded on first use
    targets: HashMap<PathBuf, Option<FeatureSet>>,
}

impl LinkValidator {
    /// Create validator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every link in a document
    pub fn validate(&mut self, doc: &Document) -> LinkReport {
        let mut report = LinkReport::default();
        let features = doc.features();

        for link in &features.links {
            report.stats.total += 1;
            let resolved = match &link.target {
                LinkTarget::External { .. } => {
                    report.stats.external += 1;
                    true
                }
                LinkTarget::Anchor { anchor } => {
                    report.stats.anchor += 1;
                    let found = features.has_anchor(anchor);
                    if !found {
                        report.issues.push(
                            Issue::error(category::LINK, format!("Broken anchor link: #{anchor}"))
                                .at_line(link.line),
                        );
                    }
                    found
                }
                LinkTarget::File { path, anchor } => {
                    report.stats.file += 1;
                    self.check_file(doc, path, anchor.as_deref(), link.line, &mut report.issues)
                }
            };
            if resolved {
                report.stats.valid += 1;
            }
        }

        for reference in &features.reference_links {
            report.stats.total += 1;
            report.stats.reference += 1;
            if features
                .reference_definitions
                .contains_key(&reference.label.to_lowercase())
            {
                report.stats.valid += 1;
            } else {
                report.issues.push(
                    Issue::error(
                        category::LINK,
                        format!("Undefined link reference: [{}]", reference.label),
                    )
                    .at_line(reference.line),
                );
            }
        }

        tracing::debug!(
            document = %doc.identifier(),
            total = report.stats.total,
            valid = report.stats.valid,
            "link validation finished"
        );
        report
    }

    fn check_file(
        &mut self,
        doc: &Document,
        path: &str,
        anchor: Option<&str>,
        line: usize,
        issues: &mut Findings,
    ) -> bool {
        let Some(base) = doc.directory() else {
            issues.push(
                Issue::info(
                    category::LINK,
                    format!("Skipped relative link {path}: document has no location"),
                )
                .at_line(line),
            );
            return false;
        };

        let resolved = base.join(path);
        if !resolved.exists() {
            issues.push(
                Issue::error(category::LINK, format!("Broken link: {path} (file not found)"))
                    .at_line(line),
            );
            return false;
        }

        let Some(anchor) = anchor.filter(|a| !a.is_empty()) else {
            return true;
        };
        if !is_markdown(&resolved) {
            return true;
        }

        match self.target_features(&resolved) {
            Some(target) if target.has_anchor(anchor) => true,
            Some(_) => {
                issues.push(
                    Issue::warning(
                        category::LINK,
                        format!("Anchor #{anchor} not found in {path}"),
                    )
                    .at_line(line),
                );
                false
            }
            None => {
                issues.push(
                    Issue::warning(category::LINK, format!("Could not read {path}")).at_line(line),
                );
                false
            }
        }
    }

    fn target_features(&mut self, path: &Path) -> Option<&FeatureSet> {
        self.targets
            .entry(path.to_path_buf())
            .or_insert_with(|| match std::fs::read_to_string(path) {
                Ok(text) => Some(extract(&text)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable link target");
                    None
                }
            })
            .as_ref()
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}
