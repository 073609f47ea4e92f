//! Project layout discovery

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory holding phase plan records
pub const PHASE_PLANS_DIR: &str = "phase-plans";

const SKIPPED_DIRS: [&str; 2] = ["target", "node_modules"];

/// Documents found under a project root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// `spec/SPEC.md`, falling back to `SPEC.md`
    pub spec: Option<PathBuf>,
    /// Every `*roadmap*.md`, sorted
    pub roadmaps: Vec<PathBuf>,
    /// `phase-plans/`, when it exists
    pub phase_plans_dir: Option<PathBuf>,
    /// `*.yml` and `*.yaml` directly under `phase-plans/`, sorted
    pub phase_plans: Vec<PathBuf>,
}

impl Layout {
    /// Scan a project root
    #[must_use]
    pub fn discover(root: &Path) -> Self {
        let spec = [root.join("spec").join("SPEC.md"), root.join("SPEC.md")]
            .into_iter()
            .find(|p| p.is_file());

        let roadmaps: Vec<PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped(e))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable path during discovery");
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_roadmap(e.path()))
            .map(DirEntry::into_path)
            .collect();

        let dir = root.join(PHASE_PLANS_DIR);
        let (phase_plans_dir, phase_plans) = if dir.is_dir() {
            let plans: Vec<PathBuf> = WalkDir::new(&dir)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
                .map(DirEntry::into_path)
                .collect();
            (Some(dir), plans)
        } else {
            (None, Vec::new())
        };

        tracing::debug!(
            root = %root.display(),
            spec = spec.is_some(),
            roadmaps = roadmaps.len(),
            phase_plans = phase_plans.len(),
            "project layout discovered"
        );

        Self {
            spec,
            roadmaps,
            phase_plans_dir,
            phase_plans,
        }
    }

    /// Whether both a spec and a roadmap were found
    #[must_use]
    pub fn is_project(&self) -> bool {
        self.spec.is_some() && !self.roadmaps.is_empty()
    }
}

/// Project root owning a specification file
///
/// `root/spec/SPEC.md` belongs to `root`; any other document belongs to its
/// own directory.
#[must_use]
pub fn project_root_for(spec: &Path) -> Option<PathBuf> {
    let dir = spec.parent()?;
    if dir.file_name().is_some_and(|name| name == "spec") {
        dir.parent().map(Path::to_path_buf)
    } else {
        Some(dir.to_path_buf())
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()))
}

fn is_roadmap(path: &Path) -> bool {
    let is_markdown = path.extension().is_some_and(|ext| ext == "md");
    let named = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().to_lowercase().contains("roadmap"));
    is_markdown && named
}

fn is_yaml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "yml" || ext == "yaml")
}
