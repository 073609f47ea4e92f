//! Run configuration
//!
//! Loaded from TOML (`--config`, or `specgate.toml` beside the document) and
//! adjusted with the `with_*` builders.

use crate::error::OrchestratorError;
use crate::task::{CommandSpec, Criticality, ValidatorKind};
use serde::{Deserialize, Serialize};
use specgate_checks::quality::{Dimension, QualityScorer};
use specgate_checks::traceability::ACCEPTANCE_PATHS;
use specgate_checks::{ScoreError, StructureOptions, TraceOptions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file probed beside the document
pub const CONFIG_FILE_NAME: &str = "specgate.toml";

/// Default per-command timeout
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Warnings fail validators
    pub strict: bool,
    /// Stop after the first failing critical task
    pub stop_on_first_critical: bool,
    /// Validators left out of the run
    pub skip: Vec<ValidatorKind>,
    /// Run the improvement analyzer when the run fails
    pub suggest_improvements: bool,
    /// Write the improvement suggestions here as markdown
    pub suggestions_file: Option<PathBuf>,
    /// Timeout for each external command
    pub command_timeout_secs: u64,
    /// Resolve internal anchors as part of the structure check
    pub check_links_in_structure: bool,
    /// Modular companion directory, relative to the document
    pub modular_dir: PathBuf,
    /// Acceptance scenario files, relative to the document
    pub acceptance_paths: Vec<PathBuf>,
    /// Quality dimensions to score; empty means all
    pub dimensions: Vec<Dimension>,
    /// Criticality overrides keyed by validator name
    pub criticality: BTreeMap<String, Criticality>,
    /// External validators
    pub commands: Vec<CommandSpec>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            stop_on_first_critical: false,
            skip: Vec::new(),
            suggest_improvements: true,
            suggestions_file: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            check_links_in_structure: false,
            modular_dir: PathBuf::from(".spec"),
            acceptance_paths: ACCEPTANCE_PATHS.iter().map(PathBuf::from).collect(),
            dimensions: Vec::new(),
            criticality: BTreeMap::new(),
            commands: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Config`] on malformed TOML, unknown keys or
    /// unknown validator names in `[criticality]`.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, OrchestratorError> {
        let config: Self =
            toml::from_str(text).map_err(|e| OrchestratorError::config(origin, e.message()))?;
        config.validate().map_err(|e| OrchestratorError::config(origin, e))?;
        Ok(config)
    }

    /// Load a config file
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Config`] when the file is unreadable or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OrchestratorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| OrchestratorError::config(path, e))?;
        let config = Self::from_toml(&text, path)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Explicit config if given, else `specgate.toml` beside the document,
    /// else defaults
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Config`] when the chosen file is invalid.
    pub fn for_document(document: &Path, explicit: Option<&Path>) -> Result<Self, OrchestratorError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let beside = document
            .parent()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|p| p.is_file());
        match beside {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), String> {
        for name in self.criticality.keys() {
            name.parse::<ValidatorKind>().map_err(|e| e.to_string())?;
        }
        if let Some(cmd) = self.commands.iter().find(|c| c.program.trim().is_empty()) {
            return Err(format!("command '{}' has an empty program", cmd.name));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn with_stop_on_first_critical(mut self, stop: bool) -> Self {
        self.stop_on_first_critical = stop;
        self
    }

    /// Add validators to the skip list
    #[must_use]
    pub fn with_skip(mut self, kinds: impl IntoIterator<Item = ValidatorKind>) -> Self {
        for kind in kinds {
            if !self.skip.contains(&kind) {
                self.skip.push(kind);
            }
        }
        self
    }

    /// Skip every validator not in `kinds`
    #[must_use]
    pub fn with_only(self, kinds: &[ValidatorKind]) -> Self {
        let others: Vec<ValidatorKind> = ValidatorKind::ALL
            .into_iter()
            .filter(|k| !kinds.contains(k))
            .collect();
        self.with_skip(others)
    }

    #[must_use]
    pub fn with_suggestions(mut self, enabled: bool) -> Self {
        self.suggest_improvements = enabled;
        self
    }

    #[must_use]
    pub fn with_suggestions_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.suggestions_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_command_timeout_secs(mut self, secs: u64) -> Self {
        self.command_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_criticality(mut self, kind: ValidatorKind, criticality: Criticality) -> Self {
        self.criticality.insert(kind.name().to_string(), criticality);
        self
    }

    #[must_use]
    pub fn with_command(mut self, command: CommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    /// Whether a validator is skipped
    #[inline]
    #[must_use]
    pub fn is_skipped(&self, kind: ValidatorKind) -> bool {
        self.skip.contains(&kind)
    }

    /// Effective criticality of a validator
    #[must_use]
    pub fn criticality_of(&self, kind: ValidatorKind) -> Criticality {
        self.criticality
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(kind.name()))
            .map_or_else(|| kind.default_criticality(), |(_, c)| *c)
    }

    /// Effective timeout of a command
    #[must_use]
    pub fn timeout_for(&self, command: &CommandSpec) -> std::time::Duration {
        std::time::Duration::from_secs(command.timeout_secs.unwrap_or(self.command_timeout_secs))
    }

    /// Structure validator options
    #[must_use]
    pub fn structure_options(&self) -> StructureOptions {
        StructureOptions::new()
            .with_internal_links(self.check_links_in_structure)
            .with_modular_dir(self.modular_dir.clone())
    }

    /// Traceability options
    #[must_use]
    pub fn trace_options(&self) -> TraceOptions {
        TraceOptions::default().with_acceptance_paths(self.acceptance_paths.iter().cloned())
    }

    /// Quality scorer for the configured dimensions
    ///
    /// # Errors
    ///
    /// Never in practice; an empty selection means all dimensions.
    pub fn quality_scorer(&self) -> Result<QualityScorer, ScoreError> {
        if self.dimensions.is_empty() {
            Ok(QualityScorer::new())
        } else {
            QualityScorer::for_dimensions(&self.dimensions)
        }
    }
}
