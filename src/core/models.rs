//! Core data structures for atse
//!
//! `Config` is what the user can tune; `ProjectEnvironment` is what a scan
//! of the project produces.

use crate::core::error::{AtseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = ".atse.json";

/// What to do when a candidate file cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadFailurePolicy {
    /// Record the failure, keep earlier matches, continue with the next file
    #[default]
    KeepPartial,
    /// Stop the scan and return the error
    Abort,
}

/// Which recognizer extracts descriptors from candidate files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStrategy {
    /// Structural recognizer, textual pattern when it finds nothing
    #[default]
    Auto,
    /// Tree-sitter only
    Syntax,
    /// Regular expressions only
    Pattern,
}

impl ScanStrategy {
    /// Parse strategy from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ScanStrategy::Auto),
            "syntax" | "ast" => Some(ScanStrategy::Syntax),
            "pattern" | "regex" => Some(ScanStrategy::Pattern),
            _ => None,
        }
    }
}

/// Configuration loaded from .atse.json
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Glob (relative to the project root) selecting descriptor candidates
    #[serde(default = "default_candidate_glob")]
    pub candidate_glob: String,
    /// File suffix of controller sources
    #[serde(default = "default_controller_suffix")]
    pub controller_suffix: String,
    /// File suffix of view templates
    #[serde(default = "default_view_suffix")]
    pub view_suffix: String,
    /// Alias used in templates when no route declares one
    #[serde(default = "default_fallback_alias")]
    pub fallback_alias: String,
    #[serde(default)]
    pub read_failure_policy: ReadFailurePolicy,
    #[serde(default)]
    pub scan_strategy: ScanStrategy,
    /// Candidates larger than this are not scanned
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_candidate_glob() -> String {
    "src/app/*.ts".to_string()
}

fn default_controller_suffix() -> String {
    ".controller.ts".to_string()
}

fn default_view_suffix() -> String {
    ".html".to_string()
}

fn default_fallback_alias() -> String {
    "vm".to_string()
}

fn default_max_file_size() -> u64 {
    1_048_576 // 1MB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidate_glob: default_candidate_glob(),
            controller_suffix: default_controller_suffix(),
            view_suffix: default_view_suffix(),
            fallback_alias: default_fallback_alias(),
            read_failure_policy: ReadFailurePolicy::default(),
            scan_strategy: ScanStrategy::default(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.atse.json` from the project root, or defaults when absent
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!("loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings the mapper and resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.controller_suffix.is_empty() || self.view_suffix.is_empty() {
            return Err(AtseError::invalid_config("suffixes must not be empty"));
        }
        if self.controller_suffix == self.view_suffix {
            return Err(AtseError::invalid_config(
                "controller and view suffixes must differ",
            ));
        }
        if self.fallback_alias.trim().is_empty() {
            return Err(AtseError::invalid_config("fallback_alias must not be empty"));
        }
        globset::Glob::new(&self.candidate_glob)?;
        Ok(())
    }
}

/// The two directories relating controllers to views, normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePaths {
    pub controllers: String,
    pub views: String,
}

/// What a single candidate file contributed to the environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceOutcome {
    /// Matched the AngularApp descriptor
    MainDescriptor,
    /// Matched the routes descriptor with this many route entries
    Routes { count: usize },
    /// Read fine, matched nothing
    NoMatch,
    /// Could not be read
    Unreadable { message: String },
}

impl SourceOutcome {
    /// Whether this file counts towards recognizing the project
    pub fn is_match(&self) -> bool {
        matches!(self, SourceOutcome::MainDescriptor | SourceOutcome::Routes { .. })
    }
}

/// A scanned candidate and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedSource {
    pub path: String,
    pub outcome: SourceOutcome,
}

/// Environment of an angular-typescript-seed project, produced by
/// [`EnvironmentResolver::resolve`](crate::core::resolver::EnvironmentResolver::resolve)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEnvironment {
    /// Root that was scanned
    pub root: PathBuf,
    /// Set together from exactly one main descriptor, or not at all
    pub base_paths: Option<BasePaths>,
    /// Normalized route path -> alias used in the template
    pub route_aliases: BTreeMap<String, String>,
    /// Per-candidate results in scan order
    pub sources: Vec<ScannedSource>,
}

impl ProjectEnvironment {
    /// Environment of a project nothing was recognized in
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_paths: None,
            route_aliases: BTreeMap::new(),
            sources: Vec::new(),
        }
    }

    /// True iff at least one scanned file matched a descriptor
    pub fn is_valid_project(&self) -> bool {
        self.sources.iter().any(|s| s.outcome.is_match())
    }

    pub fn views_base_path(&self) -> Option<&str> {
        self.base_paths.as_ref().map(|b| b.views.as_str())
    }

    pub fn controllers_base_path(&self) -> Option<&str> {
        self.base_paths.as_ref().map(|b| b.controllers.as_str())
    }

    pub fn route_aliases(&self) -> &BTreeMap<String, String> {
        &self.route_aliases
    }

    /// Alias declared for a normalized route path
    pub fn route_alias(&self, route: &str) -> Option<&str> {
        self.route_aliases.get(route).map(String::as_str)
    }
}
