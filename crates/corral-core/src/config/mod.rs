//! Workspace configuration loaded from `corral.toml`.
//!
//! The configuration file declares the package manager, its options, and the
//! list of workspace projects. The parsed form is the single source the rest
//! of the crate consumes; nothing else re-reads the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// File name of the workspace configuration.
pub const CONFIG_FILE_NAME: &str = "corral.toml";

/// Top-level `corral.toml` contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub workspace: WorkspaceSettings,

    #[serde(default)]
    pub package_manager: PackageManagerOptions,

    /// Workspace members, in declaration order.
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectConfig>,
}

/// The `[workspace]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceSettings {
    /// Package manager executable (name on PATH or explicit path).
    pub package_manager: PathBuf,

    /// Declared version of the package manager tool, used for verb
    /// compatibility checks. Optional; checks requiring it fail when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager_version: Option<String>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            package_manager: PathBuf::from("pnpm"),
            package_manager_version: None,
        }
    }
}

/// The `[package-manager]` table: options forwarded to the external tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageManagerOptions {
    /// Override for the package store location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Override for the package manager's cache location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// User-declared environment variables for spawned processes.
    #[serde(default)]
    pub environment: BTreeMap<String, EnvironmentValue>,

    /// Recorded dependency-patch mapping (package spec -> patch file),
    /// kept in sync with the generated workspace manifest by the
    /// `patch-commit` reconciliation step.
    #[serde(default)]
    pub patched_dependencies: BTreeMap<String, String>,
}

/// A single user-declared environment variable.
///
/// With `override = false` the value only applies when the variable is not
/// already set in the parent environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironmentValue {
    pub value: String,
    #[serde(default, rename = "override")]
    pub override_existing: bool,
}

/// One `[[project]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Unique package name. Must match the `name` field of the project's manifest.
    pub name: String,

    /// Folder relative to the workspace root.
    pub folder: PathBuf,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_policy: Option<String>,

    /// Whether the project belongs to the isolated split sub-workspace.
    #[serde(default)]
    pub split_workspace: bool,
}

/// Reads and writes `corral.toml` for a given workspace root.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            config_path: workspace_root.join(CONFIG_FILE_NAME),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<WorkspaceConfig> {
        let raw = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;
        let config: WorkspaceConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.config_path.display()))?;
        Ok(config)
    }

    pub fn save(&self, config: &WorkspaceConfig) -> anyhow::Result<()> {
        let raw = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
        std::fs::write(&self.config_path, raw)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
        Ok(())
    }
}

/// Walk upward from `start_dir` looking for a folder containing `corral.toml`.
pub fn find_workspace_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
