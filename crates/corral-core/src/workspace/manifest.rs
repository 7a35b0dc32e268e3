//! The generated workspace manifest handed to the package manager.
//!
//! Written into the temp folder before each install. The package manager may
//! mutate the `patched-dependencies` field (during `patch-commit`); the
//! reconciliation step reads it back to detect that change.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::graph::WorkspaceGraph;
use super::layout::WorkspaceLayout;
use crate::config::WorkspaceConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceManifest {
    /// Workspace member package names, in declaration order.
    pub projects: Vec<String>,

    #[serde(default)]
    pub patched_dependencies: BTreeMap<String, String>,
}

impl WorkspaceManifest {
    pub fn from_workspace(config: &WorkspaceConfig, graph: &WorkspaceGraph) -> Self {
        Self {
            projects: graph.projects().map(|p| p.package_name.clone()).collect(),
            patched_dependencies: config.package_manager.patched_dependencies.clone(),
        }
    }
}

/// Write the manifest into the layout's temp folder, creating it as needed.
pub fn write_manifest(layout: &WorkspaceLayout, manifest: &WorkspaceManifest) -> anyhow::Result<()> {
    std::fs::create_dir_all(layout.temp_folder()).with_context(|| {
        format!("Failed to create temp folder {}", layout.temp_folder().display())
    })?;
    let path = layout.manifest_path();
    let raw = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    std::fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read the manifest back from the temp folder.
pub fn read_manifest(layout: &WorkspaceLayout) -> anyhow::Result<WorkspaceManifest> {
    let path = layout.manifest_path();
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest: WorkspaceManifest =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(manifest)
}
