//! Loads the workspace graph from `corral.toml` and project manifests.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::graph::WorkspaceGraph;
use super::project::ProjectSeed;
use crate::config::{ConfigStore, WorkspaceConfig};

/// The subset of a project's `package.json` the loader cares about.
#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: String,
    #[serde(default)]
    dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: serde_json::Map<String, serde_json::Value>,
}

/// A fully loaded workspace: configuration plus resolved graph.
#[derive(Debug)]
pub struct LoadedWorkspace {
    pub config: WorkspaceConfig,
    pub graph: WorkspaceGraph,
}

/// Load `corral.toml` from `workspace_root` and build the dependency graph
/// by reading each member's `package.json`.
pub fn load_workspace(workspace_root: &Path) -> anyhow::Result<LoadedWorkspace> {
    let config = ConfigStore::new(workspace_root).load()?;
    let graph = build_graph(&config, workspace_root)?;
    Ok(LoadedWorkspace { config, graph })
}

/// Build the graph for an already-parsed configuration.
pub fn build_graph(config: &WorkspaceConfig, workspace_root: &Path) -> anyhow::Result<WorkspaceGraph> {
    let mut seeds: Vec<ProjectSeed> = Vec::with_capacity(config.projects.len());

    for project in &config.projects {
        let folder = workspace_root.join(&project.folder);
        let manifest_path = folder.join("package.json");
        let raw = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: PackageManifest = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

        if manifest.name != project.name {
            anyhow::bail!(
                "The manifest {} declares the name \"{}\" but corral.toml expects \"{}\"",
                manifest_path.display(),
                manifest.name,
                project.name
            );
        }

        let mut dependency_names: Vec<String> = Vec::new();
        for key in manifest
            .dependencies
            .keys()
            .chain(manifest.dev_dependencies.keys())
            .chain(manifest.optional_dependencies.keys())
        {
            if !dependency_names.iter().any(|existing| existing == key) {
                dependency_names.push(key.clone());
            }
        }

        seeds.push(ProjectSeed {
            package_name: project.name.clone(),
            project_folder: folder,
            dependency_names,
            tags: project.tags.iter().cloned().collect::<BTreeSet<_>>(),
            version_policy_name: project.version_policy.clone(),
            split_workspace: project.split_workspace,
        });
    }

    WorkspaceGraph::build(seeds)
}
