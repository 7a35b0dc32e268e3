//! The workspace dependency graph.

use std::collections::HashMap;
use std::path::Path;

use super::project::{Project, ProjectId, ProjectSeed};
use crate::selection::Selection;

/// All workspace projects with resolved dependency and consumer edges.
///
/// Constructed once per command invocation and treated as immutable,
/// shareable-read-only afterwards.
#[derive(Debug)]
pub struct WorkspaceGraph {
    projects: Vec<Project>,
    by_name: HashMap<String, ProjectId>,
}

impl WorkspaceGraph {
    /// Build the graph from seeds, resolving name-based dependency edges.
    ///
    /// Duplicate package names are rejected. Dependency names that do not
    /// refer to a workspace member are skipped. Cycles are permitted; the
    /// closure operations in the selection engine dedup via visited sets.
    pub fn build(seeds: Vec<ProjectSeed>) -> anyhow::Result<Self> {
        let mut by_name: HashMap<String, ProjectId> = HashMap::with_capacity(seeds.len());
        for (index, seed) in seeds.iter().enumerate() {
            if by_name.insert(seed.package_name.clone(), ProjectId(index)).is_some() {
                anyhow::bail!(
                    "The workspace declares the project name \"{}\" more than once",
                    seed.package_name
                );
            }
        }

        let mut projects: Vec<Project> = Vec::with_capacity(seeds.len());
        for seed in &seeds {
            let mut dependencies: Vec<ProjectId> = Vec::new();
            for name in &seed.dependency_names {
                if let Some(&id) = by_name.get(name) {
                    if !dependencies.contains(&id) {
                        dependencies.push(id);
                    }
                }
            }
            projects.push(Project {
                package_name: seed.package_name.clone(),
                project_folder: seed.project_folder.clone(),
                dependencies,
                consumers: Vec::new(),
                tags: seed.tags.clone(),
                version_policy_name: seed.version_policy_name.clone(),
                split_workspace: seed.split_workspace,
            });
        }

        // Reverse edges, in declaration order of the consuming project.
        for index in 0..projects.len() {
            let dependencies = projects[index].dependencies.clone();
            for dependency in dependencies {
                projects[dependency.index()].consumers.push(ProjectId(index));
            }
        }

        Ok(Self { projects, by_name })
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = ProjectId> + '_ {
        (0..self.projects.len()).map(ProjectId)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn get_project_by_name(&self, name: &str) -> Option<ProjectId> {
        self.by_name.get(name).copied()
    }

    /// The project whose folder contains `path`, chosen by longest matching
    /// folder prefix so nested project folders resolve to the innermost one.
    pub fn project_owning(&self, path: &Path) -> Option<ProjectId> {
        let mut best: Option<(usize, ProjectId)> = None;
        for id in self.ids() {
            let folder = &self.project(id).project_folder;
            if path.starts_with(folder) {
                let depth = folder.components().count();
                if best.map_or(true, |(best_depth, _)| depth > best_depth) {
                    best = Some((depth, id));
                }
            }
        }
        best.map(|(_, id)| id)
    }

    /// Selection containing every project in the workspace.
    pub fn full_selection(&self) -> Selection {
        self.ids().collect()
    }

    pub fn has_split_workspace_projects(&self) -> bool {
        self.projects.iter().any(|p| p.split_workspace)
    }

    /// Number of projects in the given partition (split or ordinary).
    pub fn partition_len(&self, split_workspace: bool) -> usize {
        self.projects
            .iter()
            .filter(|p| p.split_workspace == split_workspace)
            .count()
    }
}
