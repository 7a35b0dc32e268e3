//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use corral_core::install::{ProcessRunner, SpawnOutcome, SpawnRequest};
use corral_core::selection::Selection;
use corral_core::workspace::{ProjectSeed, WorkspaceGraph, WorkspaceLayout};

/// Seed for a project rooted at `/ws/<name>` with the given dependencies.
pub fn seed(name: &str, dependencies: &[&str]) -> ProjectSeed {
    ProjectSeed {
        package_name: name.to_string(),
        project_folder: PathBuf::from("/ws").join(name),
        dependency_names: dependencies.iter().map(|d| d.to_string()).collect(),
        tags: BTreeSet::new(),
        version_policy_name: None,
        split_workspace: false,
    }
}

pub fn graph(seeds: Vec<ProjectSeed>) -> WorkspaceGraph {
    WorkspaceGraph::build(seeds).expect("valid test graph")
}

/// A graph where each entry is `(name, dependencies)`.
pub fn graph_of(entries: &[(&str, &[&str])]) -> WorkspaceGraph {
    graph(entries.iter().map(|(name, deps)| seed(name, deps)).collect())
}

pub fn select(graph: &WorkspaceGraph, names: &[&str]) -> Selection {
    names
        .iter()
        .map(|name| {
            graph
                .get_project_by_name(name)
                .unwrap_or_else(|| panic!("unknown test project {name}"))
        })
        .collect()
}

pub fn names_of(graph: &WorkspaceGraph, selection: &Selection) -> Vec<String> {
    selection
        .names(graph)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Layout rooted in a temp directory, with no environment overrides.
pub fn layout_in(root: &Path) -> WorkspaceLayout {
    WorkspaceLayout::from_parts(
        root.to_path_buf(),
        root.join(".corral").join("temp"),
        root.join("global"),
    )
}

/// One scripted response of the mock process runner.
#[derive(Debug, Clone, Copy)]
pub enum ScriptedOutcome {
    Exit(i32),
    /// Terminated without an exit status.
    NoStatus,
    /// The process could not be started at all.
    SpawnError,
}

/// Everything the runner was asked to do, for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub executable: PathBuf,
    pub arguments: Vec<String>,
    pub working_dir: PathBuf,
    pub environment: BTreeMap<String, String>,
}

/// Process runner that replays a script instead of spawning anything.
/// Once the script is exhausted every further spawn reports success.
pub struct MockProcessRunner {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProcessRunner {
    pub fn succeeding() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn spawn(&self, request: &SpawnRequest<'_>) -> std::io::Result<SpawnOutcome> {
        self.requests.lock().unwrap().push(RecordedRequest {
            executable: request.executable.to_path_buf(),
            arguments: request.arguments.to_vec(),
            working_dir: request.working_dir.to_path_buf(),
            environment: request.environment.clone(),
        });
        match self.script.lock().unwrap().pop_front() {
            None | Some(ScriptedOutcome::Exit(0)) => Ok(SpawnOutcome { exit_code: Some(0) }),
            Some(ScriptedOutcome::Exit(code)) => Ok(SpawnOutcome {
                exit_code: Some(code),
            }),
            Some(ScriptedOutcome::NoStatus) => Ok(SpawnOutcome { exit_code: None }),
            Some(ScriptedOutcome::SpawnError) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock spawn failure",
            )),
        }
    }
}
