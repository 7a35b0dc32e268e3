//! The external-process collaborator boundary.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

/// One spawn request: executable, argv, working directory, environment.
#[derive(Debug)]
pub struct SpawnRequest<'a> {
    pub executable: &'a Path,
    pub arguments: &'a [String],
    pub working_dir: &'a Path,
    pub environment: &'a BTreeMap<String, String>,
}

/// Result of a completed spawn.
///
/// `exit_code` is `None` when the process terminated without reporting a
/// status (e.g. killed by a signal); callers treat that as fatal rather than
/// as an ordinary failure.
#[derive(Debug, Clone, Copy)]
pub struct SpawnOutcome {
    pub exit_code: Option<i32>,
}

/// Spawns the package manager. The orchestrator suspends until the process
/// exits; stdio is inherited from the parent.
pub trait ProcessRunner: Send + Sync {
    fn spawn(&self, request: &SpawnRequest<'_>) -> std::io::Result<SpawnOutcome>;
}

/// Runner backed by `std::process`, used outside of tests.
#[derive(Debug, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn spawn(&self, request: &SpawnRequest<'_>) -> std::io::Result<SpawnOutcome> {
        let status = Command::new(request.executable)
            .args(request.arguments)
            .current_dir(request.working_dir)
            .env_clear()
            .envs(request.environment)
            .status()?;
        Ok(SpawnOutcome {
            exit_code: status.code(),
        })
    }
}
