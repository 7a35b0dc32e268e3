//! Validated pass-through execution of package-manager subcommands.

use tracing::warn;

use crate::config::WorkspaceConfig;
use crate::error::InstallError;
use crate::install::environment::{build_environment, process_environment};
use crate::install::orchestrator::InstallState;
use crate::install::{ProcessRunner, SpawnRequest};
use crate::workspace::{WorkspaceGraph, WorkspaceLayout};

use super::reconcile::PatchReconciler;
use super::validator::{ValidatedCommand, ValidatorEnvironment, validate_pass_through};

pub struct PassThroughRunner<'a> {
    layout: &'a WorkspaceLayout,
    config: &'a WorkspaceConfig,
    graph: &'a WorkspaceGraph,
    runner: &'a dyn ProcessRunner,
    state: InstallState,
}

impl<'a> PassThroughRunner<'a> {
    pub fn new(
        layout: &'a WorkspaceLayout,
        config: &'a WorkspaceConfig,
        graph: &'a WorkspaceGraph,
        runner: &'a dyn ProcessRunner,
    ) -> Self {
        Self {
            layout,
            config,
            graph,
            runner,
            state: InstallState::Idle,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Validate and forward a raw subcommand line, returning the child's
    /// exit code. `patch-commit` triggers patch reconciliation on success.
    pub fn run(&mut self, mut arguments: Vec<String>) -> anyhow::Result<i32> {
        let environment = ValidatorEnvironment {
            package_manager_version: self
                .config
                .workspace
                .package_manager_version
                .as_deref()
                .and_then(|raw| semver::Version::parse(raw).ok()),
            manifest_exists: self.layout.manifest_path().is_file(),
        };
        let validated: ValidatedCommand = validate_pass_through(&mut arguments, &environment)?;
        for warning in &validated.warnings {
            warn!("{warning}");
        }

        self.state = InstallState::Spawning;
        let child_environment =
            build_environment(process_environment(), &self.config.package_manager, self.layout);
        let request = SpawnRequest {
            executable: &self.config.workspace.package_manager,
            arguments: &arguments,
            working_dir: self.layout.workspace_root(),
            environment: &child_environment,
        };
        let outcome = match self.runner.spawn(&request) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.state = InstallState::Failed;
                return Err(InstallError::SpawnFailed {
                    details: error.to_string(),
                }
                .into());
            }
        };

        self.state = InstallState::Evaluating;
        let exit_code = match outcome.exit_code {
            Some(exit_code) => exit_code,
            None => {
                self.state = InstallState::Failed;
                return Err(InstallError::MissingExitCode.into());
            }
        };

        if exit_code == 0 && validated.verb.as_deref() == Some("patch-commit") {
            self.state = InstallState::Reconciling;
            PatchReconciler::new(self.layout)
                .reconcile_after_patch_commit(self.config, self.graph, self.runner)
                .map_err(|error| InstallError::ReconciliationFailed {
                    details: format!("{error:#}"),
                })?;
        }

        self.state = if exit_code == 0 {
            InstallState::Succeeded
        } else {
            InstallState::Failed
        };
        Ok(exit_code)
    }
}
