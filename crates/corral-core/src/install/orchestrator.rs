//! The install orchestration state machine.
//!
//! Drives `Purging -> Spawning -> Evaluating` for up to the configured
//! number of attempts. A non-zero package-manager exit is an ordinary
//! failure eligible for retry; a spawn error or a missing exit code is fatal
//! immediately. Retries are strictly sequential: the purge scope of a failed
//! attempt is released before the next attempt begins.

use tracing::{info, warn};

use crate::config::WorkspaceConfig;
use crate::error::InstallError;
use crate::workspace::manifest::{self, WorkspaceManifest};
use crate::workspace::{WorkspaceGraph, WorkspaceLayout};

use super::environment::{build_environment, process_environment};
use super::flag::LastInstallFlag;
use super::options::InstallOptions;
use super::process::{ProcessRunner, SpawnRequest};
use super::purge::PurgeManager;

/// Environment variable naming the active installation variant.
pub const INSTALL_VARIANT_VARIABLE: &str = "CORRAL_INSTALL_VARIANT";

/// States of one install orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    Purging,
    Spawning,
    Evaluating,
    Reconciling,
    Succeeded,
    Failed,
}

pub struct InstallOrchestrator<'a> {
    layout: &'a WorkspaceLayout,
    config: &'a WorkspaceConfig,
    graph: &'a WorkspaceGraph,
    runner: &'a dyn ProcessRunner,
    options: InstallOptions,
    purge_manager: PurgeManager,
    state: InstallState,
}

impl<'a> InstallOrchestrator<'a> {
    pub fn new(
        layout: &'a WorkspaceLayout,
        config: &'a WorkspaceConfig,
        graph: &'a WorkspaceGraph,
        runner: &'a dyn ProcessRunner,
        options: InstallOptions,
    ) -> anyhow::Result<Self> {
        options.validate()?;
        let mut purge_manager = PurgeManager::for_layout(layout);
        if options.full_upgrade {
            // A full upgrade regenerates the lockfile from scratch.
            purge_manager.register(layout.temp_lockfile_path());
        }
        Ok(Self {
            layout,
            config,
            graph,
            runner,
            options,
            purge_manager,
            state: InstallState::Idle,
        })
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Run the install to a terminal state.
    pub fn run(&mut self) -> anyhow::Result<()> {
        manifest::write_manifest(
            self.layout,
            &WorkspaceManifest::from_workspace(self.config, self.graph),
        )?;

        if self.options.check_only {
            self.state = InstallState::Evaluating;
            manifest::read_manifest(self.layout)?;
            match LastInstallFlag::read(self.layout) {
                Some(flag) => info!(installed_at = %flag.installed_at, "a completed install is recorded"),
                None => info!("no completed install is recorded"),
            }
            info!("check-only: workspace manifest is valid, skipping install");
            self.state = InstallState::Succeeded;
            return Ok(());
        }

        // A frozen install needs a lockfile to freeze against.
        if !self.options.allow_lockfile_updates
            && !self.options.bypass_policy
            && !self.layout.temp_lockfile_path().exists()
        {
            self.state = InstallState::Failed;
            anyhow::bail!(
                "no lockfile is present at {}; run \"corral update\" to create one, or pass --bypass-policy",
                self.layout.temp_lockfile_path().display()
            );
        }

        let arguments = self.build_arguments();
        let environment = {
            let mut environment =
                build_environment(process_environment(), &self.config.package_manager, self.layout);
            if let Some(variant) = &self.options.variant {
                environment.insert(INSTALL_VARIANT_VARIABLE.to_string(), variant.clone());
            }
            environment
        };

        let max_attempts = self.options.max_install_attempts;
        let mut last_exit_code = 1;

        for attempt in 1..=max_attempts {
            self.state = InstallState::Purging;
            let mut scope = self.purge_manager.scope();
            scope.purge_stale()?;

            self.state = InstallState::Spawning;
            info!(
                attempt,
                max_attempts,
                package_manager = %self.config.workspace.package_manager.display(),
                "invoking package manager"
            );
            let request = SpawnRequest {
                executable: &self.config.workspace.package_manager,
                arguments: &arguments,
                working_dir: self.layout.temp_folder(),
                environment: &environment,
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
            match outcome.exit_code {
                None => {
                    self.state = InstallState::Failed;
                    return Err(InstallError::MissingExitCode.into());
                }
                Some(0) => {
                    LastInstallFlag::for_install(self.config, &self.options).write(self.layout)?;
                    scope.release();
                    self.state = InstallState::Succeeded;
                    return Ok(());
                }
                Some(exit_code) => {
                    warn!(attempt, exit_code, "package manager install failed");
                    last_exit_code = exit_code;
                    scope.release();
                }
            }
        }

        self.state = InstallState::Failed;
        Err(InstallError::InstallFailed {
            exit_code: last_exit_code,
            attempts: max_attempts,
        }
        .into())
    }

    /// Arguments for the package manager's install subcommand.
    fn build_arguments(&self) -> Vec<String> {
        let mut arguments: Vec<String> = vec!["install".to_string()];
        if !self.options.allow_lockfile_updates {
            arguments.push("--frozen-lockfile".to_string());
        }
        if self.options.recheck_lockfile {
            arguments.push("--prefer-frozen-lockfile=false".to_string());
        }
        if self.options.no_link {
            arguments.push("--link-workspace-packages=false".to_string());
        }
        if let Some(concurrency) = self.options.network_concurrency {
            arguments.push("--network-concurrency".to_string());
            arguments.push(concurrency.to_string());
        }
        if self.options.collect_log_file {
            arguments.push("--reporter=append-only".to_string());
        }
        if self.options.debug {
            arguments.push("--loglevel=debug".to_string());
        }
        arguments.extend(self.options.filter_arguments.iter().cloned());
        arguments.extend(self.options.split_workspace_filter_arguments.iter().cloned());
        arguments
    }
}
