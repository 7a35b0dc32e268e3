//! Post-`patch-commit` reconciliation of the dependency-patch state.
//!
//! The package manager records accepted patches in the generated workspace
//! manifest. When that mapping drifts from the one recorded in
//! `corral.toml`, the patch files are synchronized into the committed
//! folder, the configuration is updated, and one extra install stabilizes
//! the lockfile.

use tracing::{info, warn};

use crate::config::{ConfigStore, WorkspaceConfig};
use crate::fs;
use crate::install::{InstallOptions, InstallOrchestrator, ProcessRunner};
use crate::workspace::manifest;
use crate::workspace::{WorkspaceGraph, WorkspaceLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The recorded and observed patch mappings already agree.
    Unchanged,
    /// Patch files and configuration were synchronized; the change still
    /// needs to be committed.
    Synchronized,
}

pub struct PatchReconciler<'a> {
    layout: &'a WorkspaceLayout,
    store: ConfigStore,
}

impl<'a> PatchReconciler<'a> {
    pub fn new(layout: &'a WorkspaceLayout) -> Self {
        Self {
            layout,
            store: ConfigStore::new(layout.workspace_root()),
        }
    }

    /// Compare the before/after patch mappings and synchronize on drift.
    ///
    /// Does not roll back the completed package-manager invocation on
    /// failure; the caller reports the error and keeps the install.
    pub fn reconcile_after_patch_commit(
        &self,
        config: &WorkspaceConfig,
        graph: &WorkspaceGraph,
        runner: &dyn ProcessRunner,
    ) -> anyhow::Result<ReconcileOutcome> {
        let before = &config.package_manager.patched_dependencies;
        let observed = manifest::read_manifest(self.layout)?;
        let after = &observed.patched_dependencies;

        if before == after {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let temp_patches = self.layout.temp_patches_folder();
        let committed_patches = self.layout.committed_patches_folder();
        if temp_patches.is_dir() {
            info!(
                from = %temp_patches.display(),
                to = %committed_patches.display(),
                "copying patch files"
            );
            fs::ensure_empty_dir(&committed_patches)?;
            fs::copy_dir_recursive(&temp_patches, &committed_patches)?;
        } else if committed_patches.exists() {
            info!(path = %committed_patches.display(), "deleting stale patch files");
            fs::remove_dir_if_exists(&committed_patches)?;
        }

        let mut updated = config.clone();
        updated.package_manager.patched_dependencies = after.clone();
        self.store.save(&updated)?;

        // One nested install so the lockfile reflects the new patch set.
        let options = InstallOptions {
            allow_lockfile_updates: true,
            recheck_lockfile: true,
            max_install_attempts: 1,
            ..InstallOptions::default()
        };
        InstallOrchestrator::new(self.layout, &updated, graph, runner, options)?.run()?;

        warn!(
            "patch state changed; commit the updated corral.toml, lockfile, and common/patches folder"
        );
        Ok(ReconcileOutcome::Synchronized)
    }
}
