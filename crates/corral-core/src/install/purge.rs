//! Deletion of stale install state, with scoped release guarantees.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::InstallError;
use crate::workspace::WorkspaceLayout;

/// Process-wide inventory of folders slated for deletion.
///
/// The manager itself only records paths; actual deletion happens through a
/// [`PurgeScope`], one per install attempt.
#[derive(Debug, Clone)]
pub struct PurgeManager {
    stale_folders: Vec<PathBuf>,
}

impl PurgeManager {
    /// Standard purge set for a workspace: the installed module tree and the
    /// last-install flag, so a broken attempt can never masquerade as a
    /// completed one.
    pub fn for_layout(layout: &WorkspaceLayout) -> Self {
        Self {
            stale_folders: vec![layout.node_modules_folder(), layout.last_install_flag_path()],
        }
    }

    pub fn register(&mut self, path: PathBuf) {
        if !self.stale_folders.contains(&path) {
            self.stale_folders.push(path);
        }
    }

    /// Open the per-attempt purge scope.
    pub fn scope(&self) -> PurgeScope {
        PurgeScope {
            pending: self.stale_folders.clone(),
            released: false,
        }
    }
}

/// Per-attempt purge resource.
///
/// `purge_stale` deletes the recorded paths before the install attempt;
/// `release` runs the final cleanup for anything still queued. The release
/// step executes exactly once per scope: it runs on drop if it was not
/// invoked explicitly, so error and panic exit paths are covered.
#[derive(Debug)]
pub struct PurgeScope {
    pending: Vec<PathBuf>,
    released: bool,
}

impl PurgeScope {
    /// Delete the recorded stale paths now. Missing paths are skipped.
    pub fn purge_stale(&mut self) -> Result<(), InstallError> {
        for path in std::mem::take(&mut self.pending) {
            debug!(path = %path.display(), "purging stale state");
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else if path.exists() {
                std::fs::remove_file(&path)
            } else {
                continue;
            };
            if let Err(error) = result {
                return Err(InstallError::PurgeFailed {
                    details: format!("{}: {error}", path.display()),
                });
            }
        }
        Ok(())
    }

    /// Queue an additional path: purged if still pending at purge time,
    /// otherwise deleted at release time.
    pub fn enqueue(&mut self, path: PathBuf) {
        self.pending.push(path);
    }

    /// Final cleanup. Idempotent; failures are logged, never raised, since
    /// release also runs on error exit paths.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for path in std::mem::take(&mut self.pending) {
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else if path.exists() {
                std::fs::remove_file(&path)
            } else {
                continue;
            };
            if let Err(error) = result {
                warn!(path = %path.display(), %error, "failed to clean up purge folder");
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for PurgeScope {
    fn drop(&mut self) {
        self.release();
    }
}
