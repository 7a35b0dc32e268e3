//! Well-known paths of a corral workspace.

use std::path::{Path, PathBuf};

use crate::config::PackageManagerOptions;

/// Environment variable overriding the generated temp folder location.
pub const TEMP_FOLDER_ENV: &str = "CORRAL_TEMP_FOLDER";
/// Environment variable overriding the package store path.
pub const STORE_PATH_ENV: &str = "CORRAL_STORE_PATH";
/// Environment variable overriding the package manager cache path.
pub const CACHE_PATH_ENV: &str = "CORRAL_CACHE_PATH";

/// Computed path set for one workspace, including the per-user global folder.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    workspace_root: PathBuf,
    temp_folder: PathBuf,
    global_folder: PathBuf,
    store_path_override: Option<PathBuf>,
    cache_path_override: Option<PathBuf>,
}

impl WorkspaceLayout {
    /// Resolve the layout for `workspace_root`, honoring environment overrides.
    pub fn new(workspace_root: PathBuf) -> anyhow::Result<Self> {
        let temp_folder = match std::env::var_os(TEMP_FOLDER_ENV) {
            Some(value) => PathBuf::from(value),
            None => workspace_root.join(".corral").join("temp"),
        };
        let global_folder = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".corral");
        Ok(Self {
            workspace_root,
            temp_folder,
            global_folder,
            store_path_override: std::env::var_os(STORE_PATH_ENV).map(PathBuf::from),
            cache_path_override: std::env::var_os(CACHE_PATH_ENV).map(PathBuf::from),
        })
    }

    /// Construct a layout from explicit paths, ignoring the process environment.
    pub fn from_parts(workspace_root: PathBuf, temp_folder: PathBuf, global_folder: PathBuf) -> Self {
        Self {
            workspace_root,
            temp_folder,
            global_folder,
            store_path_override: None,
            cache_path_override: None,
        }
    }

    pub fn with_store_path_override(mut self, path: PathBuf) -> Self {
        self.store_path_override = Some(path);
        self
    }

    pub fn with_cache_path_override(mut self, path: PathBuf) -> Self {
        self.cache_path_override = Some(path);
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Folder holding generated install state (manifest, lockfile copy, node_modules).
    pub fn temp_folder(&self) -> &Path {
        &self.temp_folder
    }

    pub fn global_folder(&self) -> &Path {
        &self.global_folder
    }

    /// Generated workspace manifest consumed and mutated by the package manager.
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_folder.join("manifest.json")
    }

    pub fn node_modules_folder(&self) -> PathBuf {
        self.temp_folder.join("node_modules")
    }

    pub fn last_install_flag_path(&self) -> PathBuf {
        self.temp_folder.join("last-install.flag")
    }

    /// Working copy of the lockfile the package manager operates on.
    pub fn temp_lockfile_path(&self) -> PathBuf {
        self.temp_folder.join("lockfile.yaml")
    }

    /// Patch files written by the package manager during `patch-commit`.
    pub fn temp_patches_folder(&self) -> PathBuf {
        self.temp_folder.join("patches")
    }

    /// Committed patch files folder, synchronized from the temp copy.
    pub fn committed_patches_folder(&self) -> PathBuf {
        self.workspace_root.join("common").join("patches")
    }

    /// Purgeable per-user cache folder.
    pub fn global_cache_folder(&self) -> PathBuf {
        self.global_folder.join("cache")
    }

    /// Effective store path: environment override first, then configuration.
    pub fn store_path(&self, options: &PackageManagerOptions) -> Option<PathBuf> {
        self.store_path_override
            .clone()
            .or_else(|| options.store_path.clone())
    }

    /// Effective cache path: environment override first, then configuration.
    pub fn cache_path(&self, options: &PackageManagerOptions) -> Option<PathBuf> {
        self.cache_path_override
            .clone()
            .or_else(|| options.cache_path.clone())
    }
}
