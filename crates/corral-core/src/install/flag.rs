//! The last-install flag file.
//!
//! Written after a successful install and deleted by the purge step, so its
//! presence proves the temp folder matches a completed install with the
//! recorded options.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WorkspaceConfig;
use crate::workspace::WorkspaceLayout;

use super::options::InstallOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LastInstallFlag {
    pub installed_at: DateTime<Utc>,
    pub package_manager: String,
    pub variant: Option<String>,
    pub full_upgrade: bool,
    pub filter_arguments: Vec<String>,
}

impl LastInstallFlag {
    pub fn for_install(config: &WorkspaceConfig, options: &InstallOptions) -> Self {
        Self {
            installed_at: Utc::now(),
            package_manager: config.workspace.package_manager.display().to_string(),
            variant: options.variant.clone(),
            full_upgrade: options.full_upgrade,
            filter_arguments: options.filter_arguments.clone(),
        }
    }

    pub fn write(&self, layout: &WorkspaceLayout) -> anyhow::Result<()> {
        let path = layout.last_install_flag_path();
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize install flag")?;
        std::fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read the flag if present; a missing or unreadable flag means no
    /// completed install is recorded.
    pub fn read(layout: &WorkspaceLayout) -> Option<Self> {
        let raw = std::fs::read_to_string(layout.last_install_flag_path()).ok()?;
        serde_json::from_str(&raw).ok()
    }
}
