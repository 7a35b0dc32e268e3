//! Options controlling one install orchestration.

/// Default number of install attempts before giving up.
pub const DEFAULT_MAX_INSTALL_ATTEMPTS: u32 = 3;

/// Configuration value object for the install orchestrator.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Surface the full internal cause chain on failure.
    pub debug: bool,

    /// Whether the package manager may rewrite the lockfile. When false the
    /// install runs frozen and fails on any lockfile drift.
    pub allow_lockfile_updates: bool,

    /// Skip workspace policy checks.
    pub bypass_policy: bool,

    /// Do not link workspace packages into consumers.
    pub no_link: bool,

    /// Upgrade every dependency to the latest satisfying version instead of
    /// preserving currently installed versions.
    pub full_upgrade: bool,

    /// Force the package manager to re-validate the lockfile even when it
    /// appears up to date.
    pub recheck_lockfile: bool,

    pub network_concurrency: Option<u32>,

    /// Collect a verbose package-manager log file.
    pub collect_log_file: bool,

    /// Named installation variant, if any.
    pub variant: Option<String>,

    /// Maximum number of spawn attempts. Must be at least 1.
    pub max_install_attempts: u32,

    /// Filter arguments for ordinary workspace projects.
    pub filter_arguments: Vec<String>,

    /// Filter arguments for the split sub-workspace, if one exists.
    pub split_workspace_filter_arguments: Vec<String>,

    /// Validate workspace state without invoking the package manager.
    pub check_only: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            debug: false,
            allow_lockfile_updates: false,
            bypass_policy: false,
            no_link: false,
            full_upgrade: false,
            recheck_lockfile: false,
            network_concurrency: None,
            collect_log_file: false,
            variant: None,
            max_install_attempts: DEFAULT_MAX_INSTALL_ATTEMPTS,
            filter_arguments: Vec::new(),
            split_workspace_filter_arguments: Vec::new(),
            check_only: false,
        }
    }
}

impl InstallOptions {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_install_attempts < 1 {
            anyhow::bail!("max install attempts must be at least 1");
        }
        Ok(())
    }
}
