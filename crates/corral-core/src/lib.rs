//! Corral Core Library
//!
//! Provides the domain logic for monorepo install orchestration:
//! the workspace dependency graph, selector-based project selection,
//! and the package-manager install state machine.

pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod install;
pub mod selection;
pub mod workspace;
pub mod wrapper;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigStore, EnvironmentValue, PackageManagerOptions, ProjectConfig, WorkspaceConfig,
        find_workspace_root,
    };

    // Workspace
    pub use crate::workspace::{
        LoadedWorkspace, Project, ProjectId, WorkspaceGraph, WorkspaceLayout, load_workspace,
    };

    // Selection
    pub use crate::selection::selectors::{SelectorContext, SelectorParser, SelectorRegistry};
    pub use crate::selection::{FilterArguments, Selection, SelectionParameterSet};

    // Install
    pub use crate::install::{
        InstallOptions, InstallOrchestrator, InstallState, ProcessRunner, PurgeManager,
        SystemProcessRunner,
    };

    // Wrapper
    pub use crate::wrapper::{PassThroughRunner, PatchReconciler, ValidatorEnvironment};

    // Errors
    pub use crate::error::{AlreadyReported, InstallError, PolicyError, SelectionError};
}
