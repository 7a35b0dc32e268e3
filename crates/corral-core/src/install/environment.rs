//! Environment construction for spawned package-manager processes.

use std::collections::BTreeMap;

use crate::config::PackageManagerOptions;
use crate::workspace::WorkspaceLayout;

/// Variable telling the package manager where the generated workspace lives.
pub const WORKSPACE_DIR_VARIABLE: &str = "NPM_CONFIG_WORKSPACE_DIR";
pub const STORE_DIR_VARIABLE: &str = "NPM_CONFIG_STORE_DIR";
pub const CACHE_DIR_VARIABLE: &str = "NPM_CONFIG_CACHE_DIR";

/// Build the child environment from a base environment snapshot.
///
/// Applies, in order: the workspace/store/cache overrides derived from the
/// layout and configuration, then user-declared variables. A user variable
/// with `override = false` only fills in when the base environment does not
/// already define it.
pub fn build_environment(
    base: BTreeMap<String, String>,
    options: &PackageManagerOptions,
    layout: &WorkspaceLayout,
) -> BTreeMap<String, String> {
    let mut environment = base;

    environment.insert(
        WORKSPACE_DIR_VARIABLE.to_string(),
        layout.temp_folder().display().to_string(),
    );
    if let Some(store_path) = layout.store_path(options) {
        environment.insert(STORE_DIR_VARIABLE.to_string(), store_path.display().to_string());
    }
    if let Some(cache_path) = layout.cache_path(options) {
        environment.insert(CACHE_DIR_VARIABLE.to_string(), cache_path.display().to_string());
    }

    for (key, declared) in &options.environment {
        if declared.override_existing || !environment.contains_key(key) {
            environment.insert(key.clone(), declared.value.clone());
        }
    }

    environment
}

/// Snapshot of the current process environment.
pub fn process_environment() -> BTreeMap<String, String> {
    std::env::vars().collect()
}
