//! Tests for validated pass-through execution.

mod support;

use std::collections::BTreeMap;

use corral_core::config::{ConfigStore, WorkspaceConfig};
use corral_core::error::{InstallError, PolicyError};
use corral_core::install::InstallState;
use corral_core::workspace::manifest::{self, WorkspaceManifest};
use corral_core::wrapper::PassThroughRunner;
use tempfile::TempDir;

use support::{MockProcessRunner, ScriptedOutcome, graph_of, layout_in};

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn blocked_verbs_never_reach_the_package_manager() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let config = WorkspaceConfig::default();
    let graph = graph_of(&[("app", &[])]);
    let runner = MockProcessRunner::succeeding();

    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let error = pass_through.run(args(&["install"])).unwrap_err();

    assert!(error.downcast_ref::<PolicyError>().is_some());
    assert_eq!(runner.spawn_count(), 0);
}

#[test]
fn safe_verbs_are_forwarded_verbatim() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let config = WorkspaceConfig::default();
    let graph = graph_of(&[("app", &[])]);
    let runner = MockProcessRunner::succeeding();

    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let exit_code = pass_through.run(args(&["run", "build"])).unwrap();

    assert_eq!(exit_code, 0);
    assert_eq!(pass_through.state(), InstallState::Succeeded);
    let requests = runner.requests();
    assert_eq!(requests[0].arguments, args(&["run", "build"]));
    assert_eq!(requests[0].working_dir, layout.workspace_root());
}

#[test]
fn child_exit_codes_are_propagated() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let config = WorkspaceConfig::default();
    let graph = graph_of(&[("app", &[])]);
    let runner = MockProcessRunner::with_script(vec![ScriptedOutcome::Exit(3)]);

    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let exit_code = pass_through.run(args(&["run", "flaky"])).unwrap();

    assert_eq!(exit_code, 3);
    assert_eq!(pass_through.state(), InstallState::Failed);
}

#[test]
fn missing_exit_status_is_fatal() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let config = WorkspaceConfig::default();
    let graph = graph_of(&[("app", &[])]);
    let runner = MockProcessRunner::with_script(vec![ScriptedOutcome::NoStatus]);

    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let error = pass_through.run(args(&["run", "build"])).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<InstallError>(),
        Some(InstallError::MissingExitCode)
    ));
}

#[test]
fn patch_commit_triggers_reconciliation() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let graph = graph_of(&[("app", &[])]);

    let config = WorkspaceConfig::default();
    ConfigStore::new(temp.path()).save(&config).unwrap();

    // Manifest observed after patch-commit differs from the recorded state.
    manifest::write_manifest(
        &layout,
        &WorkspaceManifest {
            projects: vec!["app".to_string()],
            patched_dependencies: BTreeMap::from([(
                "left-pad@1.3.0".to_string(),
                "patches/left-pad.patch".to_string(),
            )]),
        },
    )
    .unwrap();
    std::fs::create_dir_all(layout.temp_patches_folder()).unwrap();
    std::fs::write(layout.temp_patches_folder().join("left-pad.patch"), "x").unwrap();

    let runner = MockProcessRunner::succeeding();
    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let exit_code = pass_through
        .run(args(&["patch-commit", "/tmp/edited-pkg"]))
        .unwrap();

    assert_eq!(exit_code, 0);
    // One pass-through spawn plus exactly one nested install.
    assert_eq!(runner.spawn_count(), 2);
    assert!(layout.committed_patches_folder().join("left-pad.patch").is_file());
}

#[test]
fn patch_commit_without_drift_skips_the_nested_install() {
    let temp = TempDir::new().unwrap();
    let layout = layout_in(temp.path());
    let graph = graph_of(&[("app", &[])]);

    let config = WorkspaceConfig::default();
    ConfigStore::new(temp.path()).save(&config).unwrap();
    manifest::write_manifest(
        &layout,
        &WorkspaceManifest {
            projects: vec!["app".to_string()],
            patched_dependencies: BTreeMap::new(),
        },
    )
    .unwrap();

    let runner = MockProcessRunner::succeeding();
    let mut pass_through = PassThroughRunner::new(&layout, &config, &graph, &runner);
    let exit_code = pass_through
        .run(args(&["patch-commit", "/tmp/edited-pkg"]))
        .unwrap();

    assert_eq!(exit_code, 0);
    assert_eq!(runner.spawn_count(), 1);
}
