//! Tests for the pass-through command policy filter.

use corral_core::error::PolicyError;
use corral_core::wrapper::{
    SKIP_CHECKS_PARAMETER, ValidatorEnvironment, validate_pass_through,
};

fn environment() -> ValidatorEnvironment {
    ValidatorEnvironment {
        package_manager_version: Some(semver::Version::new(8, 0, 0)),
        manifest_exists: true,
    }
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[test]
fn bypass_token_as_first_token_skips_all_checks() {
    let mut arguments = args(&[SKIP_CHECKS_PARAMETER, "import", "something"]);
    let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
    assert!(validated.bypassed);
    // The token is stripped before forwarding.
    assert_eq!(arguments, args(&["import", "something"]));
}

#[test]
fn bypass_token_after_the_verb_is_honored() {
    let mut arguments = args(&["run", SKIP_CHECKS_PARAMETER, "build"]);
    let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
    assert!(validated.bypassed);
    assert_eq!(validated.verb.as_deref(), Some("run"));
    assert_eq!(arguments, args(&["run", "build"]));
}

#[test]
fn bypass_token_anywhere_else_is_rejected() {
    let mut arguments = args(&["run", "build", SKIP_CHECKS_PARAMETER]);
    let error = validate_pass_through(&mut arguments, &environment()).unwrap_err();
    assert!(matches!(error, PolicyError::UnparseableCommand { .. }));
}

#[test]
fn help_and_version_queries_are_always_allowed() {
    for tokens in [
        vec!["--help"],
        vec!["-h"],
        vec!["install", "-?"],
        vec!["-v"],
        vec!["--version"],
    ] {
        let mut arguments = args(&tokens);
        let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
        assert!(validated.warnings.is_empty(), "tokens: {tokens:?}");
    }
}

#[test]
fn empty_command_line_passes_through() {
    let mut arguments: Vec<String> = Vec::new();
    assert!(validate_pass_through(&mut arguments, &environment()).is_ok());
}

#[test]
fn malformed_verb_is_unparseable() {
    for verb in ["Install", "-x", "9lives", "do_thing"] {
        let mut arguments = args(&[verb, "more"]);
        let error = validate_pass_through(&mut arguments, &environment()).unwrap_err();
        assert!(
            matches!(error, PolicyError::UnparseableCommand { .. }),
            "verb: {verb}"
        );
    }
}

#[test]
fn blocked_verbs_are_refused() {
    for verb in ["import", "add", "install", "i", "install-test", "it"] {
        let mut arguments = args(&[verb]);
        let error = validate_pass_through(&mut arguments, &environment()).unwrap_err();
        assert!(
            matches!(error, PolicyError::BlockedCommand { .. }),
            "verb: {verb}"
        );
    }
}

#[test]
fn discouraged_verbs_warn_but_proceed() {
    for verb in ["link", "ln", "remove", "rm", "unlink", "update", "up"] {
        let mut arguments = args(&[verb, "left-pad"]);
        let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
        assert_eq!(validated.verb.as_deref(), Some(verb));
        assert_eq!(validated.warnings.len(), 1, "verb: {verb}");
    }
}

#[test]
fn known_safe_verbs_proceed_silently() {
    for verb in ["run", "test", "why", "publish", "store"] {
        let mut arguments = args(&[verb]);
        let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
        assert!(validated.warnings.is_empty(), "verb: {verb}");
    }
}

#[test]
fn unknown_verbs_warn_but_proceed() {
    let mut arguments = args(&["frobnicate"]);
    let validated = validate_pass_through(&mut arguments, &environment()).unwrap();
    assert_eq!(validated.verb.as_deref(), Some("frobnicate"));
    assert_eq!(validated.warnings.len(), 1);
    assert!(validated.warnings[0].contains("not been tested"));
}

#[test]
fn patch_requires_a_minimum_tool_version() {
    let mut old = environment();
    old.package_manager_version = Some(semver::Version::new(7, 3, 0));
    let mut arguments = args(&["patch", "left-pad"]);
    let error = validate_pass_through(&mut arguments, &old).unwrap_err();
    assert!(matches!(error, PolicyError::PreconditionFailed { .. }));

    let mut current = environment();
    current.package_manager_version = Some(semver::Version::new(7, 4, 0));
    let mut arguments = args(&["patch", "left-pad"]);
    assert!(validate_pass_through(&mut arguments, &current).is_ok());
}

#[test]
fn patch_fails_when_the_tool_version_is_undeclared() {
    let mut unknown = environment();
    unknown.package_manager_version = None;
    let mut arguments = args(&["patch", "left-pad"]);
    let error = validate_pass_through(&mut arguments, &unknown).unwrap_err();
    assert!(matches!(error, PolicyError::PreconditionFailed { .. }));
}

#[test]
fn patch_commit_requires_the_workspace_manifest() {
    let mut fresh = environment();
    fresh.manifest_exists = false;
    let mut arguments = args(&["patch-commit", "/tmp/patch-dir"]);
    let error = validate_pass_through(&mut arguments, &fresh).unwrap_err();
    match error {
        PolicyError::PreconditionFailed { verb, message } => {
            assert_eq!(verb, "patch-commit");
            assert!(message.contains("corral update"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut arguments = args(&["patch-commit", "/tmp/patch-dir"]);
    assert!(validate_pass_through(&mut arguments, &environment()).is_ok());
}
