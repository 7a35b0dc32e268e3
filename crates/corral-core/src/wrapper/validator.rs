//! Pre-flight policy filter for raw package-manager subcommands.
//!
//! Classifies the requested verb before it is forwarded to the external
//! tool. Adding a new verb means adding one arm to [`classify`], nothing
//! else.

use crate::error::PolicyError;

/// Escape hatch: as the very first token, skips every check below.
pub const SKIP_CHECKS_PARAMETER: &str = "--corral-skip-checks";

/// Policy classification of a pass-through verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbCategory {
    /// Known incompatible with the workspace model; refused unless bypassed.
    Blocked { reason: &'static str },
    /// Mutates shared lock/link state; allowed with a warning.
    Discouraged { warning: &'static str },
    /// Safe only when the environment meets a precondition.
    ConditionallySafe(Precondition),
    /// Verified compatible.
    KnownSafe,
    /// Not validated either way; allowed with a warning.
    Unknown,
}

/// Environment requirements for conditionally-safe verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The package manager must be at least this version.
    MinimumToolVersion { minimum: &'static str },
    /// The generated workspace manifest must exist (an install has run).
    RequiresWorkspaceManifest,
}

/// Facts about the current environment needed by the preconditions.
#[derive(Debug, Clone)]
pub struct ValidatorEnvironment {
    /// Declared package-manager version, when the configuration names one.
    pub package_manager_version: Option<semver::Version>,
    pub manifest_exists: bool,
}

/// Result of a successful validation.
#[derive(Debug, Clone, Default)]
pub struct ValidatedCommand {
    /// The recognized verb, when one was parsed. `None` for bare
    /// help/version queries and fully bypassed invocations.
    pub verb: Option<String>,
    pub bypassed: bool,
    /// Warnings to surface before the command runs.
    pub warnings: Vec<String>,
}

/// Classify one verb. Exhaustive by construction: anything not listed is
/// [`VerbCategory::Unknown`].
pub fn classify(verb: &str) -> VerbCategory {
    match verb {
        "import" => VerbCategory::Blocked {
            reason: "it is known to be incompatible with the corral workspace model",
        },
        "add" | "install" | "i" | "install-test" | "it" => VerbCategory::Blocked {
            reason: "it would bypass workspace install orchestration; use \"corral update\" instead",
        },

        "link" | "ln" | "remove" | "rm" | "unlink" | "update" | "up" => {
            VerbCategory::Discouraged {
                warning: "this command makes changes that may invalidate the workspace install state; consider running \"corral update\" afterwards",
            }
        }

        // Falls back to the system patch tool on older package managers,
        // which can hang waiting for stdin.
        "patch" => VerbCategory::ConditionallySafe(Precondition::MinimumToolVersion {
            minimum: "7.4.0",
        }),
        "patch-commit" => {
            VerbCategory::ConditionallySafe(Precondition::RequiresWorkspaceManifest)
        }

        "audit" | "exec" | "list" | "ls" | "outdated" | "pack" | "prune" | "publish"
        | "rebuild" | "rb" | "root" | "run" | "start" | "store" | "test" | "t" | "why" => {
            VerbCategory::KnownSafe
        }

        _ => VerbCategory::Unknown,
    }
}

/// Validate a raw pass-through command line, removing any bypass token.
///
/// The bypass token is honored as the very first token (skips all checks)
/// or immediately after the verb; anywhere else it cannot be interpreted
/// safely and the command is rejected.
pub fn validate_pass_through(
    arguments: &mut Vec<String>,
    environment: &ValidatorEnvironment,
) -> Result<ValidatedCommand, PolicyError> {
    if arguments.first().map(String::as_str) == Some(SKIP_CHECKS_PARAMETER) {
        arguments.remove(0);
        return Ok(ValidatedCommand {
            verb: None,
            bypassed: true,
            warnings: Vec::new(),
        });
    }

    if arguments.is_empty() {
        return Ok(ValidatedCommand::default());
    }

    // Help and version queries are always allowed.
    if arguments
        .iter()
        .any(|a| a == "-h" || a == "--help" || a == "-?")
    {
        return Ok(ValidatedCommand::default());
    }
    if arguments.len() == 1 && (arguments[0] == "-v" || arguments[0] == "--version") {
        return Ok(ValidatedCommand::default());
    }

    let first = arguments[0].clone();
    if !is_command_verb(&first) {
        return Err(PolicyError::UnparseableCommand {
            message: format!("expected a command verb before \"{first}\""),
        });
    }
    let verb = first;

    // Also accept the bypass token immediately after the verb.
    if arguments.get(1).map(String::as_str) == Some(SKIP_CHECKS_PARAMETER) {
        arguments.remove(1);
        return Ok(ValidatedCommand {
            verb: Some(verb),
            bypassed: true,
            warnings: Vec::new(),
        });
    }
    if arguments.iter().any(|a| a == SKIP_CHECKS_PARAMETER) {
        // The wrapper does not parse the tool's full CLI syntax, so a token
        // in any later position cannot be interpreted reliably.
        return Err(PolicyError::UnparseableCommand {
            message: format!(
                "the \"{SKIP_CHECKS_PARAMETER}\" option must be the very first parameter"
            ),
        });
    }

    let mut warnings: Vec<String> = Vec::new();
    match classify(&verb) {
        VerbCategory::Blocked { reason } => {
            return Err(PolicyError::BlockedCommand {
                verb: verb.clone(),
                reason: reason.to_string(),
            });
        }
        VerbCategory::Discouraged { warning } => warnings.push(warning.to_string()),
        VerbCategory::ConditionallySafe(precondition) => {
            check_precondition(&verb, &precondition, environment)?;
        }
        VerbCategory::KnownSafe => {}
        VerbCategory::Unknown => warnings.push(format!(
            "the \"{verb}\" subcommand has not been tested with corral workspaces and may be incompatible"
        )),
    }

    Ok(ValidatedCommand {
        verb: Some(verb),
        bypassed: false,
        warnings,
    })
}

fn check_precondition(
    verb: &str,
    precondition: &Precondition,
    environment: &ValidatorEnvironment,
) -> Result<(), PolicyError> {
    match precondition {
        Precondition::MinimumToolVersion { minimum } => {
            let required = semver::Version::parse(minimum).map_err(|error| {
                PolicyError::PreconditionFailed {
                    verb: verb.to_string(),
                    message: format!("invalid minimum version \"{minimum}\": {error}"),
                }
            })?;
            match &environment.package_manager_version {
                Some(actual) if *actual >= required => Ok(()),
                Some(actual) => Err(PolicyError::PreconditionFailed {
                    verb: verb.to_string(),
                    message: format!(
                        "it requires package manager {minimum} or newer, but {actual} is configured"
                    ),
                }),
                None => Err(PolicyError::PreconditionFailed {
                    verb: verb.to_string(),
                    message: format!(
                        "it requires package manager {minimum} or newer; declare \"package-manager-version\" in corral.toml"
                    ),
                }),
            }
        }
        Precondition::RequiresWorkspaceManifest => {
            if environment.manifest_exists {
                Ok(())
            } else {
                Err(PolicyError::PreconditionFailed {
                    verb: verb.to_string(),
                    message: "the workspace manifest has not been generated; run \"corral update\" first"
                        .to_string(),
                })
            }
        }
    }
}

/// Lowercase-kebab command verb: `^[a-z]+[a-z0-9-]*$`.
fn is_command_verb(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
