//! Error taxonomy shared across the selection, policy and install layers.

use thiserror::Error;

/// Marker for an error whose message was already shown to the user.
///
/// Propagated up the call chain so the top-level reporter knows not to
/// print the same failure twice.
#[derive(Debug, Error)]
#[error("an error was already reported")]
pub struct AlreadyReported;

/// Errors produced while resolving selector expressions into projects.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The scope prefix of a selector is not registered.
    #[error(
        "unsupported selector prefix \"{scope}:\" passed to \"{parameter}\": \"{raw}\". Supported prefixes: {supported}"
    )]
    UnsupportedSelector {
        scope: String,
        raw: String,
        parameter: String,
        supported: String,
    },

    /// The unscoped selector value did not resolve to any project.
    #[error("the {kind} \"{value}\" passed to \"{parameter}\" does not match any workspace project")]
    SelectorNotFound {
        kind: &'static str,
        value: String,
        parameter: String,
    },

    /// `.` was used outside of any workspace project folder.
    #[error(
        "the current directory is not inside a workspace project, so the \".\" value for \"{parameter}\" is not allowed"
    )]
    NotInProject { parameter: String },

    /// A selector could not be evaluated against the environment (e.g. git failure).
    #[error("failed to evaluate \"{raw}\" passed to \"{parameter}\": {details}")]
    EvaluationFailed {
        raw: String,
        parameter: String,
        details: String,
    },
}

/// Errors raised by the command-wrapper policy filter before a pass-through
/// subcommand is forwarded to the package manager.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The verb is known to be incompatible with the workspace model.
    #[error("the \"{verb}\" subcommand is not allowed: {reason}")]
    BlockedCommand { verb: String, reason: String },

    /// The command line could not be interpreted by the wrapper.
    #[error("{message}")]
    UnparseableCommand { message: String },

    /// The verb is only safe under conditions the current environment does not meet.
    #[error("the \"{verb}\" subcommand cannot be used here: {message}")]
    PreconditionFailed { verb: String, message: String },
}

/// Errors surfaced by the install orchestration state machine.
#[derive(Debug, Error)]
pub enum InstallError {
    /// Stale state could not be removed before the install attempt.
    #[error("failed to purge stale workspace state: {details}")]
    PurgeFailed { details: String },

    /// The package manager process could not be started. Never retried.
    #[error("failed to start the package manager: {details}")]
    SpawnFailed { details: String },

    /// The package manager terminated without reporting an exit code.
    /// Distinct from a normal non-zero exit, and never retried.
    #[error("the package manager terminated without reporting an exit code")]
    MissingExitCode,

    /// The package manager reported failure on every allowed attempt.
    #[error("the package manager failed with exit code {exit_code} after {attempts} attempt(s)")]
    InstallFailed { exit_code: i32, attempts: u32 },

    /// Post-install patch reconciliation failed. The completed install is kept.
    #[error("failed to reconcile patch state after install: {details}")]
    ReconciliationFailed { details: String },
}
