//! The package-manager command wrapper: policy validation, pass-through
//! execution, and post-install reconciliation.

pub mod reconcile;
pub mod runner;
pub mod validator;

pub use reconcile::{PatchReconciler, ReconcileOutcome};
pub use runner::PassThroughRunner;
pub use validator::{
    Precondition, SKIP_CHECKS_PARAMETER, ValidatedCommand, ValidatorEnvironment, VerbCategory,
    classify, validate_pass_through,
};
