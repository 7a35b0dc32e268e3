//! Install orchestration: purge, spawn, evaluate, retry.

pub mod environment;
pub mod flag;
pub mod options;
pub mod orchestrator;
pub mod process;
pub mod purge;

pub use flag::LastInstallFlag;
pub use options::{DEFAULT_MAX_INSTALL_ATTEMPTS, InstallOptions};
pub use orchestrator::{InstallOrchestrator, InstallState};
pub use process::{ProcessRunner, SpawnOutcome, SpawnRequest, SystemProcessRunner};
pub use purge::{PurgeManager, PurgeScope};
