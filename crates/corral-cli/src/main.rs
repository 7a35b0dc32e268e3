//! corral - Monorepo Install Orchestrator
//!
//! Usage:
//!   corral update            # Install dependencies, updating the lockfile
//!   corral list --to app     # Inspect a project selection
//!   corral pm <verb> ...     # Validated package-manager pass-through

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corral_core::install::options::DEFAULT_MAX_INSTALL_ATTEMPTS;
use corral_core::prelude::*;
use corral_core::wrapper::SKIP_CHECKS_PARAMETER;

#[derive(Parser)]
#[command(name = "corral")]
#[command(about = "Monorepo install orchestrator", long_about = None)]
struct Cli {
    /// Show full error cause chains
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install package dependencies for the workspace, creating or updating
    /// the lockfile as needed
    Update(UpdateArgs),

    /// Print the projects matched by the selection parameters
    List(ListArgs),

    /// Forward a raw subcommand to the package manager, after policy checks
    ///
    /// Pass --corral-skip-checks as the very first token to bypass the checks.
    Pm(PmArgs),
}

/// Project selection flags shared by actions that operate on a subset of the
/// workspace.
#[derive(Args, Default)]
struct SelectionArgs {
    /// Select PROJECT and all its dependencies ("." = current project)
    #[arg(long = "to", short = 't', value_name = "PROJECT")]
    to: Vec<String>,

    /// Select all dependencies of PROJECT, but not PROJECT itself
    #[arg(long = "to-except", short = 'T', value_name = "PROJECT")]
    to_except: Vec<String>,

    /// Select PROJECT, everything that depends on it, and all their dependencies
    #[arg(long = "from", short = 'f', value_name = "PROJECT")]
    from: Vec<String>,

    /// Select exactly PROJECT, without its dependencies (unsafe)
    #[arg(long = "only", short = 'o', value_name = "PROJECT")]
    only: Vec<String>,

    /// Select PROJECT and everything that depends on it (unsafe)
    #[arg(long = "impacted-by", short = 'i', value_name = "PROJECT")]
    impacted_by: Vec<String>,

    /// Like --impacted-by, but without PROJECT itself (unsafe)
    #[arg(long = "impacted-by-except", short = 'I', value_name = "PROJECT")]
    impacted_by_except: Vec<String>,

    /// Equivalent to --to for each project of the version policy
    #[arg(long = "to-version-policy", value_name = "POLICY")]
    to_version_policy: Vec<String>,

    /// Equivalent to --from for each project of the version policy
    #[arg(long = "from-version-policy", value_name = "POLICY")]
    from_version_policy: Vec<String>,
}

impl SelectionArgs {
    fn into_parameter_set(self) -> SelectionParameterSet {
        SelectionParameterSet {
            to: self.to,
            to_except: self.to_except,
            from: self.from,
            only: self.only,
            impacted_by: self.impacted_by,
            impacted_by_except: self.impacted_by_except,
            to_version_policy: self.to_version_policy,
            from_version_policy: self.from_version_policy,
        }
    }
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Update all dependencies to the latest satisfying versions instead of
    /// preserving installed ones
    #[arg(long)]
    full: bool,

    /// Force the package manager to re-validate the lockfile even when it
    /// appears up to date
    #[arg(long)]
    recheck: bool,

    /// Skip workspace policy checks
    #[arg(long)]
    bypass_policy: bool,

    /// Do not link workspace packages into consumers
    #[arg(long)]
    no_link: bool,

    /// Limit simultaneous network requests made by the package manager
    #[arg(long, value_name = "COUNT")]
    network_concurrency: Option<u32>,

    /// Number of times to retry a failed install
    #[arg(long, default_value_t = DEFAULT_MAX_INSTALL_ATTEMPTS, value_name = "COUNT")]
    max_install_attempts: u32,

    /// Collect a verbose package-manager log
    #[arg(long)]
    debug_pm: bool,

    /// Named installation variant
    #[arg(long, value_name = "VARIANT")]
    variant: Option<String>,

    /// Validate workspace state without invoking the package manager
    #[arg(long)]
    check_only: bool,
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Emit machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PmArgs {
    /// Arguments forwarded to the package manager verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corral=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let debug = cli.debug;

    // Fail closed: anything other than explicit success exits non-zero.
    let exit_code = match run(cli).await {
        Ok(exit_code) => exit_code,
        Err(error) => {
            report_error(&error, debug);
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Update(args) => run_update(args, cli.debug).await,
        Commands::List(args) => run_list(args).await,
        Commands::Pm(args) => run_pm(args),
    }
}

/// Locate and load the enclosing workspace.
fn open_workspace() -> Result<(PathBuf, PathBuf, LoadedWorkspace, WorkspaceLayout)> {
    let current_dir = std::env::current_dir()?;
    let workspace_root = find_workspace_root(&current_dir).ok_or_else(|| {
        anyhow::anyhow!("this command must be run inside a corral workspace (corral.toml not found)")
    })?;
    let workspace = load_workspace(&workspace_root)?;
    let layout = WorkspaceLayout::new(workspace_root.clone())?;
    Ok((workspace_root, current_dir, workspace, layout))
}

async fn run_update(args: UpdateArgs, debug: bool) -> Result<i32> {
    let (workspace_root, current_dir, workspace, layout) = open_workspace()?;
    let registry = SelectorRegistry::with_default_parsers();
    let parameters = args.selection.into_parameter_set();
    parameters.log_usage();

    let context = SelectorContext {
        graph: &workspace.graph,
        workspace_root: &workspace_root,
        current_dir: &current_dir,
        parameter_name: "",
    };
    let filters = parameters.get_filter_arguments(&registry, &context).await?;

    if parameters.is_selection_specified()
        && workspace.graph.has_split_workspace_projects()
        && !filters.has_split_workspace_selection
    {
        eprintln!(
            "ERROR: Selection parameters for \"corral update\" only narrow the install of \
             split-workspace projects, but the selection does not include any. \
             Run the command again selecting at least one split-workspace project."
        );
        return Err(AlreadyReported.into());
    }

    let options = InstallOptions {
        debug,
        allow_lockfile_updates: true,
        bypass_policy: args.bypass_policy,
        no_link: args.no_link,
        full_upgrade: args.full,
        recheck_lockfile: args.recheck,
        network_concurrency: args.network_concurrency,
        collect_log_file: args.debug_pm,
        variant: args.variant,
        max_install_attempts: args.max_install_attempts,
        filter_arguments: filters.arguments,
        split_workspace_filter_arguments: filters.split_workspace_arguments,
        check_only: args.check_only,
    };

    let runner = SystemProcessRunner;
    let mut orchestrator =
        InstallOrchestrator::new(&layout, &workspace.config, &workspace.graph, &runner, options)?;
    orchestrator.run()?;
    Ok(0)
}

async fn run_list(args: ListArgs) -> Result<i32> {
    let (workspace_root, current_dir, workspace, _layout) = open_workspace()?;
    let registry = SelectorRegistry::with_default_parsers();
    let parameters = args.selection.into_parameter_set();

    let context = SelectorContext {
        graph: &workspace.graph,
        workspace_root: &workspace_root,
        current_dir: &current_dir,
        parameter_name: "",
    };
    let selection = parameters.get_selected_projects(&registry, &context).await?;
    let names = selection.names(&workspace.graph);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(0)
}

fn run_pm(args: PmArgs) -> Result<i32> {
    let (_workspace_root, _current_dir, workspace, layout) = open_workspace()?;
    let runner = SystemProcessRunner;
    let mut pass_through =
        PassThroughRunner::new(&layout, &workspace.config, &workspace.graph, &runner);
    let exit_code = pass_through.run(args.args)?;
    Ok(exit_code)
}

fn report_error(error: &anyhow::Error, debug: bool) {
    if error.downcast_ref::<AlreadyReported>().is_some() {
        return;
    }

    if debug {
        // Full cause chain, one line per cause.
        eprintln!("ERROR: {error:?}");
    } else {
        eprintln!("ERROR: {error:#}");
    }

    if let Some(policy) = error.downcast_ref::<PolicyError>() {
        match policy {
            PolicyError::BlockedCommand { .. } | PolicyError::UnparseableCommand { .. } => {
                eprintln!(
                    "{}",
                    style(format!(
                        "To bypass this check, add \"{SKIP_CHECKS_PARAMETER}\" as the very first command line option."
                    ))
                    .cyan()
                );
            }
            PolicyError::PreconditionFailed { .. } => {}
        }
    }
}
