use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ph_cli::commands::{self, Context};

#[derive(Parser)]
#[command(name = "protohost")]
#[command(version, about = "Port leases for per-branch preview deployments")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ledger file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    registry: Option<PathBuf>,

    /// Write debug logs to .protohost-debug.log
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args)]
struct BranchArgs {
    /// Branch name (defaults to the checked-out branch)
    #[arg(long)]
    branch: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Reserve a port for the branch deployment, or renew its lease
    Allocate(BranchArgs),

    /// Show the branch deployment's lease
    Info(BranchArgs),

    /// List every lease on this host
    #[command(alias = "ls")]
    List,

    /// Mark the branch deployment stopped, keeping its port
    Stop(BranchArgs),

    /// Drop the branch deployment's lease and free its port
    Release(BranchArgs),

    /// Stop the branch deployment's containers
    Down {
        #[command(flatten)]
        branch: BranchArgs,

        /// Remove volumes too and release the port
        #[arg(short = 'v', long)]
        remove_volumes: bool,
    },

    /// Tear down deployments whose lease has expired
    Cleanup {
        /// Show what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Live view of the ledger
    Dashboard,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let _guard = if cli.debug {
        Some(setup_debug_logging())
    } else {
        if !matches!(cli.command, Command::Dashboard) {
            setup_stderr_logging();
        }
        None
    };

    let ctx = Context::new(std::env::current_dir()?, cli.registry);

    match cli.command {
        Command::Allocate(args) => commands::lease::allocate(&ctx, args.branch).await,
        Command::Info(args) => commands::lease::info(&ctx, args.branch).await,
        Command::List => commands::list::run(&ctx).await,
        Command::Stop(args) => commands::lease::stop(&ctx, args.branch).await,
        Command::Release(args) => commands::lease::release(&ctx, args.branch).await,
        Command::Down {
            branch,
            remove_volumes,
        } => commands::down::run(&ctx, branch.branch, remove_volumes).await,
        Command::Cleanup { dry_run } => commands::cleanup::run(&ctx, dry_run).await,
        Command::Dashboard => commands::dashboard::run(&ctx).await,
    }
}

/// Warnings and above to stderr unless `RUST_LOG` says otherwise.
fn setup_stderr_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}

/// Configure file-based tracing to `.protohost-debug.log` in CWD.
/// Returns the guard that must be held alive for the duration of the program.
fn setup_debug_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", ".protohost-debug.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .init();

    guard
}
