//! skl - project-local skill package manager
//!
//! Usage:
//!   skl install github@acme/skills/fmt:v1   # install one package
//!   skl update                              # reconcile sklfile.json with the lock
//!   skl list github@acme/skills             # browse a repository catalog

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skl_core::commands::{
    CatalogCommand, InfoCommand, InstallCommand, InstallOptions, InstalledCommand, RemoveCommand,
    UpdateCommand,
};
use skl_core::context::AppContext;
use skl_core::git::SystemGit;

#[derive(Parser)]
#[command(name = "skl")]
#[command(about = "Install and sync agent skills from git repositories", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a package and record it in sklfile.json
    ///
    /// Reference forms:
    /// - provider@owner/repo/package[:ref]  (e.g. github@acme/skills/fmt:v1.2.0)
    /// - local@package                      (already present under the skills dir)
    #[command(alias = "add")]
    Install {
        /// Package reference
        reference: String,
        /// Replace the package directory if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a package directory and its manifest and lock entries
    #[command(alias = "rm")]
    Remove {
        /// Package name (or full reference)
        name: String,
    },

    /// List the catalog of a repository (provider@owner/repo[:ref])
    List {
        /// Repository reference
        repo: String,
    },

    /// Show a package's SKILL.md (installed name or remote reference)
    Info {
        /// Package name or reference
        target: String,
    },

    /// Reconcile sklfile.json against sklfile.lock
    ///
    /// The lock records resolved commits while the manifest keeps `*` or a
    /// branch/tag name, so those packages are reinstalled on every run to
    /// pick up the latest commit.
    #[command(alias = "sync")]
    Update,

    /// List installed package directories
    Installed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub(crate) enum OutputFormat {
    /// Human-readable output
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skl=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    tracing::debug!("Project root: {}", project_root.display());
    let ctx = AppContext::new(project_root)?;
    let format = cli.format;

    if clones_repositories(&cli.command) {
        SystemGit::new().ensure_version()?;
    }

    match cli.command {
        Commands::Install { reference, force } => {
            let options = InstallOptions::new(reference).with_force(force);
            let report = InstallCommand::new(&ctx).execute(&options)?;
            output::print_install(&report, format)?;
        }
        Commands::Remove { name } => {
            let report = RemoveCommand::new(&ctx).execute(&name)?;
            output::print_remove(&report, format)?;
        }
        Commands::List { repo } => {
            let report = CatalogCommand::new(&ctx).execute(&repo)?;
            output::print_catalog(&report, format)?;
        }
        Commands::Info { target } => {
            let report = InfoCommand::new(&ctx).execute(&target)?;
            output::print_info(&report, format)?;
        }
        Commands::Update => {
            let report = UpdateCommand::new(&ctx).execute()?;
            output::print_update(&report, format)?;
        }
        Commands::Installed => {
            let entries = InstalledCommand::new(&ctx).execute()?;
            output::print_installed(&entries, format)?;
        }
    }
    Ok(())
}

/// Whether the command may clone, so git must support sparse checkouts.
fn clones_repositories(command: &Commands) -> bool {
    let is_remote = |target: &str| target.contains('@') && !target.starts_with("local@");
    match command {
        Commands::Install { reference, .. } => is_remote(reference),
        Commands::Info { target } => is_remote(target),
        Commands::Update => true,
        Commands::Remove { .. } | Commands::List { .. } | Commands::Installed => false,
    }
}
