//! configlink CLI
//!
//! Command-line interface for linking external configuration into a project.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use tracing::Level;

use configlink::sync::{StatusReport, TargetState};
use configlink::{SyncOptions, Synchronizer};

#[derive(Parser)]
#[command(name = "configlink")]
#[command(
    author,
    version,
    about = "Link external configuration files into a project using symbolic links"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ProjectArgs {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Config directory; takes precedence over local.properties and APP_CONFIG_DIR
    #[arg(long)]
    config_dir: Option<String>,

    /// Mapping file, relative to the project root
    #[arg(long)]
    mapping_file: Option<PathBuf>,

    /// Ignore file to maintain, relative to the project root
    #[arg(long)]
    ignore_file: Option<PathBuf>,
}

impl ProjectArgs {
    fn load(self, announce: bool) -> Result<Synchronizer> {
        let root = match self.path {
            Some(p) => p,
            None => env::current_dir().context("Failed to read current directory")?,
        };
        let options = SyncOptions {
            config_dir: self.config_dir,
            mapping_file: self.mapping_file,
            ignore_file: self.ignore_file,
        };

        let synchronizer = Synchronizer::load(&root, &options)?;
        if announce {
            let config_dir = synchronizer.config_dir();
            println!(
                "Reading config dir from {}: {}",
                config_dir.origin.to_string().cyan(),
                config_dir.raw
            );
        }
        Ok(synchronizer)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Update the ignore file and create or repair symlinks
    Apply {
        #[command(flatten)]
        project: ProjectArgs,

        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },

    /// Report link and ignore-file state without changing anything
    Status {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Apply { project, dry_run } => {
            let synchronizer = project.load(true)?;

            if dry_run {
                println!("{}", "Running in dry-run mode".cyan());
            }

            println!("\n{}", "➤ Syncing configuration links".cyan().bold());
            // Errors abort here; nothing after a failed mapping is attempted.
            let report = synchronizer.sync(dry_run)?;

            println!("\n{}", "✨ Sync complete!".green().bold());
            println!(
                "  Created: {}, Updated: {}, Unchanged: {}",
                report.created.to_string().green(),
                report.updated.to_string().yellow(),
                report.unchanged.to_string().dimmed()
            );
        }

        Commands::Status { project, json } => {
            let synchronizer = project.load(!json)?;
            let status = synchronizer.status()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }

            if status.problems() > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_status(status: &StatusReport) {
    for entry in &status.entries {
        match entry.state {
            TargetState::Linked => println!("{} OK: {}", "✔".green(), entry.target),
            TargetState::Missing => println!("{} Missing: {}", "!".yellow(), entry.target),
            TargetState::WrongLink => println!(
                "{} Incorrect link: {} -> {} (expected: {})",
                "✗".red(),
                entry.target,
                entry.points_to.as_deref().unwrap_or("<unknown>"),
                entry.source
            ),
            TargetState::NotASymlink => {
                println!("{} Exists but not a symlink: {}", "✗".red(), entry.target)
            }
        }
    }

    if status.ignore_file_current {
        println!("{} Ignore file is up to date", "✔".green());
    } else {
        println!("{} Ignore file needs updating", "!".yellow());
    }

    let problems = status.problems();
    if problems > 0 {
        println!("\nStatus: {} problems found", problems);
    } else {
        println!("\nStatus: All good");
    }
}
