//! Relocate CLI
//!
//! Embeds locally linked packages into a project and un-embeds them again.
//! Every invocation first finishes a pending embed left behind by an
//! earlier `relocate embed`, so the host's post-reload start only has to
//! run `relocate` (any command).

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use relocate_core::RelocationController;
use relocate_fs::NormalizedPath;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;

    let Some(command) = cli.command else {
        // No command provided - show help hint
        println!(
            "{} Move linked packages into a project and back",
            "relocate".green().bold()
        );
        println!();
        println!("Run {} for available commands.", "relocate --help".cyan());
        return Ok(());
    };

    let start = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let root = project_root(&start)?;
    tracing::debug!(root = %root.display(), "Using project");

    let controller = RelocationController::open(&NormalizedPath::new(&root))?;

    if !cli.no_resume && command != Commands::Discard {
        let quiet = matches!(command, Commands::Status { json: true });
        commands::run_resume(&controller, quiet)?;
    }

    match command {
        Commands::Embed => commands::run_embed(&controller),
        Commands::Unembed => commands::run_unembed(&controller),
        Commands::Status { json } => commands::run_status(&controller, json),
        Commands::Discard => commands::run_discard(&controller),
    }
}

fn project_root(start: &std::path::Path) -> Result<PathBuf> {
    context::find_project_root(start).ok_or_else(|| {
        CliError::user(format!(
            "No relocate project found at or above {} (expected .relocate/config.toml)",
            start.display()
        ))
    })
}
