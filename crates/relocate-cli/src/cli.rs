//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Relocate - Move locally linked packages into a project and back
#[derive(Parser, Debug)]
#[command(name = "relocate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project directory (defaults to searching upwards from the current directory)
    #[arg(short = 'C', long = "project", global = true, env = "RELOCATE_PROJECT")]
    pub project: Option<PathBuf>,

    /// Skip the pending-embed check that runs before every command
    #[arg(long, global = true)]
    pub no_resume: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Move linked packages into the project
    ///
    /// Removes the packages from the manifest (keeping a backup), records
    /// their paths and asks the host to resolve and reload. The packages
    /// are copied by the next `relocate` invocation.
    ///
    /// Examples:
    ///   relocate embed          # Phase 1, then e.g. `relocate status`
    ///   relocate -v embed       # With debug logging
    Embed,

    /// Delete the embedded copies and restore the manifest from its backup
    Unembed,

    /// Show where the packages currently live
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Cancel a pending embed without copying anything
    Discard,
}
