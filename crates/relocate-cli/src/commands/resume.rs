//! Startup check run before every command

use colored::Colorize;
use relocate_core::{Host, RelocationController, ResumeOutcome};

use crate::error::Result;

/// Finish a pending embed, if there is one.
///
/// `quiet` suppresses the summary, for commands whose stdout is machine-read.
pub fn run_resume<H: Host>(controller: &RelocationController<H>, quiet: bool) -> Result<()> {
    let ResumeOutcome::Embedded(packages) = controller.resume_embed_if_pending()? else {
        return Ok(());
    };
    if quiet {
        return Ok(());
    }

    println!(
        "{} {} package(s) into {}",
        "Embedded".green().bold(),
        packages.len(),
        controller.layout().destination_root.as_str().cyan()
    );
    for package in &packages {
        println!(
            "  {} {} ({})",
            "+".green(),
            package.destination,
            package.entries.join(", ").dimmed()
        );
    }
    println!();
    Ok(())
}
