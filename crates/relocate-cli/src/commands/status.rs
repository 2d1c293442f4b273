//! Status command implementation

use colored::Colorize;
use relocate_core::{Host, PackageLayout, RelocationController};

use crate::error::Result;

/// Run the status command
pub fn run_status<H: Host>(controller: &RelocationController<H>, json: bool) -> Result<()> {
    let status = controller.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let layout = match status.layout {
        PackageLayout::Linked => status.layout.to_string().green(),
        PackageLayout::EmbedPending => status.layout.to_string().yellow(),
        PackageLayout::Embedded => status.layout.to_string().cyan(),
    };

    println!("{}", "Relocation Status".bold());
    println!();
    println!("{}:      {}", "Packages".dimmed(), layout);
    println!("{}:      {}", "Manifest".dimmed(), status.manifest);
    println!(
        "{}:        {}",
        "Backup".dimmed(),
        if status.backup_present { "present" } else { "none" }
    );
    println!("{}:   {}", "Destination".dimmed(), status.destination_root);
    println!();

    println!("{}:", "Recorded Paths".bold());
    if status.ledger.is_empty() {
        println!("  {}", "None".dimmed());
    } else {
        for path in &status.ledger {
            println!("  {} {}", "-".dimmed(), path);
        }
    }
    println!();

    println!("{}:", "Embedded Packages".bold());
    if status.embedded.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "relocate embed".cyan());
    } else {
        for name in &status.embedded {
            println!("  {} {}", "+".green(), name.cyan());
        }
    }

    Ok(())
}
