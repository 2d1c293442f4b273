//! Discard command implementation

use colored::Colorize;
use relocate_core::{Host, RelocationController};

use crate::error::Result;

/// Clear a pending embed without copying
pub fn run_discard<H: Host>(controller: &RelocationController<H>) -> Result<()> {
    if controller.discard_pending()? {
        println!("{}", "Discarded pending embed".green().bold());
        if controller.layout().manifest_backup.exists() {
            println!(
                "The manifest backup is kept; run {} to restore it.",
                "relocate unembed".cyan()
            );
        }
    } else {
        println!("{}", "No embed pending".dimmed());
    }
    Ok(())
}
