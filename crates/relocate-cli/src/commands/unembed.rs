//! Un-embed command implementation

use colored::Colorize;
use relocate_core::{Gated, Host, RelocationController};

use super::print_unauthorized;
use crate::error::Result;

/// Remove embedded packages and restore the manifest
pub fn run_unembed<H: Host>(controller: &RelocationController<H>) -> Result<()> {
    if let Gated::Unauthorized { identity } = controller.un_embed()? {
        print_unauthorized(&identity, controller.gate().expected());
        return Ok(());
    }

    let layout = controller.layout();
    println!(
        "{} {}",
        "Cleared".green().bold(),
        layout.destination_root.as_str().cyan()
    );
    println!(
        "{} {}",
        "Restored".green().bold(),
        layout.manifest.as_str().cyan()
    );
    Ok(())
}
