//! Embed command implementation

use colored::Colorize;
use relocate_core::{Gated, Host, RelocationController};

use super::print_unauthorized;
use crate::error::Result;

/// Run embed phase 1
pub fn run_embed<H: Host>(controller: &RelocationController<H>) -> Result<()> {
    let paths = match controller.start_embed()? {
        Gated::Done(paths) => paths,
        Gated::Unauthorized { identity } => {
            print_unauthorized(&identity, controller.gate().expected());
            return Ok(());
        }
    };

    if paths.is_empty() {
        println!("{}", "No linked packages found in the manifest".yellow());
    } else {
        println!(
            "{} {} package(s) from the manifest",
            "Removed".green().bold(),
            paths.len()
        );
        for path in &paths {
            println!("  {} {}", "-".red(), path);
        }
    }
    println!();
    println!(
        "Packages are copied into {} on the next {} run.",
        controller.layout().destination_root.as_str().cyan(),
        "relocate".cyan()
    );
    Ok(())
}
