//! Command implementations for relocate-cli

pub mod discard;
pub mod embed;
pub mod resume;
pub mod status;
pub mod unembed;

pub use discard::run_discard;
pub use embed::run_embed;
pub use resume::run_resume;
pub use status::run_status;
pub use unembed::run_unembed;

use colored::Colorize;

/// Shown when the operator gate refuses; this is not an error.
fn print_unauthorized(identity: &str, expected: &str) {
    println!(
        "{} {} is not the configured operator ({}); nothing changed.",
        "skipped:".yellow().bold(),
        identity.cyan(),
        expected.dimmed()
    );
}
