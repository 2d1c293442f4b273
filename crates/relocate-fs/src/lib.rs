//! Filesystem primitives for relocate
//!
//! Provides forward-slash path handling, atomic text I/O, tree copies and
//! format-agnostic config loading for the layers above.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::RelocatePath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
