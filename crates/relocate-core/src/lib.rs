//! Package relocation workflow
//!
//! Moves locally linked packages into a project's working tree ("embed")
//! and back out again ("un-embed"):
//!
//! - **Manifest store**: line-level extraction of `file:` package entries,
//!   backup and restore of the manifest
//! - **Path ledger**: the extracted package paths, kept outside the project
//! - **Session store**: the durable `continue_embed` flag
//! - **Package copier**: allowlisted copies with `.meta` sidecars
//! - **Operator gate**: only the configured maintainer may relocate
//! - **Host hooks**: resolve, reload and import requests to the host
//! - **Controller**: sequences all of the above across the reload boundary
//!
//! # Architecture
//!
//! ```text
//!              relocate-cli
//!                   |
//!             relocate-core
//!                   |
//!              relocate-fs
//! ```

pub mod config;
pub mod controller;
pub mod copier;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod ledger;
pub mod manifest;
pub mod session;

pub use config::{ProjectLayout, RelocateConfig};
pub use controller::{
    EmbeddedPackage, Gated, PackageLayout, Phase, RelocationController, RelocationStatus,
    ResumeOutcome, package_dir_name,
};
pub use copier::{DEFAULT_ALLOWLIST, PackageCopier};
pub use error::{Error, ErrorKind, Result};
pub use gate::{OperatorGate, OperatorIdentity};
pub use hooks::{CommandHost, HookConfig, HookEvent, Host};
pub use ledger::PathLedger;
pub use manifest::{ManifestStore, PackageReference};
pub use session::{CONTINUE_EMBED_KEY, ResumeState, SessionStore, StartupAction};
