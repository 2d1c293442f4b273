//! Relocation controller
//!
//! Drives the two workflows:
//!
//! ```text
//! Idle --embed--> EmbedPhase1 --(resolve + reload)--> EmbedPhase2 --> Idle
//! Idle --unembed--> UnEmbed --> Idle
//! ```
//!
//! Phase 1 ends by asking the host to reload, which throws away in-memory
//! state. Everything phase 2 needs is therefore written to disk first: the
//! path ledger and the `continue_embed` session flag. Every process start
//! calls [`RelocationController::resume_embed_if_pending`], which consumes
//! the flag before it does any work so a failing phase 2 cannot re-trigger
//! itself on the next start.

use std::fmt;

use relocate_fs::{NormalizedPath, io};
use serde::Serialize;

use crate::config::{ProjectLayout, RelocateConfig};
use crate::copier::PackageCopier;
use crate::gate::OperatorGate;
use crate::hooks::{CommandHost, Host};
use crate::ledger::PathLedger;
use crate::manifest::ManifestStore;
use crate::session::{CONTINUE_EMBED_KEY, ResumeState, SessionStore, StartupAction};
use crate::{Error, Result};

/// Workflow phases, used to label log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    EmbedPhase1,
    EmbedPhase2,
    UnEmbed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::EmbedPhase1 => write!(f, "embed-1"),
            Self::EmbedPhase2 => write!(f, "embed-2"),
            Self::UnEmbed => write!(f, "unembed"),
        }
    }
}

/// Result of a gated entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Done(T),
    /// The operator gate refused; nothing was touched
    Unauthorized { identity: String },
}

/// A package copied into the project by phase 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedPackage {
    pub source: String,
    pub destination: String,
    pub entries: Vec<String>,
}

/// Result of the startup check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeOutcome {
    NotPending,
    Embedded(Vec<EmbeddedPackage>),
}

/// Which layout the project's packages are currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageLayout {
    /// Packages referenced from the manifest
    Linked,
    /// Phase 1 done, waiting for the next start
    EmbedPending,
    /// Packages copied into the project
    Embedded,
}

impl fmt::Display for PackageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked => write!(f, "linked"),
            Self::EmbedPending => write!(f, "embed pending"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

/// Snapshot of the persisted workflow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationStatus {
    pub layout: PackageLayout,
    pub manifest: String,
    pub backup_present: bool,
    pub resume_pending: bool,
    pub ledger: Vec<String>,
    pub destination_root: String,
    pub embedded: Vec<String>,
}

/// Derive the destination directory name of `source`.
///
/// `source` must start with `prefix`; the name is the last component of
/// what follows it, so `P:/pkgs/de.codesmile.foo` under `P:/` maps to
/// `de.codesmile.foo`.
pub fn package_dir_name(source: &str, prefix: &str) -> Result<String> {
    let invalid = || Error::InvalidPackagePath {
        path: source.to_string(),
        prefix: prefix.to_string(),
    };

    let source_norm = NormalizedPath::new(source);
    let prefix_norm = NormalizedPath::new(prefix);
    let name = source_norm
        .as_str()
        .strip_prefix(prefix_norm.as_str())
        .ok_or_else(invalid)?
        .split('/')
        .filter(|part| !part.is_empty())
        .next_back()
        .ok_or_else(invalid)?;

    if name == "." || name == ".." {
        return Err(invalid());
    }
    Ok(name.to_string())
}

/// Orchestrates manifest, ledger, copier and host for one project.
pub struct RelocationController<H: Host> {
    layout: ProjectLayout,
    source_prefix: String,
    gate: OperatorGate,
    manifest: ManifestStore,
    ledger: PathLedger,
    copier: PackageCopier,
    session: SessionStore,
    host: H,
}

impl RelocationController<CommandHost> {
    /// Controller for the project at `project_root`, using its config, the
    /// current process identity and the configured hooks.
    pub fn open(project_root: &NormalizedPath) -> Result<Self> {
        let config = RelocateConfig::load(project_root)?;
        let gate = OperatorGate::new(&config.operator.identity);
        let layout = config.layout(project_root)?;
        let host = CommandHost::new(config.hooks.clone(), project_root.clone(), &layout.manifest);
        Self::new(&config, project_root, gate, host)
    }
}

impl<H: Host> RelocationController<H> {
    pub fn new(
        config: &RelocateConfig,
        project_root: &NormalizedPath,
        gate: OperatorGate,
        host: H,
    ) -> Result<Self> {
        config.validate()?;
        let layout = config.layout(project_root)?;

        Ok(Self {
            manifest: ManifestStore::from_config(&config.manifest, &layout),
            ledger: PathLedger::new(layout.ledger_file.clone()),
            session: SessionStore::new(layout.session_file.clone()),
            copier: PackageCopier::new(config.packages.allowlist.clone()),
            source_prefix: config.packages.source_prefix.clone(),
            layout,
            gate,
            host,
        })
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn gate(&self) -> &OperatorGate {
        &self.gate
    }

    fn check_gate<T>(&self) -> Option<Gated<T>> {
        if self.gate.is_authorized_operator() {
            return None;
        }
        let identity = self.gate.current().to_string();
        tracing::warn!(%identity, expected = %self.gate.expected(), "Not the configured operator, doing nothing");
        Some(Gated::Unauthorized { identity })
    }

    /// Persisted resume descriptor
    pub fn resume_state(&self) -> Result<ResumeState> {
        Ok(ResumeState {
            pending: self.session.get_bool(CONTINUE_EMBED_KEY, false)?,
            ledger: self.ledger.path().clone(),
        })
    }

    /// Destination directory for a ledger path.
    pub fn destination_for(&self, source: &str) -> Result<NormalizedPath> {
        let name = package_dir_name(source, &self.source_prefix)?;
        Ok(self.layout.destination_root.join(&name))
    }

    /// Where a ledger path lives on disk; relative paths are read from the
    /// manifest's directory, as the host resolves `file:` entries.
    fn source_location(&self, source: &str) -> NormalizedPath {
        let base = self
            .layout
            .manifest
            .parent()
            .unwrap_or_else(|| self.layout.project_root.clone());
        NormalizedPath::new(source).resolve_against(&base)
    }

    fn destination_relative(&self) -> Result<String> {
        Ok(self
            .layout
            .destination_root
            .relative_to(&self.layout.project_root)?)
    }

    /// Embed phase 1: take the packages out of the manifest and schedule
    /// phase 2 for the next start.
    ///
    /// Returns the extracted package paths.
    pub fn start_embed(&self) -> Result<Gated<Vec<String>>> {
        if let Some(refused) = self.check_gate() {
            return Ok(refused);
        }
        let _span = tracing::info_span!("relocate", phase = %Phase::EmbedPhase1).entered();

        // Every path must map to a destination before anything is written
        for reference in self.manifest.matching_references()? {
            self.destination_for(&reference.path)?;
        }

        self.manifest.backup()?;
        let references = self.manifest.extract_and_remove_matching()?;
        let paths: Vec<String> = references.into_iter().map(|r| r.path).collect();
        if paths.is_empty() {
            tracing::warn!("No packages matched; phase 2 will only refresh the destination");
        }

        self.ledger.save(&paths)?;
        self.session.set_bool(CONTINUE_EMBED_KEY, true)?;
        tracing::info!(count = paths.len(), "Scheduled package copy for next start");

        self.host.resolve_dependencies()?;
        self.host.request_reload()?;
        Ok(Gated::Done(paths))
    }

    /// Embed phase 2, run at every process start.
    ///
    /// The flag is erased before anything else, so a failure part way
    /// leaves it cleared and needs manual cleanup.
    pub fn resume_embed_if_pending(&self) -> Result<ResumeOutcome> {
        let state = self.resume_state()?;
        if StartupAction::decide(&state) == StartupAction::Nothing {
            return Ok(ResumeOutcome::NotPending);
        }
        let _span = tracing::info_span!("relocate", phase = %Phase::EmbedPhase2).entered();

        self.session.erase_bool(CONTINUE_EMBED_KEY)?;
        tracing::info!("Continuing package embed");

        let mut embedded = Vec::new();
        for source in self.ledger.load()? {
            let destination = self.destination_for(&source)?;
            let entries = self
                .copier
                .copy_into(&self.source_location(&source), &destination)?;
            embedded.push(EmbeddedPackage {
                source,
                destination: destination.to_string(),
                entries,
            });
        }

        self.host.import_path(&self.destination_relative()?)?;
        Ok(ResumeOutcome::Embedded(embedded))
    }

    /// Remove the embedded copies and restore the manifest.
    pub fn un_embed(&self) -> Result<Gated<()>> {
        if let Some(refused) = self.check_gate() {
            return Ok(refused);
        }
        let _span = tracing::info_span!("relocate", phase = %Phase::UnEmbed).entered();

        self.copier.delete_tree(&self.layout.destination_root)?;
        self.manifest.restore_from_backup()?;

        self.host.import_path(&self.destination_relative()?)?;
        self.host.resolve_dependencies()?;
        self.host.request_reload()?;
        Ok(Gated::Done(()))
    }

    /// Erase a pending resume flag without running phase 2.
    ///
    /// Returns whether a flag was pending.
    pub fn discard_pending(&self) -> Result<bool> {
        let removed = self.session.erase_bool(CONTINUE_EMBED_KEY)?;
        if removed {
            tracing::info!("Discarded pending package embed");
        }
        Ok(removed)
    }

    pub fn status(&self) -> Result<RelocationStatus> {
        let resume_pending = self.resume_state()?.pending;
        let backup_present = self.manifest.has_backup();
        let ledger = if self.ledger.exists() {
            self.ledger.load()?
        } else {
            Vec::new()
        };

        let embedded = io::subdirectory_names(&self.layout.destination_root)?;

        let layout = if resume_pending {
            PackageLayout::EmbedPending
        } else if backup_present {
            PackageLayout::Embedded
        } else {
            PackageLayout::Linked
        };

        Ok(RelocationStatus {
            layout,
            manifest: self.layout.manifest.to_string(),
            backup_present,
            resume_pending,
            ledger,
            destination_root: self.layout.destination_root.to_string(),
            embedded,
        })
    }
}
