//! Project configuration
//!
//! Loaded from `.relocate/config.toml` (or `config.json`) at the project
//! root. Every setting except the operator identity has a default matching
//! the usual layout:
//!
//! ```toml
//! [manifest]
//! path = "Packages/manifest.json"
//! backup_suffix = ".backup"
//! package_filter = "de.codesmile."
//! file_marker = "\"file:"
//!
//! [packages]
//! destination = "Assets/CodeSmile/Packages"
//! source_prefix = "P:/"
//!
//! [operator]
//! identity = "CodeSmile-PC\\CodeSmile"
//! ```

use relocate_fs::{ConfigStore, NormalizedPath, RelocatePath};
use serde::{Deserialize, Serialize};

use crate::copier::DEFAULT_ALLOWLIST;
use crate::hooks::HookConfig;
use crate::{Error, Result};

/// `[manifest]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSection {
    /// Manifest location, relative to the project root
    pub path: String,
    /// Appended to the manifest path to form the backup path
    pub backup_suffix: String,
    /// Lines containing this text are treated as relocatable packages
    pub package_filter: String,
    /// Marker preceding the package path inside a matching line
    pub file_marker: String,
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self {
            path: "Packages/manifest.json".to_string(),
            backup_suffix: ".backup".to_string(),
            package_filter: "de.codesmile.".to_string(),
            file_marker: "\"file:".to_string(),
        }
    }
}

/// `[packages]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesSection {
    /// Directory inside the project that receives embedded packages
    pub destination: String,
    /// Stripped from each source path to name its destination directory
    pub source_prefix: String,
    /// Entries copied from each package, in order
    pub allowlist: Vec<String>,
}

impl Default for PackagesSection {
    fn default() -> Self {
        Self {
            destination: "Assets/CodeSmile/Packages".to_string(),
            source_prefix: "P:/".to_string(),
            allowlist: DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[operator]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSection {
    /// Expected `<host>\<user>` identity of the maintainer
    pub identity: String,
}

/// `[state]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSection {
    /// Directory for the ledger and session store; must live outside the project
    pub dir: Option<String>,
}

/// Parsed project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocateConfig {
    #[serde(default)]
    pub manifest: ManifestSection,
    #[serde(default)]
    pub packages: PackagesSection,
    pub operator: OperatorSection,
    #[serde(default)]
    pub state: StateSection,
    #[serde(default)]
    pub hooks: Vec<HookConfig>,
}

/// Absolute locations derived from a config and a project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project_root: NormalizedPath,
    pub manifest: NormalizedPath,
    pub manifest_backup: NormalizedPath,
    pub destination_root: NormalizedPath,
    pub state_dir: NormalizedPath,
    pub ledger_file: NormalizedPath,
    pub session_file: NormalizedPath,
}

impl RelocateConfig {
    /// Config with defaults and the given operator identity
    pub fn with_identity(identity: impl Into<String>) -> Self {
        Self {
            manifest: ManifestSection::default(),
            packages: PackagesSection::default(),
            operator: OperatorSection {
                identity: identity.into(),
            },
            state: StateSection::default(),
            hooks: Vec::new(),
        }
    }

    /// Location of the TOML config for a project
    pub fn path_for(project_root: &NormalizedPath) -> NormalizedPath {
        project_root
            .join(RelocatePath::ConfigDir.as_str())
            .join(RelocatePath::ConfigFile.as_str())
    }

    /// Load and validate the config of the project at `project_root`.
    pub fn load(project_root: &NormalizedPath) -> Result<Self> {
        let config_dir = project_root.join(RelocatePath::ConfigDir.as_str());
        let toml_path = config_dir.join(RelocatePath::ConfigFile.as_str());
        let json_path = config_dir.join(RelocatePath::ConfigFileJson.as_str());

        let path = if toml_path.is_file() {
            toml_path
        } else if json_path.is_file() {
            json_path
        } else {
            return Err(Error::ConfigNotFound {
                path: toml_path.to_native(),
            });
        };

        tracing::debug!(%path, "Loading configuration");
        let config: RelocateConfig = ConfigStore::new().load(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config to the project's TOML config path.
    pub fn save(&self, project_root: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(&Self::path_for(project_root), self)?;
        Ok(())
    }

    /// Reject values the workflow cannot operate with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::InvalidConfig {
                message: message.to_string(),
            })
        };

        if self.manifest.path.trim().is_empty() {
            return invalid("manifest.path must not be empty");
        }
        if self.manifest.package_filter.is_empty() {
            return invalid("manifest.package_filter must not be empty");
        }
        if self.manifest.file_marker.is_empty() {
            return invalid("manifest.file_marker must not be empty");
        }
        if self.manifest.backup_suffix.is_empty() {
            return invalid("manifest.backup_suffix must not be empty");
        }
        if self.packages.destination.trim().is_empty() {
            return invalid("packages.destination must not be empty");
        }
        if self.packages.source_prefix.is_empty() {
            return invalid("packages.source_prefix must not be empty");
        }
        if self.operator.identity.trim().is_empty() {
            return invalid("operator.identity must not be empty");
        }
        for entry in &self.packages.allowlist {
            let normalized = NormalizedPath::new(entry);
            if entry.is_empty()
                || normalized.is_absolute()
                || normalized.as_str().split('/').any(|part| part == "..")
            {
                return Err(Error::InvalidConfig {
                    message: format!("packages.allowlist entry {:?} must be a relative name", entry),
                });
            }
        }
        Ok(())
    }

    /// Resolve every configured location against `project_root`.
    pub fn layout(&self, project_root: &NormalizedPath) -> Result<ProjectLayout> {
        let manifest = NormalizedPath::new(&self.manifest.path).resolve_against(project_root);
        let manifest_backup = manifest.with_suffix(&self.manifest.backup_suffix);
        let destination_root =
            NormalizedPath::new(&self.packages.destination).resolve_against(project_root);

        let state_dir = match &self.state.dir {
            Some(dir) => NormalizedPath::new(dir).resolve_against(project_root),
            None => dirs::data_local_dir()
                .map(|dir| NormalizedPath::new(dir).join(RelocatePath::StateDirName.as_str()))
                .ok_or_else(|| Error::InvalidConfig {
                    message: "no local data directory available; set [state] dir".to_string(),
                })?,
        };

        // Destination must stay inside the project so it can be imported
        destination_root.relative_to(project_root)?;

        Ok(ProjectLayout {
            project_root: project_root.clone(),
            ledger_file: state_dir.join(RelocatePath::LedgerFile.as_str()),
            session_file: state_dir.join(RelocatePath::SessionFile.as_str()),
            manifest,
            manifest_backup,
            destination_root,
            state_dir,
        })
    }
}
