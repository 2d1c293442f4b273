//! Durable session flags and the resume decision
//!
//! The resume flag has to outlive the reload that embed phase 1 requests, so
//! it is kept in a small TOML key/value file in the state directory rather
//! than in memory.

use std::collections::BTreeMap;

use relocate_fs::{ConfigStore, NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Key of the flag that schedules embed phase 2
pub const CONTINUE_EMBED_KEY: &str = "continue_embed";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

/// Boolean key/value store persisted to a TOML file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: NormalizedPath,
}

impl SessionStore {
    pub fn new(path: NormalizedPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    fn read(&self) -> Result<SessionFile> {
        if !self.path.is_file() {
            return Ok(SessionFile::default());
        }
        Ok(ConfigStore::new().load(&self.path)?)
    }

    fn write(&self, file: &SessionFile) -> Result<()> {
        if file.flags.is_empty() {
            io::remove_file_if_exists(&self.path)?;
            return Ok(());
        }
        ConfigStore::new().save(&self.path, file)?;
        Ok(())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.read()?.flags.get(key).copied().unwrap_or(default))
    }

    pub fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        let mut file = self.read()?;
        file.flags.insert(key.to_string(), value);
        self.write(&file)
    }

    /// Remove `key`; returns whether it was present.
    pub fn erase_bool(&self, key: &str) -> Result<bool> {
        let mut file = self.read()?;
        let removed = file.flags.remove(key).is_some();
        if removed {
            self.write(&file)?;
        }
        Ok(removed)
    }
}

/// Persisted descriptor of a resumable embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeState {
    /// Whether phase 2 is scheduled
    pub pending: bool,
    /// Where phase 2 reads its package paths from
    pub ledger: NormalizedPath,
}

/// What a process start must do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupAction {
    Nothing,
    ResumeEmbed,
}

impl StartupAction {
    pub fn decide(state: &ResumeState) -> Self {
        if state.pending {
            Self::ResumeEmbed
        } else {
            Self::Nothing
        }
    }
}
