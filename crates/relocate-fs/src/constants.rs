//! Fixed file and directory names used by relocate.

use std::path::Path;

/// Well-known names relocate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocatePath {
    /// The `.relocate` directory at the project root
    ConfigDir,
    /// `config.toml` inside [`RelocatePath::ConfigDir`]
    ConfigFile,
    /// `config.json`, accepted when no TOML config exists
    ConfigFileJson,
    /// Suffix of the sidecar metadata file next to every copied entry
    MetaSuffix,
    /// Ledger file inside the state directory
    LedgerFile,
    /// Session flag store inside the state directory
    SessionFile,
    /// Name of the default state directory under the user's data dir
    StateDirName,
}

impl RelocatePath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => ".relocate",
            Self::ConfigFile => "config.toml",
            Self::ConfigFileJson => "config.json",
            Self::MetaSuffix => ".meta",
            Self::LedgerFile => "package-paths.txt",
            Self::SessionFile => "session.toml",
            Self::StateDirName => "relocate",
        }
    }
}

impl AsRef<Path> for RelocatePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RelocatePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RelocatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
