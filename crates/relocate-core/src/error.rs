//! Error types for relocate-core

use std::path::PathBuf;

/// Result type for relocate-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad failure classes reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required file is missing or a guard file already exists
    PreconditionViolation,
    /// A manifest line could not be parsed
    ParseError,
    /// The filesystem already holds something we refuse to overwrite
    FilesystemConflict,
    /// Configuration or derived values are invalid
    Validation,
    /// An external host command failed
    External,
    /// Underlying I/O or serialization failure
    Io,
}

/// Errors that can occur in relocate-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Dependency manifest is missing
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// A matching manifest line has no well-formed `file:` path
    #[error("Malformed package entry on manifest line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// A manifest backup is already present
    #[error("Manifest backup already exists at {path}; un-embed first or remove it manually")]
    BackupExists { path: PathBuf },

    /// No manifest backup to restore from
    #[error("Manifest backup does not exist at {path}")]
    BackupMissing { path: PathBuf },

    /// The path ledger is missing on resume
    #[error("Package path ledger not found at {path}")]
    LedgerNotFound { path: PathBuf },

    /// A ledger entry points at a directory that does not exist
    #[error("Package source directory not found: {path}")]
    PackageSourceMissing { path: PathBuf },

    /// A package destination directory is already present
    #[error("Target directory already exists, aborting: {path}")]
    DestinationExists { path: PathBuf },

    /// A ledger path does not map to a destination directory name
    #[error("Cannot derive a package directory name from {path} using source prefix {prefix:?}")]
    InvalidPackagePath { path: String, prefix: String },

    /// A configured host hook failed
    #[error("Hook '{event}' ({command}) failed: {message}")]
    HookFailed {
        event: String,
        command: String,
        message: String,
    },

    /// Filesystem error from relocate-fs
    #[error(transparent)]
    Fs(#[from] relocate_fs::Error),
}

impl Error {
    /// Classify this error for reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ManifestNotFound { .. }
            | Self::BackupExists { .. }
            | Self::BackupMissing { .. }
            | Self::LedgerNotFound { .. }
            | Self::PackageSourceMissing { .. } => ErrorKind::PreconditionViolation,
            Self::ManifestParse { .. } => ErrorKind::ParseError,
            Self::DestinationExists { .. } => ErrorKind::FilesystemConflict,
            Self::InvalidConfig { .. } | Self::InvalidPackagePath { .. } => ErrorKind::Validation,
            Self::HookFailed { .. } => ErrorKind::External,
            Self::Fs(_) => ErrorKind::Io,
        }
    }
}
