//! Package copier
//!
//! Copies the allowlisted parts of a package into the project and removes
//! them again. Every copied entry brings its `.meta` sidecar along because
//! the host keys imported assets by those files.

use relocate_fs::{NormalizedPath, RelocatePath, io};

use crate::{Error, Result};

/// Entries copied from a package when the config does not override them
pub const DEFAULT_ALLOWLIST: &[&str] = &[
    // files
    "package.json",
    "CHANGELOG.md",
    "GETTING STARTED.md",
    "README.md",
    "TODO.md",
    // directories
    "Editor",
    "Runtime",
];

/// Copies allowlisted package entries plus their sidecars.
#[derive(Debug, Clone)]
pub struct PackageCopier {
    allowlist: Vec<String>,
}

impl Default for PackageCopier {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST.iter().map(|s| s.to_string()).collect())
    }
}

impl PackageCopier {
    pub fn new(allowlist: Vec<String>) -> Self {
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &[String] {
        &self.allowlist
    }

    /// Copy every allowlisted entry of `source` into the new directory
    /// `destination`.
    ///
    /// Returns the entries that were present and copied. Fails if
    /// `destination` already exists rather than merging into it.
    pub fn copy_into(&self, source: &NormalizedPath, destination: &NormalizedPath) -> Result<Vec<String>> {
        if !source.is_dir() {
            return Err(Error::PackageSourceMissing {
                path: source.to_native(),
            });
        }
        if destination.exists() {
            return Err(Error::DestinationExists {
                path: destination.to_native(),
            });
        }

        tracing::info!(from = %source, to = %destination, "Copying package");
        io::create_dir_all(destination)?;

        let meta = RelocatePath::MetaSuffix.as_str();
        let mut copied = Vec::new();

        for entry in &self.allowlist {
            let from = source.join(entry);
            if !from.exists() {
                tracing::debug!(%entry, "Not present in package, skipping");
                continue;
            }
            let to = destination.join(entry);
            io::copy_file_or_dir(&from, &to)?;

            let from_meta = from.with_suffix(meta);
            if from_meta.is_file() {
                io::copy_file(&from_meta, &to.with_suffix(meta))?;
            }
            copied.push(entry.clone());
        }

        Ok(copied)
    }

    /// Empty `root`, keep it as an empty directory, and drop its own sidecar.
    ///
    /// The sidecar goes too: the host remembers a deleted directory through
    /// it even after the directory is recreated.
    pub fn delete_tree(&self, root: &NormalizedPath) -> Result<()> {
        if io::remove_dir_all_if_exists(root)? {
            tracing::info!(%root, "Deleted embedded packages");
        }
        io::create_dir_all(root)?;
        io::remove_file_if_exists(&root.with_suffix(RelocatePath::MetaSuffix.as_str()))?;
        Ok(())
    }
}
