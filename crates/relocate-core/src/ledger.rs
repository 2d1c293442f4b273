//! Path ledger
//!
//! Single-slot record of the package paths taken out of the manifest by the
//! last embed. It lives in the state directory, outside the project, so it
//! survives the host reimporting or reloading the project.

use relocate_fs::{NormalizedPath, io};

use crate::{Error, Result};

/// One path per line in a text file at a fixed location.
#[derive(Debug, Clone)]
pub struct PathLedger {
    path: NormalizedPath,
}

impl PathLedger {
    pub fn new(path: NormalizedPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace any previous ledger with `paths`.
    pub fn save<S: AsRef<str>>(&self, paths: &[S]) -> Result<()> {
        io::remove_file_if_exists(&self.path)?;

        let mut content = String::new();
        for path in paths {
            content.push_str(path.as_ref());
            content.push('\n');
        }
        io::write_text(&self.path, &content)?;

        tracing::debug!(ledger = %self.path, count = paths.len(), "Saved package paths");
        Ok(())
    }

    /// Read the recorded paths in file order.
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.exists() {
            return Err(Error::LedgerNotFound {
                path: self.path.to_native(),
            });
        }
        let content = io::read_text(&self.path)?;
        Ok(content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}
