//! Dependency manifest store
//!
//! The manifest is handled as plain lines of text rather than parsed JSON:
//! relocation only ever removes whole lines and must leave every other byte
//! of the file alone.

use relocate_fs::{NormalizedPath, io};

use crate::config::{ManifestSection, ProjectLayout};
use crate::{Error, Result};

/// Terminator of a single manifest line, as found in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineEnding {
    Lf,
    CrLf,
    /// Last line of a file without a final newline
    Missing,
}

impl LineEnding {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Missing => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    ending: LineEnding,
}

/// A manifest split into lines, each remembering its own terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestText {
    lines: Vec<Line>,
}

impl ManifestText {
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = content;

        while !rest.is_empty() {
            let (raw, ending, next) = match rest.find('\n') {
                Some(idx) => match rest[..idx].strip_suffix('\r') {
                    Some(text) => (text, LineEnding::CrLf, &rest[idx + 1..]),
                    None => (&rest[..idx], LineEnding::Lf, &rest[idx + 1..]),
                },
                None => (rest, LineEnding::Missing, ""),
            };
            lines.push(Line {
                text: raw.to_string(),
                ending,
            });
            rest = next;
        }

        Self { lines }
    }

    /// Line contents without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    /// Insert `line` before the 0-based position `index` (clamped to the end).
    ///
    /// The new line takes the terminator of its nearest terminated neighbour,
    /// preferring the line above.
    pub fn insert_line(&mut self, index: usize, line: impl Into<String>) {
        let index = index.min(self.lines.len());
        let ending = self.lines[..index]
            .iter()
            .rev()
            .chain(&self.lines[index..])
            .map(|line| line.ending)
            .find(|ending| *ending != LineEnding::Missing)
            .unwrap_or(LineEnding::Lf);

        let mut new_line = Line {
            text: line.into(),
            ending,
        };
        if index == self.lines.len() {
            if let Some(last) = self.lines.last_mut() {
                if last.ending == LineEnding::Missing {
                    last.ending = ending;
                    new_line.ending = LineEnding::Missing;
                }
            }
        }
        self.lines.insert(index, new_line);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.text);
            out.push_str(line.ending.as_str());
        }
        out
    }
}

/// A package entry pulled out of the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    /// 1-based line number in the manifest it was read from
    pub line: usize,
    /// The full manifest line, verbatim
    pub entry: String,
    /// Path found after the `file:` marker
    pub path: String,
}

/// Outcome of splitting a manifest into package lines and the rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub references: Vec<PackageReference>,
    pub remaining: ManifestText,
}

/// Pull the path out of `line`: the text between the last `marker` and the
/// next double quote.
pub fn extract_path(line: &str, marker: &str) -> std::result::Result<String, String> {
    let start = line
        .rfind(marker)
        .map(|idx| idx + marker.len())
        .ok_or_else(|| format!("missing {} marker", marker))?;
    let rest = &line[start..];
    let end = rest
        .find('"')
        .ok_or_else(|| format!("no closing quote after {} marker", marker))?;
    let path = &rest[..end];
    if path.trim().is_empty() {
        return Err(format!("empty path after {} marker", marker));
    }
    Ok(path.to_string())
}

/// Split `text` into the lines containing `filter` and everything else.
///
/// Nothing is written; a malformed line fails the whole pass.
pub fn partition(text: &ManifestText, filter: &str, marker: &str) -> Result<Extraction> {
    let mut references = Vec::new();
    let mut remaining = Vec::with_capacity(text.lines.len());

    for (idx, line) in text.lines.iter().enumerate() {
        if !line.text.contains(filter) {
            remaining.push(line.clone());
            continue;
        }
        let path = extract_path(&line.text, marker).map_err(|message| Error::ManifestParse {
            line: idx + 1,
            message,
        })?;
        references.push(PackageReference {
            line: idx + 1,
            entry: line.text.clone(),
            path,
        });
    }

    Ok(Extraction {
        references,
        remaining: ManifestText { lines: remaining },
    })
}

/// Reads, rewrites, backs up and restores the dependency manifest.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    manifest: NormalizedPath,
    backup: NormalizedPath,
    filter: String,
    marker: String,
}

impl ManifestStore {
    pub fn new(
        manifest: NormalizedPath,
        backup: NormalizedPath,
        filter: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            manifest,
            backup,
            filter: filter.into(),
            marker: marker.into(),
        }
    }

    pub fn from_config(section: &ManifestSection, layout: &ProjectLayout) -> Self {
        Self::new(
            layout.manifest.clone(),
            layout.manifest_backup.clone(),
            &section.package_filter,
            &section.file_marker,
        )
    }

    pub fn manifest_path(&self) -> &NormalizedPath {
        &self.manifest
    }

    pub fn backup_path(&self) -> &NormalizedPath {
        &self.backup
    }

    pub fn has_backup(&self) -> bool {
        self.backup.exists()
    }

    fn read_manifest(&self) -> Result<ManifestText> {
        if !self.manifest.is_file() {
            return Err(Error::ManifestNotFound {
                path: self.manifest.to_native(),
            });
        }
        Ok(ManifestText::parse(&io::read_text(&self.manifest)?))
    }

    /// Package references currently in the manifest, in manifest order.
    ///
    /// Read-only; fails on the same malformed lines as
    /// [`ManifestStore::extract_and_remove_matching`].
    pub fn matching_references(&self) -> Result<Vec<PackageReference>> {
        let text = self.read_manifest()?;
        Ok(partition(&text, &self.filter, &self.marker)?.references)
    }

    /// Remove every package line from the manifest and return its references
    /// in manifest order.
    ///
    /// The file is only rewritten when something matched.
    pub fn extract_and_remove_matching(&self) -> Result<Vec<PackageReference>> {
        let text = self.read_manifest()?;
        let extraction = partition(&text, &self.filter, &self.marker)?;

        if extraction.references.is_empty() {
            tracing::info!(filter = %self.filter, "No matching packages in manifest");
            return Ok(Vec::new());
        }

        io::write_text(&self.manifest, &extraction.remaining.render())?;
        for reference in &extraction.references {
            tracing::info!(line = reference.line, path = %reference.path, "Removed package from manifest");
        }
        Ok(extraction.references)
    }

    /// Copy the manifest to the backup path.
    ///
    /// An existing backup means a previous embed was never undone; it is
    /// left untouched and the call fails.
    pub fn backup(&self) -> Result<()> {
        if self.backup.exists() {
            return Err(Error::BackupExists {
                path: self.backup.to_native(),
            });
        }
        if !self.manifest.is_file() {
            return Err(Error::ManifestNotFound {
                path: self.manifest.to_native(),
            });
        }
        io::copy_file(&self.manifest, &self.backup)?;
        tracing::info!(backup = %self.backup, "Backed up manifest");
        Ok(())
    }

    /// Replace the manifest with the backup and delete the backup.
    ///
    /// The live file is swapped in with an atomic rename, so it never goes
    /// missing; the backup is removed only afterwards.
    pub fn restore_from_backup(&self) -> Result<()> {
        if !self.backup.is_file() {
            return Err(Error::BackupMissing {
                path: self.backup.to_native(),
            });
        }
        let content = io::read_bytes(&self.backup)?;
        io::write_atomic(&self.manifest, &content)?;
        io::remove_file_if_exists(&self.backup)?;
        tracing::info!(manifest = %self.manifest, "Restored manifest from backup");
        Ok(())
    }
}
