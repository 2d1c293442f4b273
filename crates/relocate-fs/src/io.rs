//! Atomic I/O operations and tree copies

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers observe either the old or the
/// new content, never a partial file.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;
    drop(temp_file);

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(source: &NormalizedPath, dest: &NormalizedPath) -> Result<()> {
    let dest_native = dest.to_native();
    if let Some(parent) = dest_native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(source.to_native(), &dest_native).map_err(|e| Error::io(source.to_native(), e))?;
    Ok(())
}

/// Recursively copy the directory `source` to `dest`.
///
/// Returns the number of files copied. Symlinks are not followed.
pub fn copy_tree(source: &NormalizedPath, dest: &NormalizedPath) -> Result<usize> {
    let source_native = source.to_native();
    let dest_native = dest.to_native();
    let mut copied = 0;

    for entry in WalkDir::new(&source_native).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Walk {
            path: source_native.clone(),
            message: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(&source_native)
            .map_err(|e| Error::Walk {
                path: entry.path().to_path_buf(),
                message: e.to_string(),
            })?;
        let target = dest_native.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(entry.path(), e))?;
            copied += 1;
        }
    }

    tracing::debug!(from = %source, to = %dest, files = copied, "Copied directory tree");
    Ok(copied)
}

/// Copy `source` to `dest`, recursing when it is a directory.
pub fn copy_file_or_dir(source: &NormalizedPath, dest: &NormalizedPath) -> Result<usize> {
    if source.is_dir() {
        copy_tree(source, dest)
    } else {
        copy_file(source, dest)?;
        Ok(1)
    }
}

/// Delete a file, treating "already gone" as success.
///
/// Returns whether a file was removed.
pub fn remove_file_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_file(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native_path, e)),
    }
}

/// Delete a directory tree, treating "already gone" as success.
///
/// Returns whether anything was removed.
pub fn remove_dir_all_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    match fs::remove_dir_all(&native_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(native_path, e)),
    }
}

/// Create a directory and all missing parents.
pub fn create_dir_all(path: &NormalizedPath) -> Result<()> {
    let native_path = path.to_native();
    fs::create_dir_all(&native_path).map_err(|e| Error::io(native_path, e))
}

/// Names of the directories directly inside `path`, sorted.
///
/// A missing `path` yields an empty list.
pub fn subdirectory_names(path: &NormalizedPath) -> Result<Vec<String>> {
    let native_path = path.to_native();
    let entries = match fs::read_dir(&native_path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(native_path, e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native_path, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}
