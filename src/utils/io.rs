//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

fn io_error(e: std::io::Error, operation: &str, path: &Path) -> Error {
    Error::internal_io(e.to_string(), Some(format!("{} {}", operation, path.display())))
}

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_error(e, operation, path))
}

/// Read a file that may legitimately be absent.
///
/// Returns `Ok(None)` for a missing file; every other failure is an error.
pub fn read_optional(path: &Path, operation: &str) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(e, operation, path)),
    }
}

/// Write content to file atomically (write to .tmp, then rename).
///
/// Readers always see either the old content or the new content, never a
/// partial write.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;

    let filename = path.file_name().ok_or_else(|| {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    })?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation)))
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::internal_io(e.to_string(), Some(format!("{} (rename)", operation)))
    })?;

    Ok(())
}

/// Save `content` as a backup at `first`, never replacing an earlier one.
///
/// When a file at `first` or one of its numbered siblings (`first.1`,
/// `first.2`, ...) already holds `content`, nothing is written and `None` is
/// returned. Otherwise the content goes to the first free path, which is
/// returned.
pub fn write_backup(first: &Path, content: &str, operation: &str) -> Result<Option<PathBuf>> {
    let mut candidate = first.to_path_buf();
    let mut n = 0;
    while let Some(previous) = read_optional(&candidate, operation)? {
        if previous == content {
            return Ok(None);
        }
        n += 1;
        let mut numbered = first.as_os_str().to_owned();
        numbered.push(format!(".{}", n));
        candidate = PathBuf::from(numbered);
    }

    write_file_atomic(&candidate, content, operation)?;
    Ok(Some(candidate))
}

/// Rename a file or directory.
pub fn rename_path(from: &Path, to: &Path, operation: &str) -> Result<()> {
    fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("{} {} → {}", operation, from.display(), to.display())),
        )
    })
}

pub fn remove_file(path: &Path, operation: &str) -> Result<()> {
    fs::remove_file(path).map_err(|e| io_error(e, operation, path))
}

pub fn ensure_dir(dir: &Path, operation: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| io_error(e, operation, dir))
}
