//! Idempotent filesystem primitives.
//!
//! The four operations the installer guards: create-directory-chain,
//! copy-directory-tree, conditional-file-write, empty-directory-recursively.
//! None of them are transactional — a copy that fails partway leaves a
//! partially populated destination and no rollback is attempted.

use std::fs;
use std::path::Path;

use crate::error::OpError;
use crate::path::{normalize, normalize_dir};
use crate::walk::{EntryKind, walk};

/// Create `dir` and any missing parents, shallow to deep.
///
/// Re-invoking on an existing directory chain is a no-op success.
///
/// # Errors
///
/// Returns [`OpError::Conflict`] if a prefix of the chain exists but is
/// not a directory, and [`OpError::Io`] if a directory cannot be created.
pub fn make_dir_chain(dir: &str) -> Result<(), OpError> {
    let dir = normalize(dir);
    let mut prefix = String::new();

    for part in dir.split('/') {
        if part.is_empty() {
            // Leading slash of an absolute path.
            prefix.push('/');
            continue;
        }
        prefix.push_str(part);

        let probe = Path::new(&prefix);
        if probe.exists() {
            if !probe.is_dir() {
                return Err(OpError::Conflict(format!(
                    "path `{prefix}` already exists and is not a dir"
                )));
            }
        } else {
            fs::create_dir(probe).map_err(|source| OpError::io(&prefix, source))?;
            tracing::debug!("created directory `{prefix}`");
        }
        prefix.push('/');
    }
    Ok(())
}

/// Mirror `source` into `destination`.
///
/// The destination is reset first: created when absent, emptied when
/// present. The copy never merges — after success the destination's
/// contents exactly mirror the source tree, which also makes repeated
/// identical invocations idempotent. Symlinks are followed (see [`walk`]).
///
/// # Errors
///
/// Returns [`OpError::NotFound`] if `source` is missing or not a
/// directory, plus any error from resetting the destination or copying
/// entries.
pub fn copy_tree(source: &str, destination: &str) -> Result<(), OpError> {
    let source = normalize_dir(source);
    let destination = normalize_dir(destination);

    let src = Path::new(&source);
    if !src.exists() || !src.is_dir() {
        return Err(OpError::NotFound(
            "source dir not found or is not a dir".to_string(),
        ));
    }

    if Path::new(&destination).exists() {
        empty_tree(&destination)?;
    } else {
        make_dir_chain(&destination)?;
    }

    let entries = walk(&source)?;
    for entry in &entries {
        let Some(rel) = entry.path.strip_prefix(source.as_str()) else {
            continue;
        };
        let target = format!("{destination}{rel}");
        match entry.kind {
            EntryKind::Dir => {
                fs::create_dir(target.trim_end_matches('/'))
                    .map_err(|source| OpError::io(&target, source))?;
            }
            EntryKind::File => {
                fs::copy(&entry.path, &target).map_err(|source| OpError::io(&target, source))?;
            }
        }
    }
    tracing::debug!(
        "copied {} entries from `{source}` to `{destination}`",
        entries.len()
    );
    Ok(())
}

/// Overwrite `path` with `contents`, but only when a file already exists
/// there.
///
/// Returns `true` when the write happened and `false` when the path was
/// absent (the complementary no-op case).
///
/// # Errors
///
/// Returns [`OpError::Conflict`] when the path exists but is not a plain
/// file, and [`OpError::Io`] when the write fails.
pub fn write_file_if_exists(path: &str, contents: &[u8]) -> Result<bool, OpError> {
    let probe = Path::new(path);
    if !probe.exists() {
        return Ok(false);
    }
    if !probe.is_file() {
        return Err(OpError::Conflict(
            "it is not a file under given uri".to_string(),
        ));
    }
    fs::write(probe, contents).map_err(|source| OpError::io(path, source))?;
    Ok(true)
}

/// Create `path` with `contents`, but only when no file exists there yet.
///
/// Returns `false` without touching the filesystem when the path is
/// already occupied by a plain file.
///
/// # Errors
///
/// Returns [`OpError::Conflict`] when the path is occupied by something
/// other than a plain file, and [`OpError::Io`] when the write fails.
pub fn write_file_if_absent(path: &str, contents: &[u8]) -> Result<bool, OpError> {
    let probe = Path::new(path);
    if probe.exists() {
        if probe.is_file() {
            return Ok(false);
        }
        return Err(OpError::Conflict(
            "uri is already taken by something other than a file".to_string(),
        ));
    }
    fs::write(probe, contents).map_err(|source| OpError::io(path, source))?;
    Ok(true)
}

/// Delete every descendant of `dir`, children before the directories that
/// contain them, leaving `dir` itself present but empty.
///
/// # Errors
///
/// Returns [`OpError::NotFound`] if `dir` does not exist, and
/// [`OpError::Io`] if a deletion fails.
pub fn empty_tree(dir: &str) -> Result<(), OpError> {
    let dir = normalize_dir(dir);
    let entries = walk(&dir)?;

    // Reverse walk order guarantees a directory is only removed after all
    // of its children are gone.
    for entry in entries.iter().rev() {
        match entry.kind {
            EntryKind::File => {
                fs::remove_file(&entry.path).map_err(|source| OpError::io(&entry.path, source))?;
            }
            EntryKind::Dir => {
                fs::remove_dir(entry.path.trim_end_matches('/'))
                    .map_err(|source| OpError::io(&entry.path, source))?;
            }
        }
    }
    tracing::debug!("emptied {} entries under `{dir}`", entries.len());
    Ok(())
}
