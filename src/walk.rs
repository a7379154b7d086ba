//! Depth-first directory tree enumeration.

use std::fs;
use std::path::Path;

use crate::error::OpError;
use crate::path::normalize_dir;

/// Kind of a node discovered during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (or anything that is not a directory).
    File,
    /// A directory.
    Dir,
}

/// One filesystem node discovered during a walk.
///
/// Paths are slash-normalized; directory paths are slash-terminated,
/// file paths are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Full path of the node, rooted at the walked directory's path.
    pub path: String,
    /// Whether the node is a file or a directory.
    pub kind: EntryKind,
}

/// List every descendant of `root`, depth-first, pre-order: each directory
/// appears before its own children. The root itself is never included.
///
/// Siblings are sorted by name so two walks of an unchanged tree produce
/// identical listings. Symlinks are followed: a symlink to a directory is
/// listed as a directory and recursed into.
///
/// # Errors
///
/// Returns [`OpError::NotFound`] if `root` does not exist, and
/// [`OpError::Io`] if a directory cannot be read.
pub fn walk(root: &str) -> Result<Vec<TreeEntry>, OpError> {
    let dir = normalize_dir(root);
    if !Path::new(&dir).exists() {
        return Err(OpError::NotFound(format!("dir `{dir}` does not exist")));
    }
    let mut result = Vec::new();
    walk_into(&dir, &mut result)?;
    tracing::debug!("walked {} entries under `{dir}`", result.len());
    Ok(result)
}

fn walk_into(dir: &str, result: &mut Vec<TreeEntry>) -> Result<(), OpError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| OpError::io(dir, source))? {
        let entry = entry.map_err(|source| OpError::io(dir, source))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort_unstable();

    for name in names {
        let path = format!("{dir}{name}");
        if Path::new(&path).is_dir() {
            let listed = format!("{path}/");
            result.push(TreeEntry {
                path: listed.clone(),
                kind: EntryKind::Dir,
            });
            walk_into(&listed, result)?;
        } else {
            result.push(TreeEntry {
                path,
                kind: EntryKind::File,
            });
        }
    }
    Ok(())
}
