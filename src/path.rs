//! Pure path-string helpers.
//!
//! The engine's path vocabulary is slash-normalized strings: backslashes
//! are treated as directory separators and rewritten, trailing separators
//! are trimmed. Nothing here touches the filesystem.

/// Rewrite backslash separators to forward slashes and trim trailing
/// slashes.
#[must_use]
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_end_matches('/').to_string()
}

/// Like [`normalize`], then terminate with exactly one slash.
///
/// Directory paths are slash-terminated throughout the engine so a
/// relative segment can be appended without further checks.
#[must_use]
pub fn normalize_dir(path: &str) -> String {
    let mut dir = normalize(path);
    dir.push('/');
    dir
}
