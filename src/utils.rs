// ABOUTME: Utility functions for the mdpress application
// ABOUTME: Provides path normalization, mirroring helpers and directory validation

use crate::errors::{PublishError, Result};
use std::path::{Component, Path, PathBuf};

/// Strip trailing path separators from a directory flag ("site/" -> "site")
pub fn strip_trailing_separators(raw: &str) -> PathBuf {
    let trimmed = raw.trim_end_matches(|c: char| c == '/' || c == std::path::MAIN_SEPARATOR);
    if trimmed.is_empty() && !raw.is_empty() {
        // The filesystem root is all separators
        return PathBuf::from(&raw[..1]);
    }
    PathBuf::from(trimmed)
}

/// clap value parser wrapper around [`strip_trailing_separators`]
pub fn parse_dir_flag(raw: &str) -> std::result::Result<PathBuf, String> {
    if raw.is_empty() {
        return Err("directory must not be empty".to_string());
    }
    Ok(strip_trailing_separators(raw))
}

/// clap value parser for a single directory name such as `--tool-dir`
pub fn parse_name_flag(raw: &str) -> std::result::Result<String, String> {
    let path = strip_trailing_separators(raw);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Ok(name.to_string_lossy().into_owned()),
        _ => Err(format!("{:?} must be a single directory name, not a path", raw)),
    }
}

/// Drop the extension of the last path segment ("a/b.md" -> "a/b")
pub fn strip_extension(path: &Path) -> PathBuf {
    match path.file_stem() {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

/// Output page path for a source file: extension stripped, `.html` appended
pub fn page_path(rel_source: &Path) -> PathBuf {
    let mut page = strip_extension(rel_source).into_os_string();
    page.push(".html");
    PathBuf::from(page)
}

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PublishError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(PublishError::Validation(format!(
            "Path is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| PublishError::io(path, e))?;
    } else if !path.is_dir() {
        return Err(PublishError::Validation(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Get the absolute path
pub fn get_absolute_path(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| PublishError::io(path, e))
}

/// Name of the first segment of `inner` as seen from `outer`, if `inner` lives inside `outer`.
///
/// Both paths must already be absolute and normalized.
pub fn reflection_name(inner: &Path, outer: &Path) -> Option<String> {
    let rel = inner.strip_prefix(outer).ok()?;
    match rel.components().next()? {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// True if a URL-derived relative path tries to climb out of its root
pub fn escapes_root(rel: &Path) -> bool {
    rel.components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
}
