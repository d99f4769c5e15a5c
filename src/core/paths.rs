//! Path utilities
//!
//! Survex references are written with either separator and may omit the
//! `.svx` extension; these helpers turn them into real paths.

use std::path::{Path, PathBuf};

/// Conventional Survex source extension
pub const SVX_EXTENSION: &str = "svx";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Append `extension` when the file name has none
pub fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}

/// Clean up an include argument: collapse whitespace, drop quotes, use '/' separators
pub fn include_target(argument: &str) -> String {
    argument
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches('"')
        .replace('\\', "/")
}

/// Resolve an include argument against the directory of the including file
pub fn resolve_include(including_file: &Path, argument: &str, extension: &str) -> PathBuf {
    let target = include_target(argument);
    let dir = including_file.parent().unwrap_or_else(|| Path::new(""));
    with_default_extension(&dir.join(target), extension)
}

/// Make a path absolute without touching the filesystem
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}
