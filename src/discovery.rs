//! Discovery Module
//!
//! Recursively finds Kotlin files under a source root and parses them into
//! symbol trees for the processor.

use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{GenerateError, Result};
use crate::scanner::scan_source;
use crate::symbols::SourceFile;

/// Recursively find all .kt files in a directory, in a stable order.
pub fn find_kotlin_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .flatten()
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "kt") {
            files.push(path.to_path_buf());
        }
    }

    files
}

/// `path` relative to `root`, `/`-separated. This is the file identity used
/// for dependencies and fingerprints, so it must not depend on the platform.
pub fn logical_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Read and scan one file.
pub fn parse_source_file(root: &Path, path: &Path) -> Result<(SourceFile, String)> {
    let source = fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    let file = scan_source(&logical_path(root, path), &source)?;
    Ok((file, source))
}

/// Scan every Kotlin file under `root`.
pub fn scan_directory(root: &Path) -> Result<Vec<SourceFile>> {
    find_kotlin_files(root)
        .iter()
        .map(|path| parse_source_file(root, path).map(|(file, _)| file))
        .collect()
}
