//! Candidate discovery for atse
//!
//! This module provides the ProjectSource trait and its filesystem
//! implementation, used by the resolver to enumerate and read descriptor
//! candidates, plus the path normalization every other module relies on.

use crate::core::error::{AtseError, Result};
use globset::GlobBuilder;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Directories never descended into while looking for candidates
const HYGIENE_DIRS: &[&str] = &[".git", "node_modules", "bower_components", "typings", "dist"];

/// Normalize path separators for cross-platform compatibility.
/// - Converts Windows backslashes to forward slashes
/// - Strips Windows UNC prefix `\\?\` if present
pub fn normalize_path_separators(path: &str) -> String {
    let mut normalized = path.to_string();

    // Strip Windows UNC prefix (\\?\ or \\.\)
    if normalized.starts_with(r"\\?\") || normalized.starts_with(r"\\.\") {
        normalized = normalized[4..].to_string();
    }

    normalized.replace('\\', "/")
}

/// Normalize a path string: unify separators, collapse repeated separators,
/// drop `.` segments and resolve `..` against the preceding segment.
///
/// Leading `/` is preserved, trailing `/` is dropped. An empty result is `.`.
pub fn normalize_path(path: &str) -> String {
    let unified = normalize_path_separators(path);
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// A file selected by the candidate glob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Path on disk
    pub path: PathBuf,
    /// Normalized path relative to the project root
    pub relative: String,
    /// Size in bytes
    pub size: u64,
}

/// Source of descriptor candidates
///
/// This trait allows for mocking in tests and alternative implementations
/// (e.g., in-memory editor buffers).
#[cfg_attr(test, automock)]
pub trait ProjectSource {
    /// Enumerate files under `root` matching `glob`, sorted by relative path
    fn candidates(&self, root: &Path, glob: &str) -> Result<Vec<CandidateFile>>;

    /// Read a candidate's full text
    fn read(&self, path: &Path) -> std::io::Result<String>;
}

/// Filesystem-backed candidate source
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProjectSource;

impl FsProjectSource {
    pub fn new() -> Self {
        Self
    }

    /// Leading directory of a glob that contains no glob syntax
    fn glob_base(pattern: &str) -> &str {
        let meta = pattern
            .find(|c| matches!(c, '*' | '?' | '[' | '{'))
            .unwrap_or(pattern.len());
        match pattern[..meta].rfind('/') {
            Some(idx) => &pattern[..idx],
            None => "",
        }
    }

    fn is_hygiene_excluded(name: &str) -> bool {
        HYGIENE_DIRS.contains(&name)
    }
}

impl ProjectSource for FsProjectSource {
    fn candidates(&self, root: &Path, glob: &str) -> Result<Vec<CandidateFile>> {
        if !root.is_dir() {
            return Err(AtseError::NoProjectRoot {
                path: root.to_path_buf(),
            });
        }

        let matcher = GlobBuilder::new(glob)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        let start = root.join(Self::glob_base(glob));
        if !start.is_dir() {
            tracing::debug!("candidate directory {} does not exist", start.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = walkdir::WalkDir::new(&start)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir()
                        && Self::is_hygiene_excluded(&e.file_name().to_string_lossy()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("walk error: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = normalize_path_separators(
                &entry
                    .path()
                    .strip_prefix(root)
                    .unwrap_or(entry.path())
                    .to_string_lossy(),
            );
            if !matcher.is_match(&relative) {
                continue;
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(CandidateFile {
                path: entry.path().to_path_buf(),
                relative,
                size,
            });
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    fn read(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}
