//! Source file scanner for discovering Rust files.
//!
//! This module recursively scans a directory for Rust source files,
//! optionally respecting `.gitignore` patterns, and applies a glob filter.

use crate::error::{CliError, CliResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering Rust source files.
#[derive(Debug)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,

    /// Optional glob filter pattern.
    filter: Option<glob::Pattern>,
}

impl SourceScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Set a glob filter pattern for files.
    ///
    /// Only files whose path relative to the root matches are included.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan the directory and return all discovered Rust files, sorted by path.
    pub fn scan(&self) -> CliResult<Vec<SourceFile>> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let mut files = Vec::new();
        for path in self.walk()? {
            if path.extension().map_or(true, |ext| ext != "rs") {
                continue;
            }

            let relative = self.relative_path(&path);
            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path(&relative) {
                    continue;
                }
            }

            let content = std::fs::read_to_string(&path).map_err(|e| ScanError::Io {
                path: path.clone(),
                source: e,
            })?;

            files.push(SourceFile {
                path,
                relative_path: relative,
                content,
            });
        }

        if files.is_empty() {
            return Err(ScanError::no_rust_files(self.root.clone()).into());
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(root = %self.root.display(), files = files.len(), "sources scanned");
        Ok(files)
    }

    /// Scan without failing on empty results.
    pub fn scan_allow_empty(&self) -> CliResult<Vec<SourceFile>> {
        match self.scan() {
            Ok(files) => Ok(files),
            Err(CliError::Scan(ScanError::NoRustFiles { .. })) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Every regular file below the root.
    fn walk(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut paths = Vec::new();

        if self.respect_gitignore {
            let walker = WalkBuilder::new(&self.root)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .require_git(false)
                .hidden(false)
                .build();

            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    paths.push(entry.into_path());
                }
            }
        } else {
            for entry in WalkDir::new(&self.root) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    paths.push(entry.into_path());
                }
            }
        }

        Ok(paths)
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
