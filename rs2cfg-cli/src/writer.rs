//! File writer for generated templates.
//!
//! Templates go to their target file, or to stdout when the target has no
//! path. Dry-run mode reports what would be written instead.

use crate::error::{CliResult, WriteError};
use crate::generator::GeneratedTemplate;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf, bytes: usize },

    /// File already held this content and was left alone.
    Unchanged { path: PathBuf },

    /// Template was printed to stdout.
    Stdout { bytes: usize },

    /// Dry run, nothing was written.
    DryRun {
        content: String,
        path: Option<PathBuf>,
    },
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    /// Create a new file writer.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Write a template to its target.
    pub fn write_template(&self, template: &GeneratedTemplate) -> CliResult<WriteResult> {
        match &template.target.path {
            Some(path) => self.write(path, &template.content),
            None if self.dry_run => Ok(WriteResult::DryRun {
                content: template.content.clone(),
                path: None,
            }),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(template.content.as_bytes())?;
                stdout.flush()?;
                Ok(WriteResult::Stdout {
                    bytes: template.content.len(),
                })
            }
        }
    }

    /// Write content to a file, creating parent directories.
    ///
    /// A file whose content is already identical is not touched, so watch
    /// mode does not retrigger on its own output.
    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: Some(path.to_path_buf()),
            });
        }

        if std::fs::read_to_string(path).is_ok_and(|existing| existing == content) {
            tracing::debug!(path = %path.display(), "template unchanged");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "template written");
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    /// Check if running in dry-run mode.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl WriteResult {
    /// Get the file path associated with this result.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteResult::Written { path, .. } | WriteResult::Unchanged { path } => Some(path),
            WriteResult::DryRun { path, .. } => path.as_deref(),
            WriteResult::Stdout { .. } => None,
        }
    }

    /// Check if a file was actually written.
    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::OutputTarget;
    use rs2cfg::OutputFormat;
    use tempfile::TempDir;

    const CONTENT: &str = "# Listen port.\nport = 8080\n";

    #[test]
    fn test_write_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.toml");

        let result = FileWriter::new(false).write(&path, CONTENT).unwrap();

        assert!(result.was_written());
        assert_eq!(result.path(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONTENT);
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/server.toml");

        FileWriter::new(false).write(&path, CONTENT).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_identical_content_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.toml");
        let writer = FileWriter::new(false);

        writer.write(&path, CONTENT).unwrap();
        let result = writer.write(&path, CONTENT).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));

        let result = writer.write(&path, "port = 9090\n").unwrap();
        assert!(result.was_written());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "port = 9090\n");
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.toml");

        let writer = FileWriter::new(true);
        assert!(writer.is_dry_run());

        let result = writer.write(&path, CONTENT).unwrap();
        assert!(!path.exists());
        match result {
            WriteResult::DryRun { content, path: Some(p) } => {
                assert_eq!(content, CONTENT);
                assert_eq!(p, path);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_dry_run_stdout_template() {
        let template = GeneratedTemplate {
            target: OutputTarget {
                path: None,
                format: OutputFormat::Toml,
            },
            content: CONTENT.to_string(),
        };

        let result = FileWriter::new(true).write_template(&template).unwrap();
        assert!(matches!(result, WriteResult::DryRun { path: None, .. }));
        assert_eq!(result.path(), None);
    }
}
