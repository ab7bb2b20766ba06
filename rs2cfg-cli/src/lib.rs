//! # rs2cfg-cli
//!
//! CLI library for generating configuration templates from Rust source files.
//!
//! This crate provides the functionality behind the `rs2cfg` binary:
//! source discovery, indexing, template generation and file output.
//!
//! ## Architecture
//!
//! - [`config`] - `rs2cfg.toml` loading and merging with command-line flags
//! - [`scanner`] - Source file discovery and filtering
//! - [`parser`] - Indexing scanned files into a schema provider
//! - [`generator`] - Output planning and template rendering
//! - [`writer`] - File output and dry-run support
//! - [`watcher`] - File system watching for watch mode
//! - [`error`] - Error types and exit codes

pub mod config;
pub mod error;
pub mod generator;
pub mod parser;
pub mod scanner;
pub mod watcher;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{GeneratedTemplate, OutputTarget, TemplateGenerator};
pub use parser::RustParser;
pub use scanner::{SourceFile, SourceScanner};
pub use watcher::FileWatcher;
pub use writer::FileWriter;
