//! Template generator for the CLI.
//!
//! Works out which files to produce from the output path and configured
//! format, then renders every one of them from a single distillation.

use crate::config::Config;
use crate::error::{CliError, CliResult, ConfigError};
use rs2cfg::{Generator, OutputFormat, SchemaProvider};
use std::path::{Path, PathBuf};

/// Where a template goes and in which format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Destination file; `None` means stdout.
    pub path: Option<PathBuf>,

    /// Template format.
    pub format: OutputFormat,
}

/// A rendered template with its destination.
#[derive(Debug, Clone)]
pub struct GeneratedTemplate {
    pub target: OutputTarget,
    pub content: String,
}

/// Decide the templates to produce.
///
/// - no output path: one template on stdout, in `format` or TOML
/// - a path with a known extension: that format, `format` is ignored
/// - a path without an extension: `format`, or every format, each with
///   its extension appended
///
/// An unknown extension is an error.
pub fn plan_targets(out: Option<&Path>, format: Option<OutputFormat>) -> CliResult<Vec<OutputTarget>> {
    let Some(path) = out else {
        return Ok(vec![OutputTarget {
            path: None,
            format: format.unwrap_or(OutputFormat::Toml),
        }]);
    };

    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            let format = OutputFormat::from_extension(&ext).ok_or_else(|| {
                ConfigError::invalid_value(
                    "output",
                    format!("unknown template extension '.{}', expected jsonc, toml, yaml or yml", ext),
                )
            })?;
            Ok(vec![OutputTarget {
                path: Some(path.to_path_buf()),
                format,
            }])
        }
        None => {
            let formats = match format {
                Some(format) => vec![format],
                None => OutputFormat::ALL.to_vec(),
            };
            Ok(formats
                .into_iter()
                .map(|format| OutputTarget {
                    path: Some(path.with_extension(format.extension())),
                    format,
                })
                .collect())
        }
    }
}

impl GeneratedTemplate {
    /// Compare the template with the file at its target path.
    ///
    /// A missing file is stale; line endings and trailing whitespace are
    /// not significant.
    pub fn check(&self) -> CliResult<()> {
        let path = self.target.path.as_deref().ok_or_else(|| {
            CliError::Validation("an output path is required to validate a template".to_string())
        })?;

        let stale = || CliError::Stale {
            path: path.to_path_buf(),
        };
        let existing = match std::fs::read_to_string(path) {
            Ok(existing) => existing,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(stale()),
            Err(e) => return Err(e.into()),
        };

        if normalize(&existing) == normalize(&self.content) {
            Ok(())
        } else {
            Err(stale())
        }
    }
}

fn normalize(text: &str) -> String {
    text.lines().map(str::trim_end).collect::<Vec<_>>().join("\n").trim_end().to_string()
}

/// Template generator driven by the CLI configuration.
pub struct TemplateGenerator {
    config: Config,
}

impl TemplateGenerator {
    /// Create a new template generator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Targets for the configured output path and format.
    pub fn targets(&self) -> CliResult<Vec<OutputTarget>> {
        plan_targets(self.config.generate.output.as_deref(), self.config.format()?)
    }

    /// Render `type_name` for every target.
    pub fn generate<P>(&self, provider: &P, type_name: &str) -> CliResult<Vec<GeneratedTemplate>>
    where
        P: SchemaProvider + ?Sized,
    {
        let targets = self.targets()?;
        let formats: Vec<OutputFormat> = targets.iter().map(|t| t.format).collect();

        // Doc types and indent are shared; generate_all swaps the format per target.
        let options = self.config.render_options(formats[0])?;
        let rendered = Generator::new(options).generate_all(provider, type_name, &formats)?;

        Ok(targets
            .into_iter()
            .zip(rendered)
            .map(|(target, (_, content))| GeneratedTemplate { target, content })
            .collect())
    }
}
