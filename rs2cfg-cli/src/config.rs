//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `rs2cfg.toml` files
//! and merging it with command-line arguments.

use crate::error::{CliResult, ConfigError};
use rs2cfg::distiller::RenameRule;
use rs2cfg::{DocTypesMode, OutputFormat, RenderOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "rs2cfg.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template generation settings.
    pub generate: GenerateConfig,

    /// Source discovery settings.
    pub source: SourceConfig,

    /// Naming conventions.
    pub naming: NamingConfig,
}

/// Template generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Format used for stdout and for output paths without an extension.
    pub format: Option<String>,

    /// Which fields get their type in the doc comment (none, basic, all).
    pub doc_types: String,

    /// Spaces per nesting level in YAML output.
    pub indent_size: usize,

    /// Output path. The extension selects the format.
    pub output: Option<PathBuf>,
}

/// Source discovery settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory scanned for Rust sources.
    pub input: PathBuf,

    /// Glob restricting the scanned files, relative to `input`.
    pub filter: Option<String>,

    /// Whether `.gitignore` files are honoured while scanning.
    pub respect_gitignore: bool,
}

/// Naming convention configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Field rename convention for structs that declare none.
    pub rename_all: Option<String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            format: None,
            doc_types: "none".to_string(),
            indent_size: 2,
            output: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            filter: None,
            respect_gitignore: true,
        }
    }
}

impl Config {
    /// Explicitly configured format, if any.
    pub fn format(&self) -> CliResult<Option<OutputFormat>> {
        match &self.generate.format {
            None => Ok(None),
            Some(format) => format
                .parse()
                .map(Some)
                .map_err(|message| ConfigError::invalid_value("generate.format", message).into()),
        }
    }

    /// Doc types mode.
    pub fn doc_types(&self) -> CliResult<DocTypesMode> {
        self.generate
            .doc_types
            .parse()
            .map_err(|message| ConfigError::invalid_value("generate.doc_types", message).into())
    }

    /// Fallback rename rule.
    pub fn rename_all(&self) -> CliResult<Option<RenameRule>> {
        match &self.naming.rename_all {
            None => Ok(None),
            Some(rule) => rule
                .parse()
                .map(Some)
                .map_err(|_| {
                    ConfigError::invalid_value(
                        "naming.rename_all",
                        format!("unknown rename rule '{}'", rule),
                    )
                    .into()
                }),
        }
    }

    /// Render options for `format`, with the configured doc types and indent.
    pub fn render_options(&self, format: OutputFormat) -> CliResult<RenderOptions> {
        if self.generate.indent_size == 0 {
            return Err(ConfigError::invalid_value(
                "generate.indent_size",
                "must be at least 1",
            )
            .into());
        }

        Ok(RenderOptions::new(format)
            .with_doc_types(self.doc_types()?)
            .with_indent_size(self.generate.indent_size))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without a path the default `rs2cfg.toml` is tried, and its absence
    /// yields the default configuration. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config = Self::parse(&config_path, &content)?;
        tracing::debug!(path = %config_path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration text; `path` is used for error messages.
    pub fn parse(path: &Path, content: &str) -> CliResult<Config> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::invalid_toml(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref input) = args.input {
            config.source.input = input.clone();
        }

        if let Some(ref filter) = args.filter {
            config.source.filter = Some(filter.clone());
        }

        if let Some(ref output) = args.output {
            config.generate.output = Some(output.clone());
        }

        if let Some(ref format) = args.format {
            config.generate.format = Some(format.clone());
        }

        if let Some(ref doc_types) = args.doc_types {
            config.generate.doc_types = doc_types.clone();
        }

        if let Some(indent_size) = args.indent_size {
            config.generate.indent_size = indent_size;
        }

        if let Some(ref rename_all) = args.rename_all {
            config.naming.rename_all = Some(rename_all.clone());
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# rs2cfg configuration file

[generate]
# Format written to stdout, and to output paths without an extension
# (jsonc, toml or yaml). Unset: toml on stdout, all three formats otherwise.
# format = "toml"

# Field types shown in doc comments: none, basic (scalar fields) or all
doc_types = "none"

# Spaces per nesting level in YAML templates
indent_size = 2

# Output path; the extension selects the format
# output = "config.toml"

[source]
# Directory scanned for Rust source files
input = "."

# Only scan files matching this glob, relative to input
# filter = "src/config/**"

# Skip files ignored by .gitignore
respect_gitignore = true

[naming]
# Rename convention for structs without #[serde(rename_all)] or
# #[config(rename_all)] (camelCase, snake_case, PascalCase,
# SCREAMING_SNAKE_CASE, kebab-case)
# rename_all = "kebab-case"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Input directory override.
    pub input: Option<PathBuf>,

    /// Filter override.
    pub filter: Option<String>,

    /// Output path override.
    pub output: Option<PathBuf>,

    /// Format override.
    pub format: Option<String>,

    /// Doc types override.
    pub doc_types: Option<String>,

    /// YAML indent override.
    pub indent_size: Option<usize>,

    /// Rename all override.
    pub rename_all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generate.format, None);
        assert_eq!(config.generate.doc_types, "none");
        assert_eq!(config.generate.indent_size, 2);
        assert_eq!(config.generate.output, None);
        assert_eq!(config.source.input, PathBuf::from("."));
        assert!(config.source.respect_gitignore);
        assert_eq!(config.naming.rename_all, None);
    }

    #[test]
    fn test_default_config_content_matches_defaults() {
        let config = ConfigManager::parse(
            Path::new(CONFIG_FILENAME),
            ConfigManager::default_config_content(),
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_cli_args() {
        let args = CliArgs {
            output: Some(PathBuf::from("app.yaml")),
            doc_types: Some("all".to_string()),
            indent_size: Some(4),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(merged.generate.output, Some(PathBuf::from("app.yaml")));
        assert_eq!(merged.generate.doc_types, "all");
        assert_eq!(merged.generate.indent_size, 4);
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = ConfigManager::parse(
            Path::new("rs2cfg.toml"),
            "[source]\ninput = \"crates/app\"\n",
        )
        .unwrap();

        let merged = ConfigManager::merge_cli_args(config.clone(), &CliArgs::default());
        assert_eq!(merged, config);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[generate]
format = "yaml"
doc_types = "basic"
indent_size = 4
output = "config/app.yaml"

[source]
input = "./service"
filter = "src/**"
respect_gitignore = false

[naming]
rename_all = "kebab-case"
"#;

        let config = ConfigManager::parse(Path::new("rs2cfg.toml"), toml).unwrap();
        assert_eq!(config.format().unwrap(), Some(OutputFormat::Yaml));
        assert_eq!(config.doc_types().unwrap(), DocTypesMode::Basic);
        assert_eq!(config.generate.output, Some(PathBuf::from("config/app.yaml")));
        assert_eq!(config.source.input, PathBuf::from("./service"));
        assert_eq!(config.source.filter.as_deref(), Some("src/**"));
        assert!(!config.source.respect_gitignore);
        assert_eq!(config.rename_all().unwrap(), Some(RenameRule::KebabCase));

        let options = config.render_options(OutputFormat::Yaml).unwrap();
        assert_eq!(options.indent_size, 4);
        assert_eq!(options.doc_types, DocTypesMode::Basic);
    }

    #[test]
    fn test_invalid_values() {
        let config = ConfigManager::merge_cli_args(
            Config::default(),
            &CliArgs {
                format: Some("ini".to_string()),
                doc_types: Some("some".to_string()),
                rename_all: Some("Title Case".to_string()),
                ..Default::default()
            },
        );

        assert!(matches!(
            config.format(),
            Err(CliError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(config.doc_types().is_err());
        assert!(config.rename_all().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ConfigManager::parse(Path::new("rs2cfg.toml"), "[generate\n").unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::InvalidToml { .. })));
    }

    #[test]
    fn test_explicit_missing_config() {
        let err = ConfigManager::load(Some(Path::new("/nonexistent/rs2cfg.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound { .. })));
    }
}
