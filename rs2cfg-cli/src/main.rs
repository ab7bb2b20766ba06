//! # rs2cfg
//!
//! Generate commented configuration templates from the Rust types that
//! describe a configuration.
//!
//! ## Usage
//!
//! ```bash
//! # Print a TOML template for `Config` declared under ./src
//! rs2cfg generate --type Config
//!
//! # Write a JSONC template; the extension selects the format
//! rs2cfg generate ./crates/server --type ServerConfig --out config.jsonc
//!
//! # Write config.jsonc, config.toml and config.yaml
//! rs2cfg generate --type Config --out config --doc-types basic
//!
//! # Regenerate whenever a source file changes
//! rs2cfg generate --type Config --out config.toml --watch
//!
//! # Initialize configuration
//! rs2cfg init
//!
//! # Check that a committed template is up-to-date
//! rs2cfg validate --type Config --path config.toml
//! ```
//!
//! Progress and diagnostics go to stderr; stdout only carries templates.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rs2cfg::SourceSchemaProvider;
use rs2cfg_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::CliError,
    generator::TemplateGenerator,
    parser::{format_parse_error, RustParser},
    scanner::SourceScanner,
    watcher::FileWatcher,
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "rs2cfg")]
#[command(author, version, about = "Generate configuration templates from Rust types", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a configuration template for a struct
    Generate {
        /// Directory containing the Rust sources [default: .]
        input: Option<PathBuf>,

        /// Root struct, optionally module-qualified (e.g. `net::Settings`)
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Output path; the extension (jsonc, toml, yaml, yml) selects the
        /// format, without one every format is written. Omit for stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Format for stdout and extension-less output paths
        #[arg(short, long)]
        format: Option<String>,

        /// Field types shown in doc comments: none, basic or all
        #[arg(long)]
        doc_types: Option<String>,

        /// Spaces per nesting level in YAML output
        #[arg(long)]
        indent_size: Option<usize>,

        /// Rename convention for structs that declare none
        #[arg(long)]
        rename_all: Option<String>,

        /// Only scan files matching this glob, relative to the input directory
        #[arg(long)]
        filter: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Watch for file changes and regenerate
        #[arg(short, long)]
        watch: bool,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Initialize a new rs2cfg configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that a generated template is up-to-date
    Validate {
        /// Directory containing the Rust sources [default: .]
        input: Option<PathBuf>,

        /// Root struct the template was generated for
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Template to check; without an extension every format is checked.
        /// Defaults to `generate.output` from the configuration.
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Field types shown in doc comments: none, basic or all
        #[arg(long)]
        doc_types: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            input,
            type_name,
            out,
            format,
            doc_types,
            indent_size,
            rename_all,
            filter,
            config,
            watch,
            dry_run,
        } => {
            let args = CliArgs {
                input,
                filter,
                output: out,
                format,
                doc_types,
                indent_size,
                rename_all,
            };
            cmd_generate(&type_name, args, config, watch, dry_run)
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate {
            input,
            type_name,
            path,
            doc_types,
            config,
        } => {
            let args = CliArgs {
                input,
                output: path,
                doc_types,
                ..Default::default()
            };
            cmd_validate(&type_name, args, config)
        }
    }
}

/// Generate command implementation.
fn cmd_generate(
    type_name: &str,
    args: CliArgs,
    config_path: Option<PathBuf>,
    watch: bool,
    dry_run: bool,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &args);

    if watch {
        run_watch_mode(type_name, &config, dry_run)
    } else {
        run_generate(type_name, &config, dry_run)
    }
}

/// Scan and index the configured sources.
fn load_sources(config: &Config) -> Result<SourceSchemaProvider, CliError> {
    let input = &config.source.input;
    eprintln!(
        "{} {}",
        "Scanning for Rust source files in".cyan(),
        input.display()
    );

    let mut scanner = SourceScanner::new(input).with_gitignore(config.source.respect_gitignore);
    if let Some(ref pattern) = config.source.filter {
        scanner = scanner.with_filter(pattern)?;
    }
    let files = scanner.scan()?;
    eprintln!("  Found {} Rust file(s)", files.len().to_string().green());

    let parser = RustParser::new().with_rename_all(config.rename_all()?);
    let (provider, errors) = parser.parse_files(&files);

    if !errors.is_empty() {
        eprintln!("{} {} parse error(s):", "Warning:".yellow(), errors.len());
        for error in &errors {
            eprintln!("  {}", format_parse_error(error));
        }
    }

    eprintln!(
        "  Found {} type(s)",
        provider.type_names().len().to_string().green()
    );
    Ok(provider)
}

/// Run template generation once.
fn run_generate(type_name: &str, config: &Config, dry_run: bool) -> Result<(), CliError> {
    let provider = load_sources(config)?;

    eprintln!("{} {}", "Generating templates for".cyan(), type_name);
    let templates = TemplateGenerator::new(config.clone()).generate(&provider, type_name)?;

    let writer = FileWriter::new(dry_run);
    for template in &templates {
        match writer.write_template(template)? {
            WriteResult::Written { path, bytes } => {
                eprintln!(
                    "{} Written {} bytes to {}",
                    "✓".green(),
                    bytes,
                    path.display()
                );
            }
            WriteResult::Unchanged { path } => {
                eprintln!("{} {} is up-to-date", "✓".green(), path.display());
            }
            WriteResult::Stdout { .. } => {}
            WriteResult::DryRun { content, path } => {
                let destination = path
                    .as_deref()
                    .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
                eprintln!(
                    "{} Would write {} to {}:",
                    "[dry-run]".yellow(),
                    template.target.format,
                    destination
                );
                eprintln!("{}", "─".repeat(60).dimmed());
                print!("{}", content);
                eprintln!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    Ok(())
}

/// Run in watch mode.
fn run_watch_mode(type_name: &str, config: &Config, dry_run: bool) -> Result<(), CliError> {
    let input = &config.source.input;
    eprintln!("{}", "Starting watch mode...".cyan());
    eprintln!("  Watching: {}", input.display());
    eprintln!("  Press Ctrl+C to stop\n");

    // A failed first run is reported like any later one.
    if let Err(e) = run_generate(type_name, config, dry_run) {
        print_error(&e);
    }

    let watcher = FileWatcher::new(input);
    let (_debouncer, rx) = watcher.watch()?;

    eprintln!("\n{}", "Watching for changes...".cyan());

    while let Ok(event) = rx.recv() {
        if let Some(message) = event.error_message() {
            eprintln!("{} {}", "Watch error:".red(), message);
            continue;
        }

        if let Some(path) = event.path() {
            eprintln!("\n{} {}", "File changed:".cyan(), path.display());
        }

        if let Err(e) = run_generate(type_name, config, dry_run) {
            eprintln!("{} {}", "Generation error:".red(), e);
        }

        eprintln!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        eprintln!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        eprintln!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    eprintln!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation.
fn cmd_validate(
    type_name: &str,
    args: CliArgs,
    config_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = ConfigManager::load(config_path.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &args);

    if config.generate.output.is_none() {
        return Err(CliError::Validation(
            "No template to validate: pass --path or set generate.output".to_string(),
        ));
    }

    let provider = load_sources(&config)?;

    eprintln!("{}", "Validating templates...".cyan());
    let templates = TemplateGenerator::new(config).generate(&provider, type_name)?;

    for template in &templates {
        let path = template.target.path.as_deref().unwrap_or(Path::new("-"));
        match template.check() {
            Ok(()) => eprintln!("{} {} is up-to-date", "✓".green(), path.display()),
            Err(e) => {
                if matches!(e, CliError::Stale { .. }) {
                    eprintln!("{} {} is out of date", "✗".red(), path.display());
                    eprintln!("  Run 'rs2cfg generate --type {}' to update", type_name);
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
