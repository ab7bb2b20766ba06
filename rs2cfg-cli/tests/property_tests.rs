//! Property-based tests for rs2cfg-cli.
//!
//! Properties tested:
//! - File discovery completeness
//! - Filter pattern correctness
//! - Module namespaces follow file paths
//! - Config override precedence
//! - Output target planning
//! - Dry run safety
//! - Validation correctness

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use rs2cfg::OutputFormat;
use rs2cfg_cli::{
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    generator::{plan_targets, TemplateGenerator},
    parser::RustParser,
    scanner::SourceScanner,
    writer::FileWriter,
};

// =============================================================================
// Generators for property tests
// =============================================================================

/// Generate a module name; `lib`, `main` and `mod` files add no segment.
fn arb_module() -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_filter("crate root file", |s| !matches!(s.as_str(), "lib" | "main" | "mod"))
}

/// Generate a struct name.
fn arb_type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,8}".prop_filter("keyword", |s| s != "Self")
}

/// Source declaring `Settings` with a port default.
fn settings_source(port: u16) -> String {
    format!(
        r#"
/// Settings.
pub struct Settings {{
    /// Listen port.
    pub port: u16,
}}

impl Default for Settings {{
    fn default() -> Self {{
        Self {{ port: {} }}
    }}
}}
"#,
        port
    )
}

/// Create a directory with the given files.
fn create_test_directory(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full_path = dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
    dir
}

fn generate_settings(dir: &Path, output: PathBuf) -> Vec<rs2cfg_cli::GeneratedTemplate> {
    let config = ConfigManager::merge_cli_args(
        Config::default(),
        &CliArgs {
            input: Some(dir.to_path_buf()),
            output: Some(output),
            ..Default::default()
        },
    );
    let files = SourceScanner::new(dir).scan().unwrap();
    let (provider, _) = RustParser::new().parse_files(&files);
    TemplateGenerator::new(config)
        .generate(&provider, "Settings")
        .unwrap()
}

// =============================================================================
// File Discovery Completeness
//
// For any directory tree, the scanner finds every .rs file and nothing else.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_file_discovery_completeness(
        modules in prop::collection::btree_set(arb_module(), 1..6),
        depth in 1usize..4,
    ) {
        let dir = TempDir::new().unwrap();
        let mut expected = BTreeSet::new();

        for (i, module) in modules.iter().enumerate() {
            let subdir: Vec<String> = (0..(i % depth)).map(|j| format!("dir{}", j)).collect();
            let mut relative: PathBuf = subdir.iter().collect();
            relative.push(format!("{}.rs", module));

            let full_path = dir.path().join(&relative);
            fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            fs::write(&full_path, "pub struct Unit;").unwrap();
            expected.insert(relative);
        }

        fs::write(dir.path().join("README.md"), "# Test").unwrap();
        fs::write(dir.path().join("rs2cfg.toml"), "[generate]").unwrap();

        let files = SourceScanner::new(dir.path()).scan().unwrap();
        let found: BTreeSet<PathBuf> = files.into_iter().map(|f| f.relative_path).collect();

        prop_assert_eq!(found, expected);
    }
}

// =============================================================================
// Filter Pattern Correctness
//
// For any split of files between two directories, a filter on one directory
// keeps exactly its files.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_filter_pattern_correctness(
        matching_count in 1usize..5,
        non_matching_count in 1usize..5,
    ) {
        let dir = TempDir::new().unwrap();

        for i in 0..matching_count {
            let path = dir.path().join(format!("src/config/part{}.rs", i));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "pub struct Part;").unwrap();
        }
        for i in 0..non_matching_count {
            let path = dir.path().join(format!("src/other{}.rs", i));
            fs::write(&path, "pub struct Other;").unwrap();
        }

        let files = SourceScanner::new(dir.path())
            .with_filter("src/config/*.rs")
            .unwrap()
            .scan()
            .unwrap();

        prop_assert_eq!(files.len(), matching_count);
        for file in &files {
            prop_assert!(file.relative_path.starts_with("src/config"));
        }
    }
}

// =============================================================================
// Module Namespaces Follow File Paths
//
// For any module path, a struct declared in src/<a>/<b>.rs or
// src/<a>/<b>/mod.rs is identified as a::b::Name.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_namespace_follows_path(
        modules in prop::collection::vec(arb_module(), 1..4),
        name in arb_type_name(),
        as_mod_rs in any::<bool>(),
    ) {
        let mut relative = PathBuf::from("src");
        if as_mod_rs {
            relative.extend(&modules);
            relative.push("mod.rs");
        } else {
            let (last, parents) = modules.split_last().unwrap();
            relative.extend(parents);
            relative.push(format!("{}.rs", last));
        }

        let source = format!("pub struct {} {{ pub id: u32 }}", name);
        let dir = create_test_directory(&[(relative.to_str().unwrap(), &source)]);

        let files = SourceScanner::new(dir.path()).scan().unwrap();
        let (provider, errors) = RustParser::new().parse_files(&files);
        prop_assert!(errors.is_empty());

        let expected = format!("{}::{}", modules.join("::"), name);
        prop_assert_eq!(provider.type_names(), vec![expected]);
    }
}

// =============================================================================
// Config Override Precedence
//
// For any file configuration and any subset of CLI overrides, a set CLI
// value wins and an unset one keeps the file value.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_config_override_precedence(
        file_indent in 1usize..8,
        cli_indent in prop::option::of(1usize..8),
        file_doc_types in prop::sample::select(vec!["none", "basic", "all"]),
        cli_doc_types in prop::option::of(prop::sample::select(vec!["none", "basic", "all"])),
        cli_format in prop::option::of(prop::sample::select(vec!["jsonc", "toml", "yaml"])),
    ) {
        let toml = format!(
            "[generate]\nformat = \"toml\"\ndoc_types = \"{}\"\nindent_size = {}\n",
            file_doc_types, file_indent
        );
        let config = ConfigManager::parse(Path::new("rs2cfg.toml"), &toml).unwrap();

        let args = CliArgs {
            indent_size: cli_indent,
            doc_types: cli_doc_types.map(str::to_string),
            format: cli_format.map(str::to_string),
            ..Default::default()
        };
        let merged = ConfigManager::merge_cli_args(config, &args);

        prop_assert_eq!(merged.generate.indent_size, cli_indent.unwrap_or(file_indent));
        prop_assert_eq!(
            merged.generate.doc_types.as_str(),
            cli_doc_types.unwrap_or(file_doc_types)
        );
        prop_assert_eq!(
            merged.format().unwrap(),
            Some(cli_format.unwrap_or("toml").parse::<OutputFormat>().unwrap())
        );
    }
}

// =============================================================================
// Output Target Planning
//
// For any output stem without an extension, one target per requested format
// is planned, each path carrying that format's extension.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_extensionless_output_targets(
        stem in "[a-z][a-z0-9_]{0,10}",
        format in prop::option::of(prop::sample::select(OutputFormat::ALL.to_vec())),
    ) {
        let out = PathBuf::from("conf").join(&stem);
        let targets = plan_targets(Some(out.as_path()), format).unwrap();

        let expected: Vec<OutputFormat> = match format {
            Some(format) => vec![format],
            None => OutputFormat::ALL.to_vec(),
        };
        prop_assert_eq!(targets.len(), expected.len());

        for (target, format) in targets.iter().zip(expected) {
            prop_assert_eq!(target.format, format);
            prop_assert_eq!(
                target.path.clone(),
                Some(out.with_extension(format.extension()))
            );
        }
    }

    #[test]
    fn prop_extension_selects_format(
        stem in "[a-z][a-z0-9_]{0,10}",
        ext in prop::sample::select(vec!["jsonc", "toml", "yaml", "yml", "JSONC"]),
        format in prop::option::of(prop::sample::select(OutputFormat::ALL.to_vec())),
    ) {
        let out = PathBuf::from(format!("{}.{}", stem, ext));
        let targets = plan_targets(Some(out.as_path()), format).unwrap();

        prop_assert_eq!(targets.len(), 1);
        prop_assert_eq!(Some(targets[0].format), OutputFormat::from_extension(ext));
        prop_assert_eq!(targets[0].path.as_deref(), Some(out.as_path()));
    }
}

// =============================================================================
// Dry Run Safety
//
// For any template, a dry run never touches the file system.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_dry_run_safety(port in any::<u16>()) {
        let dir = create_test_directory(&[("src/lib.rs", &settings_source(port))]);
        let out_dir = TempDir::new().unwrap();

        let templates = generate_settings(dir.path(), out_dir.path().join("settings"));
        let writer = FileWriter::new(true);
        for template in &templates {
            let result = writer.write_template(template).unwrap();
            prop_assert!(!result.was_written());
        }

        prop_assert_eq!(fs::read_dir(out_dir.path()).unwrap().count(), 0);
    }
}

// =============================================================================
// Validation Correctness
//
// For any defaults, a freshly written template validates, and it goes stale
// once the declared default changes.
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_validation_correctness(port in any::<u16>(), new_port in any::<u16>()) {
        let dir = create_test_directory(&[("src/lib.rs", &settings_source(port))]);
        let out_dir = TempDir::new().unwrap();
        let output = out_dir.path().join("settings");

        let writer = FileWriter::new(false);
        for template in generate_settings(dir.path(), output.clone()) {
            writer.write_template(&template).unwrap();
        }
        for template in generate_settings(dir.path(), output.clone()) {
            prop_assert!(template.check().is_ok());
        }

        fs::write(dir.path().join("src/lib.rs"), settings_source(new_port)).unwrap();
        for template in generate_settings(dir.path(), output.clone()) {
            let result = template.check();
            if new_port == port {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(matches!(result, Err(CliError::Stale { .. })), "{:?}", result);
            }
        }
    }
}
