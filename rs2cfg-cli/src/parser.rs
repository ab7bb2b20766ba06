//! Rust source parser for building a schema provider.
//!
//! Every scanned file is parsed with `syn` and indexed under the module
//! namespace implied by its path, so `src/net/tls.rs` declares `net::tls::*`.

use crate::scanner::SourceFile;
use rs2cfg::distiller::{namespace_for_path, RenameRule, SourceSchemaProvider};
use rs2cfg::DistillError;

/// Parser for Rust source files.
#[derive(Debug, Default)]
pub struct RustParser {
    /// Rename rule for structs that declare none.
    rename_all: Option<RenameRule>,
}

impl RustParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback rename rule.
    pub fn with_rename_all(mut self, rule: Option<RenameRule>) -> Self {
        self.rename_all = rule;
        self
    }

    /// Parse multiple source files, collecting errors.
    ///
    /// A file that fails to parse is left out of the provider; the others
    /// are still indexed.
    pub fn parse_files(&self, sources: &[SourceFile]) -> (SourceSchemaProvider, Vec<DistillError>) {
        let mut provider = SourceSchemaProvider::new().with_rename_all(self.rename_all);
        let mut errors = Vec::new();

        for source in sources {
            let namespace = namespace_for_path(&source.relative_path);
            if let Err(e) = provider.add_source(&namespace, &source.path, &source.content) {
                errors.push(e);
            }
        }

        tracing::debug!(
            files = sources.len(),
            types = provider.type_names().len(),
            errors = errors.len(),
            "sources parsed"
        );
        (provider, errors)
    }
}

/// Format a parse error for display.
pub fn format_parse_error(error: &DistillError) -> String {
    match error {
        DistillError::Parse {
            file,
            line,
            column,
            message,
        } => format!("{}:{}:{}: {}", file.display(), line, column, message),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rs2cfg::distiller::SchemaProvider;
    use std::path::PathBuf;

    fn source(relative: &str, content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/project").join(relative),
            relative_path: PathBuf::from(relative),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_files_are_namespaced_by_path() {
        let (provider, errors) = RustParser::new().parse_files(&[
            source("src/lib.rs", "pub struct Config { pub remote: net::Remote }"),
            source("src/net/mod.rs", "pub struct Remote { pub addr: String }"),
            source("src/net/tls.rs", "pub struct Tls { pub cert: String }"),
        ]);

        assert!(errors.is_empty());
        assert_eq!(
            provider.type_names(),
            vec!["Config", "net::Remote", "net::tls::Tls"]
        );
    }

    #[test]
    fn test_parse_files_collects_errors() {
        let (provider, errors) = RustParser::new().parse_files(&[
            source("valid.rs", "pub struct Valid { pub name: String }"),
            source("invalid.rs", "struct Invalid { name String }"),
        ]);

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], DistillError::Parse { .. }));
        assert!(format_parse_error(&errors[0]).starts_with("/project/invalid.rs:1:"));
        assert_eq!(provider.locate("Valid").unwrap().to_string(), "valid::Valid");
    }

    #[test]
    fn test_rename_all_is_applied() {
        let (provider, _) = RustParser::new()
            .with_rename_all(Some(RenameRule::KebabCase))
            .parse_files(&[source(
                "lib.rs",
                r#"
                #[derive(Default)]
                pub struct Config { pub log_level: String }
                "#,
            )]);

        let out = rs2cfg::Generator::default()
            .generate(&provider, "Config")
            .unwrap();
        assert_eq!(out, "log-level = ''\n");
    }
}
