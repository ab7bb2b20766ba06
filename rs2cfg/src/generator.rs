//! Template generation entry point.

use crate::distiller::{Distiller, SchemaProvider};
use crate::error::{GenerateResult, RenderError};
use crate::registry::GenerationSession;
use crate::render::{Frame, OutputFormat, RenderOptions};
use crate::schema::TypeIdentity;

/// Generates configuration templates for a root type.
///
/// Every call distills into a fresh [`GenerationSession`], so a generator can
/// be reused across providers and types.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: RenderOptions,
}

impl Generator {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Distill `type_name` from `provider` and render it.
    pub fn generate<P>(&self, provider: &P, type_name: &str) -> GenerateResult<String>
    where
        P: SchemaProvider + ?Sized,
    {
        let mut session = GenerationSession::new();
        let root = Distiller::new(provider, &mut session).distill(type_name)?;
        self.render(&session, &root)
    }

    /// Distill once and render every requested format.
    pub fn generate_all<P>(
        &self,
        provider: &P,
        type_name: &str,
        formats: &[OutputFormat],
    ) -> GenerateResult<Vec<(OutputFormat, String)>>
    where
        P: SchemaProvider + ?Sized,
    {
        let mut session = GenerationSession::new();
        let root = Distiller::new(provider, &mut session).distill(type_name)?;

        formats
            .iter()
            .map(|&format| {
                let generator = Generator::new(RenderOptions {
                    format,
                    ..self.options
                });
                generator.render(&session, &root).map(|text| (format, text))
            })
            .collect()
    }

    /// Render an already distilled root struct.
    ///
    /// Non-empty output always ends with a newline. A YAML document without
    /// fields is written as `{}`.
    pub fn render(&self, session: &GenerationSession, root: &TypeIdentity) -> GenerateResult<String> {
        let descriptor = session
            .structs
            .get(root)
            .ok_or_else(|| RenderError::lookup(root))?;

        let renderer = self.options.renderer(session);
        let mut text = renderer.render_struct(
            descriptor,
            descriptor.defaults.as_ref(),
            "",
            false,
            &[],
            &Frame::root(),
        )?;

        if text.trim().is_empty() {
            text = match self.options.format {
                OutputFormat::Yaml => "{}".to_string(),
                _ => String::new(),
            };
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }

        tracing::debug!(
            root = %root,
            format = %self.options.format,
            bytes = text.len(),
            "template rendered"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distiller::{SourceSchemaProvider, StaticSchemaProvider};
    use crate::error::GenerateError;
    use crate::schema::StructDescriptor;

    const SOURCE: &str = r#"
        /// Server settings.
        pub struct Config {
            /// Listen port.
            pub port: u16,
        }
        impl Default for Config {
            fn default() -> Self {
                Self { port: 8080 }
            }
        }
    "#;

    #[test]
    fn test_generate_each_format() {
        let provider = SourceSchemaProvider::from_source(SOURCE).unwrap();

        let jsonc = Generator::new(RenderOptions::new(OutputFormat::Jsonc))
            .generate(&provider, "Config")
            .unwrap();
        assert_eq!(jsonc, "{\n\t// Listen port.\n\t\"port\": 8080\n}\n");

        let toml = Generator::new(RenderOptions::new(OutputFormat::Toml))
            .generate(&provider, "Config")
            .unwrap();
        assert_eq!(toml, "# Listen port.\nport = 8080\n");

        let yaml = Generator::new(RenderOptions::new(OutputFormat::Yaml))
            .generate(&provider, "Config")
            .unwrap();
        assert_eq!(yaml, "# Listen port.\nport: 8080\n");
    }

    #[test]
    fn test_generate_all_distills_once() {
        let provider = SourceSchemaProvider::from_source(SOURCE).unwrap();
        let outputs = Generator::default()
            .generate_all(&provider, "Config", &OutputFormat::ALL)
            .unwrap();

        let formats: Vec<_> = outputs.iter().map(|(f, _)| *f).collect();
        assert_eq!(formats, OutputFormat::ALL.to_vec());
        assert!(outputs.iter().all(|(_, text)| text.contains("8080")));
    }

    #[test]
    fn test_empty_root() {
        let provider = StaticSchemaProvider::new()
            .with_struct(StructDescriptor::new(TypeIdentity::new("", "Empty")));

        let render = |format| {
            Generator::new(RenderOptions::new(format))
                .generate(&provider, "Empty")
                .unwrap()
        };

        assert_eq!(render(OutputFormat::Jsonc), "{\n}\n");
        assert_eq!(render(OutputFormat::Toml), "");
        assert_eq!(render(OutputFormat::Yaml), "{}\n");
    }

    #[test]
    fn test_unknown_type_is_a_distill_error() {
        let provider = SourceSchemaProvider::from_source(SOURCE).unwrap();
        let err = Generator::default().generate(&provider, "Nope").unwrap_err();
        assert!(matches!(err, GenerateError::Distill(_)));
    }

    #[test]
    fn test_render_unregistered_root() {
        let session = GenerationSession::new();
        let err = Generator::default()
            .render(&session, &TypeIdentity::new("", "Config"))
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Render(RenderError::StructLookup { .. })
        ));
    }
}
