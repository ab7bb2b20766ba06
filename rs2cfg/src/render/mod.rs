//! Template renderers.
//!
//! Every output format implements the same four-operation [`Renderer`]
//! contract over the schema model:
//!
//! - [`Renderer::render_struct`] - a struct and, recursively, everything it holds
//! - [`Renderer::render_array`] - a sequence field
//! - [`Renderer::render_map`] - a map field
//! - [`Renderer::render_element`] - one element of a sequence or map
//!
//! Renderers borrow a [`GenerationSession`] and hold no per-call state; the
//! position inside the document travels in an explicit [`Frame`].

pub mod common;
mod jsonc;
pub mod strings;
mod toml;
mod yaml;

pub use self::jsonc::JsoncRenderer;
pub use self::toml::TomlRenderer;
pub use self::yaml::YamlRenderer;

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;
use crate::registry::GenerationSession;
use crate::schema::{FieldDescriptor, FieldLayout, StructDescriptor, TypeRef};
use common::FieldKind;

/// Result type alias for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Which fields get their type written in the doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocTypesMode {
    /// Never show types.
    #[default]
    None,
    /// Show types of scalar fields only.
    Basic,
    /// Show types of every field.
    All,
}

impl DocTypesMode {
    /// Whether the doc block of `field` starts with its type.
    pub fn shows_type(self, field: &FieldDescriptor, kind: &FieldKind<'_>) -> bool {
        match self {
            DocTypesMode::None => false,
            DocTypesMode::All => true,
            DocTypesMode::Basic => {
                field.layout == FieldLayout::Single && matches!(kind, FieldKind::Scalar(_))
            }
        }
    }
}

impl FromStr for DocTypesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(DocTypesMode::None),
            "basic" => Ok(DocTypesMode::Basic),
            "all" => Ok(DocTypesMode::All),
            other => Err(format!(
                "unknown doc types mode '{}', expected none, basic or all",
                other
            )),
        }
    }
}

impl fmt::Display for DocTypesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocTypesMode::None => "none",
            DocTypesMode::Basic => "basic",
            DocTypesMode::All => "all",
        };
        f.write_str(s)
    }
}

/// Target file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Jsonc,
    Toml,
    Yaml,
}

impl OutputFormat {
    /// All supported formats.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jsonc, OutputFormat::Toml, OutputFormat::Yaml];

    /// Select a format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jsonc" => Some(OutputFormat::Jsonc),
            "toml" => Some(OutputFormat::Toml),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jsonc => "jsonc",
            OutputFormat::Toml => "toml",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| {
            format!("unknown format '{}', expected jsonc, toml or yaml", s)
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options controlling a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub doc_types: DocTypesMode,
    /// Spaces per nesting level, YAML only.
    pub indent_size: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Toml,
            doc_types: DocTypesMode::None,
            indent_size: 2,
        }
    }
}

impl RenderOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_doc_types(mut self, mode: DocTypesMode) -> Self {
        self.doc_types = mode;
        self
    }

    pub fn with_indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    /// Build the renderer for the selected format.
    pub fn renderer<'s>(&self, session: &'s GenerationSession) -> Box<dyn Renderer + 's> {
        match self.format {
            OutputFormat::Jsonc => Box::new(JsoncRenderer::new(session, self.doc_types)),
            OutputFormat::Toml => Box::new(TomlRenderer::new(session, self.doc_types)),
            OutputFormat::Yaml => Box::new(YamlRenderer::new(
                session,
                self.doc_types,
                self.indent_size,
            )),
        }
    }
}

/// Position of a value inside the document being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Dotted path of rendered keys, empty at the root.
    pub path: String,
    /// Whether the value is an item of an array.
    pub in_array: bool,
}

impl Frame {
    /// Frame of the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Frame of a value stored under `key`.
    pub fn child(&self, key: &str) -> Self {
        let path = if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        };
        Self {
            path,
            in_array: false,
        }
    }

    /// Frame of an item of the array at this position.
    pub fn item(&self) -> Self {
        Self {
            path: self.path.clone(),
            in_array: true,
        }
    }
}

/// The rendering contract shared by all formats.
pub trait Renderer {
    /// Render a struct and every nested or embedded struct recursively.
    ///
    /// `embedded` suppresses the enclosing delimiter or section header;
    /// `parent_shadowing` lists names that suppress fields of an inlined struct.
    fn render_struct(
        &self,
        descriptor: &StructDescriptor,
        defaults: Option<&Value>,
        indent: &str,
        embedded: bool,
        parent_shadowing: &[String],
        frame: &Frame,
    ) -> RenderResult<String>;

    /// Render a sequence field. A `null` item renders the element's placeholder.
    fn render_array(
        &self,
        field: &FieldDescriptor,
        values: &[Value],
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String>;

    /// Render a map field in insertion order.
    fn render_map(
        &self,
        field: &FieldDescriptor,
        map: &Map<String, Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String>;

    /// Render one element of a sequence or map.
    fn render_element(
        &self,
        element: &TypeRef,
        value: Option<&Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String>;
}
