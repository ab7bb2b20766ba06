//! Error types for distillation and rendering.
//!
//! Every failure is fatal for the current generation: errors propagate
//! immediately and no partial output is produced.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Top-level error returned by the [`Generator`](crate::Generator).
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The schema could not be distilled.
    #[error("Failed to distill schema: {0}")]
    Distill(#[from] DistillError),

    /// The template could not be rendered.
    #[error("Failed to render template: {0}")]
    Render(#[from] RenderError),
}

/// Error raised while walking declared types.
#[derive(Debug, Error)]
pub enum DistillError {
    /// The declaration of a type cannot be located.
    #[error("Cannot resolve type '{type_name}': {reason}")]
    SchemaResolution { type_name: String, reason: String },

    /// A field cannot be attributed to a single identifier or declaration.
    #[error("Ambiguous field '{field}' in '{type_name}': {reason}")]
    AmbiguousField {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Source code that cannot be parsed.
    #[error("Syntax error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Malformed `#[config(...)]` or `#[serde(...)]` attribute.
    #[error("Invalid attribute on '{type_name}': {message}")]
    Attribute { type_name: String, message: String },

    /// A field type that has no configuration representation.
    #[error("Unsupported type '{ty}' for field '{field}' in '{type_name}'")]
    UnsupportedType {
        type_name: String,
        field: String,
        ty: String,
    },

    /// Types reference each other in a loop.
    #[error("Circular type reference: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },
}

/// Error raised while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A referenced type is neither a scalar, an enum, nor a registered struct.
    #[error("Cannot lookup structure {type_name}")]
    StructLookup { type_name: String },

    /// An array or map field is marked as embedded.
    #[error("Field '{field}' of array or map type cannot be embedded")]
    EmbeddedCollection { field: String },

    /// The zero-value resolver was handed a type it has no literal for.
    #[error("Unhandled zero value for type {type_name}")]
    UnhandledZeroValue { type_name: String },

    /// A default value does not match the field layout.
    #[error("Default for field '{field}' is not {expected}")]
    DefaultMismatch { field: String, expected: String },

    /// A string literal could not be encoded.
    #[error("Failed to encode literal: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DistillError {
    /// Create a schema resolution error.
    pub fn resolution(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaResolution {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an ambiguous field error.
    pub fn ambiguous(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::AmbiguousField {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a syntax error with location information.
    pub fn parse(file: PathBuf, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file,
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an attribute error.
    pub fn attribute(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attribute {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported(
        type_name: impl Into<String>,
        field: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            field: field.into(),
            ty: ty.into(),
        }
    }
}

impl RenderError {
    /// Create a struct lookup error.
    pub fn lookup(type_name: impl ToString) -> Self {
        Self::StructLookup {
            type_name: type_name.to_string(),
        }
    }

    /// Create a default mismatch error.
    pub fn mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::DefaultMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }
}
