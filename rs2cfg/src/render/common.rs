//! Rendering utilities shared by all output formats.

use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::registry::GenerationSession;
use crate::schema::{
    EnumDescriptor, FieldDescriptor, FieldLayout, ScalarKind, StructDescriptor, TypeRef,
};

/// Values rendered for an array field without a declared default.
static PLACEHOLDER: [Value; 1] = [Value::Null];

// =============================================================================
// Field classification
// =============================================================================

/// What a field's value type (or element type) resolves to.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind<'a> {
    Scalar(ScalarKind),
    Enum(&'a EnumDescriptor),
    Struct(&'a StructDescriptor),
}

impl FieldKind<'_> {
    /// Scalars and enums render as a single literal.
    pub fn is_simple(&self) -> bool {
        !matches!(self, FieldKind::Struct(_))
    }
}

/// Resolve a type reference against the session registries.
pub fn classify<'a>(
    session: &'a GenerationSession,
    ty: &TypeRef,
) -> Result<FieldKind<'a>, RenderError> {
    match ty {
        TypeRef::Scalar(kind) => Ok(FieldKind::Scalar(*kind)),
        TypeRef::Named(id) => {
            if let Some(e) = session.enums.get(id) {
                Ok(FieldKind::Enum(e))
            } else if let Some(s) = session.structs.get(id) {
                Ok(FieldKind::Struct(s))
            } else {
                Err(RenderError::lookup(id))
            }
        }
    }
}

/// A field is simple when it is a scalar or enum, or an array of those.
pub fn is_simple_field(
    session: &GenerationSession,
    field: &FieldDescriptor,
) -> Result<bool, RenderError> {
    match field.layout {
        FieldLayout::Map => Ok(false),
        FieldLayout::Single | FieldLayout::Array => Ok(classify(session, &field.ty)?.is_simple()),
    }
}

// =============================================================================
// Zero values and literal slots
// =============================================================================

/// Zero literal for a field that has no explicit default.
pub fn zero_value(field: &FieldDescriptor) -> Result<Value, RenderError> {
    match field.layout {
        FieldLayout::Array => Ok(Value::Array(Vec::new())),
        FieldLayout::Map => Ok(Value::Object(Map::new())),
        FieldLayout::Single => match &field.ty {
            TypeRef::Scalar(kind) => Ok(kind.zero_value()),
            TypeRef::Named(id) => Err(RenderError::UnhandledZeroValue {
                type_name: id.to_string(),
            }),
        },
    }
}

/// Value to emit for a scalar or enum slot, falling back to the zero value
/// or the first declared constant.
pub fn slot_value(kind: &FieldKind<'_>, value: Option<&Value>) -> Result<Value, RenderError> {
    match kind {
        FieldKind::Scalar(scalar) => Ok(match value {
            Some(v) => normalize_scalar(*scalar, v),
            None => scalar.zero_value(),
        }),
        FieldKind::Enum(e) => match (value, e.first()) {
            (Some(v), _) => Ok(v.clone()),
            (None, Some(first)) => Ok(first.value.clone()),
            (None, None) => Err(RenderError::UnhandledZeroValue {
                type_name: e.identity.to_string(),
            }),
        },
        FieldKind::Struct(s) => Err(RenderError::UnhandledZeroValue {
            type_name: s.identity.to_string(),
        }),
    }
}

/// Floats keep a fractional part even when the default is integral.
fn normalize_scalar(kind: ScalarKind, value: &Value) -> Value {
    match value {
        Value::Number(n) if kind.is_float() && !n.is_f64() => {
            n.as_f64().map(Value::from).unwrap_or_else(|| value.clone())
        }
        _ => value.clone(),
    }
}

// =============================================================================
// Default lookup
// =============================================================================

/// Default value for a field inside its parent's default object.
///
/// `null` counts as absent.
pub fn lookup_default<'a>(defaults: Option<&'a Value>, field: &FieldDescriptor) -> Option<&'a Value> {
    match defaults?.as_object()?.get(field.default_key()) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

/// Defaults of a nested struct, falling back to the type's own factory.
pub fn nested_defaults<'a>(
    value: Option<&'a Value>,
    descriptor: &'a StructDescriptor,
) -> Option<&'a Value> {
    value.or(descriptor.defaults.as_ref())
}

/// Defaults of an embedded struct.
///
/// A flattened encoding stores the embedded keys directly in the parent, so a
/// missing key falls back to the parent object when it holds any of them.
/// Otherwise the embedded type's own factory applies.
pub fn embedded_defaults<'a>(
    session: &GenerationSession,
    defaults: Option<&'a Value>,
    field: &FieldDescriptor,
    descriptor: &'a StructDescriptor,
) -> Option<&'a Value> {
    if let Some(value) = lookup_default(defaults, field) {
        return Some(value);
    }
    match defaults.and_then(Value::as_object) {
        Some(parent) if holds_flattened_keys(session, descriptor, parent) => defaults,
        _ => descriptor.defaults.as_ref(),
    }
}

fn holds_flattened_keys(
    session: &GenerationSession,
    descriptor: &StructDescriptor,
    parent: &Map<String, Value>,
) -> bool {
    descriptor.fields.iter().any(|field| {
        parent.contains_key(field.default_key())
            || (field.embedded
                && session
                    .struct_of(&field.ty)
                    .is_some_and(|sub| holds_flattened_keys(session, sub, parent)))
    })
}

/// Elements to render for an array field; a missing default yields one placeholder.
pub fn array_values<'a>(
    field: &FieldDescriptor,
    value: Option<&'a Value>,
) -> Result<&'a [Value], RenderError> {
    match value {
        None => Ok(&PLACEHOLDER),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(RenderError::mismatch(field.default_key(), "an array")),
    }
}

/// Entries to render for a map field; a missing default yields `None`.
pub fn map_entries<'a>(
    field: &FieldDescriptor,
    value: Option<&'a Value>,
) -> Result<Option<&'a Map<String, Value>>, RenderError> {
    match value {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(RenderError::mismatch(field.default_key(), "a map")),
    }
}

/// Reject array and map fields marked as embedded.
pub fn ensure_not_embedded(field: &FieldDescriptor) -> Result<(), RenderError> {
    if field.embedded && field.layout != FieldLayout::Single {
        return Err(RenderError::EmbeddedCollection {
            field: field.type_name.clone(),
        });
    }
    Ok(())
}

// =============================================================================
// Shadowing and flattening
// =============================================================================

/// A field that survived shadowing, paired with the object holding its default.
#[derive(Debug, Clone, Copy)]
pub struct FlatField<'a> {
    pub field: &'a FieldDescriptor,
    pub defaults: Option<&'a Value>,
}

impl<'a> FlatField<'a> {
    /// The declared default of this field, if any.
    pub fn value(&self) -> Option<&'a Value> {
        lookup_default(self.defaults, self.field)
    }
}

/// Names a field contributes to its struct: its own, or the promoted names of
/// an embedded struct.
pub fn contributed_names(
    session: &GenerationSession,
    field: &FieldDescriptor,
) -> Result<Vec<String>, RenderError> {
    if !field.embedded {
        return Ok(vec![field.serialized_name().to_string()]);
    }

    ensure_not_embedded(field)?;
    let descriptor = session
        .struct_of(&field.ty)
        .ok_or_else(|| RenderError::lookup(&field.ty))?;

    let mut names = Vec::new();
    for inner in &descriptor.fields {
        names.extend(contributed_names(session, inner)?);
    }
    Ok(names)
}

/// For each field index, the names declared or promoted by the fields after it.
pub fn later_names(
    session: &GenerationSession,
    fields: &[FieldDescriptor],
) -> Result<Vec<Vec<String>>, RenderError> {
    let mut lists = vec![Vec::new(); fields.len()];
    let mut acc: Vec<String> = Vec::new();

    for (i, field) in fields.iter().enumerate().rev() {
        lists[i] = acc.clone();
        acc.extend(contributed_names(session, field)?);
    }

    Ok(lists)
}

/// Expand embedded structs in place and drop shadowed fields.
///
/// A field is shadowed when a later field in the same list declares or
/// promotes the same name. Fields of an inlined struct are also shadowed by
/// the names in `parent_shadowing`.
pub fn flatten_fields<'a>(
    session: &'a GenerationSession,
    descriptor: &'a StructDescriptor,
    defaults: Option<&'a Value>,
    embedded: bool,
    parent_shadowing: &[String],
) -> Result<Vec<FlatField<'a>>, RenderError> {
    let later = later_names(session, &descriptor.fields)?;
    let mut flat = Vec::new();

    for (i, field) in descriptor.fields.iter().enumerate() {
        if field.embedded {
            ensure_not_embedded(field)?;
            let sub = session
                .struct_of(&field.ty)
                .ok_or_else(|| RenderError::lookup(&field.ty))?;

            let mut inherited = later[i].clone();
            if embedded {
                inherited.extend(parent_shadowing.iter().cloned());
            }

            let sub_defaults = embedded_defaults(session, defaults, field, sub);
            flat.extend(flatten_fields(session, sub, sub_defaults, true, &inherited)?);
            continue;
        }

        let name = field.serialized_name();
        if later[i].iter().any(|n| n == name)
            || (embedded && parent_shadowing.iter().any(|n| n == name))
        {
            tracing::trace!(field = name, "field shadowed");
            continue;
        }

        flat.push(FlatField { field, defaults });
    }

    Ok(flat)
}

// =============================================================================
// Documentation
// =============================================================================

/// Render a field's doc block, one `{indent}{marker} {line}` per line.
///
/// Enum fields get an "Allowed values:" table of their constants. Returns an
/// empty string when there is nothing to document.
pub fn render_doc(
    session: &GenerationSession,
    field: &FieldDescriptor,
    indent: &str,
    marker: &str,
    show_type: bool,
) -> String {
    let mut lines: Vec<String> = field.doc.lines().map(|l| l.trim_end().to_string()).collect();

    if field.layout == FieldLayout::Single {
        if let Some(e) = session.enum_of(&field.ty) {
            lines.extend(allowed_values(e));
        }
    }

    if show_type {
        match lines.first_mut() {
            Some(first) => *first = format!("{} - {}", field.type_name, first),
            None => lines.push(field.type_name.clone()),
        }
    }

    let mut out = String::new();
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{}{}\n", indent, marker));
        } else {
            out.push_str(&format!("{}{} {}\n", indent, marker, line));
        }
    }
    out
}

/// Column-aligned table of an enum's constants.
fn allowed_values(e: &EnumDescriptor) -> Vec<String> {
    if e.constants.is_empty() {
        return Vec::new();
    }

    let values: Vec<String> = e.constants.iter().map(|c| c.value.to_string()).collect();
    let name_width = e.constants.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let value_width = values.iter().map(String::len).max().unwrap_or(0);

    let mut lines = vec!["Allowed values:".to_string()];
    for (constant, value) in e.constants.iter().zip(&values) {
        let line = format!(
            "{:<nw$} = {:>vw$}  {}",
            constant.name,
            value,
            constant.inline_doc(),
            nw = name_width,
            vw = value_width
        );
        lines.push(line.trim_end().to_string());
    }
    lines
}
