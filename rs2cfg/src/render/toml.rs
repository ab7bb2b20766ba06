//! TOML renderer.
//!
//! Simple fields of a table come first, followed by nested tables, arrays of
//! tables and maps, so the output stays valid TOML whatever the declaration
//! order. Tables nested below the top level are indented by one tab.

use serde_json::{Map, Value};

use super::common::{self, FieldKind, FlatField};
use super::strings::{quote_string, render_key};
use super::{DocTypesMode, Frame, RenderResult, Renderer};
use crate::error::RenderError;
use crate::registry::GenerationSession;
use crate::schema::{FieldDescriptor, FieldLayout, StructDescriptor, TypeRef};

#[derive(Debug, Clone, Copy)]
pub struct TomlRenderer<'s> {
    session: &'s GenerationSession,
    doc_types: DocTypesMode,
}

impl<'s> TomlRenderer<'s> {
    pub fn new(session: &'s GenerationSession, doc_types: DocTypesMode) -> Self {
        Self { session, doc_types }
    }

    /// Render a scalar or enum value as a TOML literal.
    fn literal(&self, field_name: &str, value: &Value) -> RenderResult<String> {
        match value {
            Value::String(s) => Ok(quote_string(s)),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => match n.as_u64() {
                // TOML integers are signed 64-bit.
                Some(u) if i64::try_from(u).is_err() => {
                    tracing::warn!(
                        field = field_name,
                        value = u,
                        "integer exceeds TOML range, written as float"
                    );
                    Ok(format!("{:e}", u as f64))
                }
                _ => Ok(n.to_string()),
            },
            _ => Err(RenderError::mismatch(field_name, "a scalar")),
        }
    }

    fn table_header(indent: &str, frame: &Frame) -> String {
        if frame.in_array {
            format!("{}[[{}]]", indent, frame.path)
        } else {
            format!("{}[{}]", indent, frame.path)
        }
    }

    /// Render one flattened field. Returns `None` for an empty array of tables.
    fn render_field(
        &self,
        flat: &FlatField<'_>,
        first: bool,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<Option<String>> {
        let field = flat.field;
        let kind = common::classify(self.session, &field.ty)?;
        let value = flat.value();
        let key = render_key(field.serialized_name());
        let child = frame.child(&key);
        let show_type = self.doc_types.shows_type(field, &kind);

        let table_indent = if frame.path.is_empty() {
            indent.to_string()
        } else {
            format!("{}\t", indent)
        };
        let mut doc_indent = table_indent.clone();

        let body = match (field.layout, kind) {
            (FieldLayout::Single, FieldKind::Struct(sub)) => self.render_struct(
                sub,
                common::nested_defaults(value, sub),
                &table_indent,
                false,
                &[],
                &child,
            )?,
            (FieldLayout::Array, FieldKind::Struct(_)) => {
                let values = common::array_values(field, value)?;
                self.render_array(field, values, &table_indent, &child)?
            }
            (FieldLayout::Map, kind) => {
                let empty = Map::new();
                let map = common::map_entries(field, value)?.unwrap_or(&empty);
                // Struct entries are tables one level below the map itself.
                if matches!(kind, FieldKind::Struct(_)) && !map.is_empty() {
                    doc_indent = format!("{}\t", table_indent);
                }
                self.render_map(field, map, &table_indent, &child)?
            }
            (FieldLayout::Array, _) => {
                let values = common::array_values(field, value)?;
                let rendered = self.render_array(field, values, indent, &child)?;
                let doc = common::render_doc(self.session, field, indent, "#", show_type);
                return Ok(Some(format!("{}{}{} = {}", doc, indent, key, rendered)));
            }
            (FieldLayout::Single, kind) => {
                let rendered =
                    self.literal(field.default_key(), &common::slot_value(&kind, value)?)?;
                let doc = common::render_doc(self.session, field, indent, "#", show_type);
                return Ok(Some(format!("{}{}{} = {}", doc, indent, key, rendered)));
            }
        };

        if body.is_empty() {
            tracing::trace!(field = %key, "empty array of tables omitted");
            return Ok(None);
        }

        let doc = common::render_doc(self.session, field, &doc_indent, "#", show_type);
        let spacing = if first { "" } else { "\n" };
        Ok(Some(format!("{}{}{}", spacing, doc, body)))
    }
}

impl Renderer for TomlRenderer<'_> {
    fn render_struct(
        &self,
        descriptor: &StructDescriptor,
        defaults: Option<&Value>,
        indent: &str,
        embedded: bool,
        parent_shadowing: &[String],
        frame: &Frame,
    ) -> RenderResult<String> {
        let fields =
            common::flatten_fields(self.session, descriptor, defaults, embedded, parent_shadowing)?;

        let mut keyed = Vec::with_capacity(fields.len());
        for flat in fields {
            keyed.push((common::is_simple_field(self.session, flat.field)?, flat));
        }
        keyed.sort_by_key(|(simple, _)| !*simple);

        let mut pieces = Vec::new();
        if !embedded && !frame.path.is_empty() {
            pieces.push(Self::table_header(indent, frame));
        }

        for (i, (_, flat)) in keyed.iter().enumerate() {
            if let Some(piece) = self.render_field(flat, i == 0, indent, frame)? {
                pieces.push(piece);
            }
        }

        Ok(pieces.join("\n"))
    }

    fn render_array(
        &self,
        field: &FieldDescriptor,
        values: &[Value],
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        let simple = common::classify(self.session, &field.ty)?.is_simple();

        if simple {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                let value = (!value.is_null()).then_some(value);
                items.push(self.render_element(&field.ty, value, "", frame)?);
            }
            return Ok(format!("[{}]", items.join(", ")));
        }

        let item_frame = frame.item();
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            let value = (!value.is_null()).then_some(value);
            items.push(self.render_element(&field.ty, value, indent, &item_frame)?);
        }
        Ok(items.join("\n\n"))
    }

    fn render_map(
        &self,
        field: &FieldDescriptor,
        map: &Map<String, Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        let header = Self::table_header(indent, frame);

        match common::classify(self.session, &field.ty)? {
            FieldKind::Struct(_) if !map.is_empty() => {
                let entry_indent = format!("{}\t", indent);
                let mut tables = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let value = (!value.is_null()).then_some(value);
                    let entry_frame = frame.child(&render_key(key));
                    tables.push(self.render_element(&field.ty, value, &entry_indent, &entry_frame)?);
                }
                Ok(tables.join("\n\n"))
            }
            _ => {
                let mut lines = vec![header];
                for (key, value) in map {
                    let value = (!value.is_null()).then_some(value);
                    let literal = self.render_element(&field.ty, value, indent, frame)?;
                    lines.push(format!("{}{} = {}", indent, render_key(key), literal));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    fn render_element(
        &self,
        element: &TypeRef,
        value: Option<&Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        match common::classify(self.session, element)? {
            FieldKind::Struct(sub) => self.render_struct(
                sub,
                common::nested_defaults(value, sub),
                indent,
                false,
                &[],
                frame,
            ),
            kind => self.literal(&frame.path, &common::slot_value(&kind, value)?),
        }
    }
}
