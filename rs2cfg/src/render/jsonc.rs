//! JSON with comments renderer.

use serde_json::{Map, Value};

use super::common::{self, FieldKind, FlatField};
use super::{DocTypesMode, Frame, RenderResult, Renderer};
use crate::registry::GenerationSession;
use crate::schema::{FieldDescriptor, FieldLayout, StructDescriptor, TypeRef};

/// Renders JSONC objects, one tab of indent per nesting level.
#[derive(Debug, Clone, Copy)]
pub struct JsoncRenderer<'s> {
    session: &'s GenerationSession,
    doc_types: DocTypesMode,
}

impl<'s> JsoncRenderer<'s> {
    pub fn new(session: &'s GenerationSession, doc_types: DocTypesMode) -> Self {
        Self { session, doc_types }
    }

    fn literal(&self, value: &Value) -> RenderResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Render one flattened field as its doc block plus `"key": value` line.
    fn render_field(
        &self,
        flat: &FlatField<'_>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<(String, String)> {
        let field = flat.field;
        let kind = common::classify(self.session, &field.ty)?;
        let value = flat.value();
        let key = field.serialized_name();
        let child = frame.child(key);

        let rendered = match field.layout {
            FieldLayout::Single => match kind {
                FieldKind::Struct(sub) => self.render_struct(
                    sub,
                    common::nested_defaults(value, sub),
                    indent,
                    false,
                    &[],
                    &child,
                )?,
                _ => self.literal(&common::slot_value(&kind, value)?)?,
            },
            FieldLayout::Array => {
                let values = common::array_values(field, value)?;
                self.render_array(field, values, indent, &child)?
            }
            FieldLayout::Map => {
                let empty = Map::new();
                let map = common::map_entries(field, value)?.unwrap_or(&empty);
                self.render_map(field, map, indent, &child)?
            }
        };

        let show_type = self.doc_types.shows_type(field, &kind);
        let doc = common::render_doc(self.session, field, indent, "//", show_type);
        let line = format!("{}{}: {}", indent, serde_json::to_string(key)?, rendered);

        Ok((doc, line))
    }
}

impl Renderer for JsoncRenderer<'_> {
    fn render_struct(
        &self,
        descriptor: &StructDescriptor,
        defaults: Option<&Value>,
        indent: &str,
        embedded: bool,
        parent_shadowing: &[String],
        frame: &Frame,
    ) -> RenderResult<String> {
        let mut out = String::new();
        let mut inner = indent.to_string();
        if !embedded {
            out.push_str("{\n");
            inner.push('\t');
        }

        let fields =
            common::flatten_fields(self.session, descriptor, defaults, embedded, parent_shadowing)?;

        let mut comma = "";
        let mut block_spacing = false;
        for flat in &fields {
            let (doc, line) = self.render_field(flat, &inner, frame)?;

            out.push_str(comma);
            if doc.is_empty() {
                block_spacing = false;
            } else {
                // Commented fields are set apart by blank lines.
                if !block_spacing && !comma.is_empty() {
                    out.push('\n');
                }
                block_spacing = true;
                out.push_str(&doc);
            }
            out.push_str(&line);

            comma = if block_spacing { ",\n\n" } else { ",\n" };
        }

        if !embedded {
            if !comma.is_empty() {
                out.push('\n');
            }
            out.push_str(indent);
            out.push('}');
        }

        Ok(out)
    }

    fn render_array(
        &self,
        field: &FieldDescriptor,
        values: &[Value],
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        if values.is_empty() {
            return Ok("[]".to_string());
        }

        let item_indent = format!("{}\t", indent);
        let item_frame = frame.item();
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            let value = (!value.is_null()).then_some(value);
            let literal = self.render_element(&field.ty, value, &item_indent, &item_frame)?;
            items.push(format!("{}{}", item_indent, literal));
        }

        Ok(format!("[\n{}\n{}]", items.join(",\n"), indent))
    }

    fn render_map(
        &self,
        field: &FieldDescriptor,
        map: &Map<String, Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        if map.is_empty() {
            return Ok("{}".to_string());
        }

        let entry_indent = format!("{}\t", indent);
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let value = (!value.is_null()).then_some(value);
            let literal =
                self.render_element(&field.ty, value, &entry_indent, &frame.child(key))?;
            entries.push(format!(
                "{}{}: {}",
                entry_indent,
                serde_json::to_string(key)?,
                literal
            ));
        }

        Ok(format!("{{\n{}\n{}}}", entries.join(",\n"), indent))
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
            kind => self.literal(&common::slot_value(&kind, value)?),
        }
    }
}
