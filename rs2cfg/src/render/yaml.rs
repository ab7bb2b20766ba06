//! YAML renderer.
//!
//! Fields keep their declaration order. Sequence items of struct type are
//! written as block mappings whose first key carries the `-` marker, padded
//! to the indent width.

use serde_json::{Map, Value};

use super::common::{self, FieldKind, FlatField};
use super::strings::{quote_string, render_yaml_key};
use super::{DocTypesMode, Frame, RenderResult, Renderer};
use crate::error::RenderError;
use crate::registry::GenerationSession;
use crate::schema::{FieldDescriptor, FieldLayout, StructDescriptor, TypeRef};

#[derive(Debug, Clone)]
pub struct YamlRenderer<'s> {
    session: &'s GenerationSession,
    doc_types: DocTypesMode,
    /// One nesting level.
    unit: String,
    /// Width of the `-` sequence marker including its padding.
    marker_width: usize,
}

impl<'s> YamlRenderer<'s> {
    pub fn new(session: &'s GenerationSession, doc_types: DocTypesMode, indent_size: usize) -> Self {
        let indent_size = indent_size.max(1);
        Self {
            session,
            doc_types,
            unit: " ".repeat(indent_size),
            marker_width: indent_size.max(2),
        }
    }

    fn marker(&self) -> String {
        format!("{:<width$}", "-", width = self.marker_width)
    }

    fn literal(&self, field_name: &str, value: &Value) -> RenderResult<String> {
        match value {
            Value::String(s) => Ok(quote_string(s)),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(RenderError::mismatch(field_name, "a scalar")),
        }
    }

    /// `key:` followed by a nested block, or `key: {empty}` when there is none.
    fn block(indent: &str, key: &str, body: &str, empty: &str) -> String {
        if body.is_empty() {
            format!("{}{}: {}", indent, key, empty)
        } else {
            format!("{}{}:\n{}", indent, key, body)
        }
    }

    fn render_field(&self, flat: &FlatField<'_>, indent: &str, frame: &Frame) -> RenderResult<String> {
        let field = flat.field;
        let kind = common::classify(self.session, &field.ty)?;
        let value = flat.value();
        let key = render_yaml_key(field.serialized_name());
        let child = frame.child(&key);

        let line = match (field.layout, kind) {
            (FieldLayout::Single, FieldKind::Struct(sub)) => {
                let nested = format!("{}{}", indent, self.unit);
                let body = self.render_struct(
                    sub,
                    common::nested_defaults(value, sub),
                    &nested,
                    false,
                    &[],
                    &child,
                )?;
                Self::block(indent, &key, &body, "{}")
            }
            (FieldLayout::Single, kind) => {
                let literal = self.literal(field.default_key(), &common::slot_value(&kind, value)?)?;
                format!("{}{}: {}", indent, key, literal)
            }
            (FieldLayout::Array, _) => {
                let values = common::array_values(field, value)?;
                let body = self.render_array(field, values, indent, &child)?;
                Self::block(indent, &key, &body, "[]")
            }
            (FieldLayout::Map, _) => {
                let empty = Map::new();
                let map = common::map_entries(field, value)?.unwrap_or(&empty);
                let body = self.render_map(field, map, indent, &child)?;
                Self::block(indent, &key, &body, "{}")
            }
        };

        let show_type = self.doc_types.shows_type(field, &kind);
        let doc = common::render_doc(self.session, field, indent, "#", show_type);
        Ok(format!("{}{}", doc, line))
    }

    /// Move the leading comments of a sequence item to the marker column and
    /// put the marker in front of its first key.
    fn mark_item(&self, body: &str, indent: &str) -> String {
        let marker_indent = &indent[..indent.len().saturating_sub(self.marker_width)];
        let mut lines = Vec::new();
        let mut marked = false;

        for line in body.split('\n') {
            match line.strip_prefix(indent) {
                Some(rest) if !marked && rest.starts_with('#') => {
                    lines.push(format!("{}{}", marker_indent, rest));
                }
                Some(rest) if !marked => {
                    lines.push(format!("{}{}{}", marker_indent, self.marker(), rest));
                    marked = true;
                }
                _ => lines.push(line.to_string()),
            }
        }

        lines.join("\n")
    }
}

impl Renderer for YamlRenderer<'_> {
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

        let mut lines = Vec::with_capacity(fields.len());
        for flat in &fields {
            lines.push(self.render_field(flat, indent, frame)?);
        }
        let body = lines.join("\n");

        if !frame.in_array {
            return Ok(body);
        }

        if body.is_empty() {
            let marker_indent = &indent[..indent.len().saturating_sub(self.marker_width)];
            return Ok(format!("{}{}{{}}", marker_indent, self.marker()));
        }

        Ok(self.mark_item(&body, indent))
    }

    fn render_array(
        &self,
        field: &FieldDescriptor,
        values: &[Value],
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        let item_indent = format!("{}{}", indent, self.unit);
        let item_frame = frame.item();

        let simple = common::classify(self.session, &field.ty)?.is_simple();
        let mut items = Vec::with_capacity(values.len());
        for value in values {
            let value = (!value.is_null()).then_some(value);
            if simple {
                let literal = self.render_element(&field.ty, value, &item_indent, &item_frame)?;
                items.push(format!("{}{}{}", item_indent, self.marker(), literal));
            } else {
                let content_indent = format!("{}{}", item_indent, " ".repeat(self.marker_width));
                items.push(self.render_element(&field.ty, value, &content_indent, &item_frame)?);
            }
        }

        Ok(items.join("\n"))
    }

    fn render_map(
        &self,
        field: &FieldDescriptor,
        map: &Map<String, Value>,
        indent: &str,
        frame: &Frame,
    ) -> RenderResult<String> {
        common::ensure_not_embedded(field)?;
        let entry_indent = format!("{}{}", indent, self.unit);
        let nested = format!("{}{}", entry_indent, self.unit);
        let simple = common::classify(self.session, &field.ty)?.is_simple();

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let value = (!value.is_null()).then_some(value);
            let rendered_key = render_yaml_key(key);
            let entry_frame = frame.child(&rendered_key);
            if simple {
                let literal = self.render_element(&field.ty, value, &entry_indent, &entry_frame)?;
                entries.push(format!("{}{}: {}", entry_indent, rendered_key, literal));
            } else {
                let body = self.render_element(&field.ty, value, &nested, &entry_frame)?;
                entries.push(Self::block(&entry_indent, &rendered_key, &body, "{}"));
            }
        }

        Ok(entries.join("\n"))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumConstant, EnumDescriptor, ScalarKind, TypeIdentity, RENAME_TAG};
    use serde_json::json;

    fn id(name: &str) -> TypeIdentity {
        TypeIdentity::new("", name)
    }

    fn scalar(name: &str, kind: ScalarKind, type_name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, TypeRef::Scalar(kind), type_name)
    }

    fn named(name: &str, target: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, TypeRef::Named(id(target)), target)
    }

    fn render_root(session: &GenerationSession, name: &str, indent_size: usize) -> String {
        let descriptor = session.structs.get(&id(name)).unwrap();
        YamlRenderer::new(session, DocTypesMode::None, indent_size)
            .render_struct(
                descriptor,
                descriptor.defaults.as_ref(),
                "",
                false,
                &[],
                &Frame::root(),
            )
            .unwrap()
    }

    fn server_session() -> GenerationSession {
        let mut session = GenerationSession::new();
        session.structs.register(
            StructDescriptor::new(id("Server"))
                .with_field(scalar("addr", ScalarKind::String, "String").with_doc("Listen address."))
                .with_field(scalar("port", ScalarKind::U16, "u16")),
        );
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(scalar("name", ScalarKind::String, "String"))
                .with_field(named("servers", "Server").with_layout(FieldLayout::Array))
                .with_defaults(json!({
                    "name": "svc",
                    "servers": [{ "addr": "a", "port": 1 }, { "addr": "b", "port": 2 }]
                })),
        );
        session
    }

    #[test]
    fn test_user_without_docs() {
        let mut session = GenerationSession::new();
        session.structs.register(
            StructDescriptor::new(id("User"))
                .with_field(scalar("Name", ScalarKind::String, "String"))
                .with_field(scalar("Age", ScalarKind::I32, "i32"))
                .with_defaults(json!({ "Name": "John", "Age": 30 })),
        );

        assert_eq!(render_root(&session, "User", 2), "Name: 'John'\nAge: 30");
    }

    #[test]
    fn test_array_of_structs() {
        let session = server_session();
        let expected = "\
name: 'svc'
servers:
  # Listen address.
  - addr: 'a'
    port: 1
  # Listen address.
  - addr: 'b'
    port: 2";
        assert_eq!(render_root(&session, "Config", 2), expected);
    }

    #[test]
    fn test_array_marker_is_padded_to_indent() {
        let session = server_session();
        let out = render_root(&session, "Config", 4);

        assert!(out.contains("servers:\n    # Listen address.\n    -   addr: 'a'\n        port: 1"));
    }

    #[test]
    fn test_nested_struct_and_scalar_arrays() {
        let mut session = GenerationSession::new();
        session.structs.register(
            StructDescriptor::new(id("Remote"))
                .with_field(scalar("host", ScalarKind::String, "String"))
                .with_field(scalar("ports", ScalarKind::U16, "Vec<u16>").with_layout(FieldLayout::Array)),
        );
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(named("remote", "Remote").with_tag(RENAME_TAG, "Remote"))
                .with_field(scalar("tags", ScalarKind::String, "Vec<String>").with_layout(FieldLayout::Array))
                .with_defaults(json!({
                    "Remote": { "host": "h", "ports": [80, 443] },
                    "tags": []
                })),
        );

        let expected = "\
Remote:
  host: 'h'
  ports:
    - 80
    - 443
tags: []";
        assert_eq!(render_root(&session, "Config", 2), expected);
    }

    #[test]
    fn test_maps() {
        let mut session = GenerationSession::new();
        session.structs.register(
            StructDescriptor::new(id("Peer")).with_field(scalar("weight", ScalarKind::U8, "u8")),
        );
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(
                    scalar("labels", ScalarKind::String, "HashMap<String, String>")
                        .with_layout(FieldLayout::Map),
                )
                .with_field(named("peers", "Peer").with_layout(FieldLayout::Map))
                .with_field(
                    scalar("empty", ScalarKind::I32, "HashMap<String, i32>")
                        .with_layout(FieldLayout::Map),
                )
                .with_defaults(json!({
                    "labels": { "env": "prod", "a b": "it's" },
                    "peers": { "alpha": { "weight": 3 } }
                })),
        );

        let expected = "\
labels:
  env: 'prod'
  'a b': \"it's\"
peers:
  alpha:
    weight: 3
empty: {}";
        assert_eq!(render_root(&session, "Config", 2), expected);
    }

    #[test]
    fn test_scalar_looking_keys_are_quoted() {
        let mut session = GenerationSession::new();
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(
                    scalar("services", ScalarKind::String, "HashMap<u16, String>")
                        .with_layout(FieldLayout::Map),
                )
                .with_field(scalar("null", ScalarKind::Bool, "bool"))
                .with_defaults(json!({
                    "services": { "80": "http", "443": "https" },
                    "null": true
                })),
        );

        let expected = "\
services:
  '80': 'http'
  '443': 'https'
'null': true";
        assert_eq!(render_root(&session, "Config", 2), expected);
    }

    #[test]
    fn test_enum_placeholder_in_array() {
        let mut session = GenerationSession::new();
        session.enums.register(
            EnumDescriptor::new(id("Proto"))
                .with_constant(EnumConstant::new("Tcp", json!("tcp"), ""))
                .with_constant(EnumConstant::new("Udp", json!("udp"), "")),
        );
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(named("protocols", "Proto").with_layout(FieldLayout::Array)),
        );

        assert_eq!(render_root(&session, "Config", 2), "protocols:\n  - 'tcp'");
    }

    #[test]
    fn test_empty_struct_items() {
        let mut session = GenerationSession::new();
        session.structs.register(StructDescriptor::new(id("Unit")));
        session.structs.register(
            StructDescriptor::new(id("Config"))
                .with_field(named("unit", "Unit"))
                .with_field(named("units", "Unit").with_layout(FieldLayout::Array)),
        );

        assert_eq!(render_root(&session, "Config", 2), "unit: {}\nunits:\n  - {}");
    }
}
