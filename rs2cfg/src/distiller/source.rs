//! Schema provider backed by parsed Rust sources.

use std::path::Path;

use darling::{FromDeriveInput, FromField, FromVariant};
use serde_json::Value;
use syn::ext::IdentExt;
use syn::{Attribute, DeriveInput, Field, Fields, ItemEnum, ItemStruct, Lit, Meta, Type};

use super::attributes::{ContainerAttrs, FieldAttrs, RenameRule, VariantAttrs};
use super::defaults::{int_value, Evaluator};
use super::fields::{map_field_type, path_display, type_display, ElementType};
use super::index::{path_segments, Lookup, SourceIndex};
use super::serde_compat::{SerdeContainerAttrs, SerdeFieldAttrs, SerdeVariantAttrs};
use super::{Declaration, SchemaProvider};
use crate::error::DistillError;
use crate::schema::{
    EnumConstant, EnumDescriptor, FieldDescriptor, FieldLayout, StructDescriptor, Tags,
    TypeIdentity, TypeRef, RENAME_TAG,
};

/// A field that takes part in the configuration surface.
#[derive(Debug, Clone)]
pub struct DeclaredField {
    /// Identifier as written in the struct, used to match struct literals.
    pub ident: String,
    pub descriptor: FieldDescriptor,
    /// Declared as `Option<T>`, so its derived default is absent.
    pub optional: bool,
}

/// Distills schemas from Rust source files.
///
/// Each file is added under the module namespace it defines:
///
/// ```
/// use rs2cfg::distiller::{SchemaProvider, SourceSchemaProvider};
///
/// let mut provider = SourceSchemaProvider::new();
/// provider
///     .add_source("net", "src/net.rs", "pub struct Remote { pub addr: String }")
///     .unwrap();
///
/// let id = provider.locate("Remote").unwrap();
/// assert_eq!(id.to_string(), "net::Remote");
/// ```
#[derive(Debug, Default)]
pub struct SourceSchemaProvider {
    index: SourceIndex,
    rename_all: Option<RenameRule>,
}

impl SourceSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider for a single in-memory file at the crate root.
    pub fn from_source(content: &str) -> Result<Self, DistillError> {
        let mut provider = Self::new();
        provider.add_source("", "<memory>", content)?;
        Ok(provider)
    }

    /// Rename rule for structs that declare none themselves.
    pub fn with_rename_all(mut self, rule: Option<RenameRule>) -> Self {
        self.rename_all = rule;
        self
    }

    /// Parse a file and add its items under `namespace`.
    pub fn add_source(
        &mut self,
        namespace: &str,
        path: impl AsRef<Path>,
        content: &str,
    ) -> Result<(), DistillError> {
        self.index.add_file(namespace, path.as_ref(), content)
    }

    /// Fully qualified names of every declared struct and enum.
    pub fn type_names(&self) -> Vec<String> {
        self.index.type_identities().map(|id| id.to_string()).collect()
    }

    pub(crate) fn index(&self) -> &SourceIndex {
        &self.index
    }

    /// Defaults tree of a struct, evaluated from its factory.
    pub(crate) fn defaults_of(&self, id: &TypeIdentity) -> Result<Option<Value>, DistillError> {
        let item = self.struct_item(id)?;
        let container = container_attrs(id, struct_input(item))?;
        Evaluator::new(self).struct_defaults(id, container.defaults.as_deref())
    }

    pub(crate) fn derives_default(&self, id: &TypeIdentity) -> bool {
        self.index
            .struct_item(id)
            .is_some_and(|item| derives(&item.attrs, "Default"))
    }

    /// Declared name of the enum variant marked `#[default]`.
    pub(crate) fn default_variant(&self, id: &TypeIdentity) -> Option<String> {
        self.index.enum_item(id).and_then(|item| {
            item.variants
                .iter()
                .find(|v| v.attrs.iter().any(|a| a.path().is_ident("default")))
                .map(|v| v.ident.to_string())
        })
    }

    fn struct_item(&self, id: &TypeIdentity) -> Result<&ItemStruct, DistillError> {
        self.index
            .struct_item(id)
            .ok_or_else(|| DistillError::resolution(id.to_string(), "no struct with this name"))
    }

    // =========================================================================
    // Structs
    // =========================================================================

    fn build_struct(&self, id: &TypeIdentity) -> Result<StructDescriptor, DistillError> {
        let item = self.struct_item(id)?;
        let mut descriptor = StructDescriptor::new(id.clone())
            .with_doc(extract_doc_comments(&item.attrs).unwrap_or_default());

        for field in self.declared_fields(id)? {
            descriptor = descriptor.with_field(field.descriptor);
        }

        if let Some(defaults) = self.defaults_of(id)? {
            descriptor = descriptor.with_defaults(defaults);
        }

        tracing::debug!(
            type_name = %id,
            fields = descriptor.fields.len(),
            has_defaults = descriptor.defaults.is_some(),
            "struct resolved"
        );
        Ok(descriptor)
    }

    /// Exported, non-skipped fields of a struct in declaration order.
    pub(crate) fn declared_fields(&self, id: &TypeIdentity) -> Result<Vec<DeclaredField>, DistillError> {
        let item = self.struct_item(id)?;
        let container = container_attrs(id, struct_input(item))?;
        let serde = SerdeContainerAttrs::from_attrs(&item.attrs);
        let rename_all = container.rename_all.or(serde.rename_all).or(self.rename_all);

        match &item.fields {
            Fields::Unit => Ok(Vec::new()),
            Fields::Unnamed(unnamed) => {
                for (position, field) in unnamed.unnamed.iter().enumerate() {
                    let attrs = field_attrs(id, field)?;
                    let serde = SerdeFieldAttrs::from_attrs(&field.attrs);
                    if attrs.is_exported() && !attrs.skip && !serde.should_skip() {
                        return Err(DistillError::ambiguous(
                            id.to_string(),
                            position.to_string(),
                            "positional fields have no name",
                        ));
                    }
                }
                Ok(Vec::new())
            }
            Fields::Named(named) => {
                let mut fields = Vec::new();
                for field in &named.named {
                    if let Some(declared) = self.declared_field(id, field, rename_all)? {
                        fields.push(declared);
                    }
                }
                Ok(fields)
            }
        }
    }

    fn declared_field(
        &self,
        id: &TypeIdentity,
        field: &Field,
        rename_all: Option<RenameRule>,
    ) -> Result<Option<DeclaredField>, DistillError> {
        let attrs = field_attrs(id, field)?;
        let serde = SerdeFieldAttrs::from_attrs(&field.attrs);
        let Some(ident) = &attrs.ident else {
            return Ok(None);
        };
        let name = ident.unraw().to_string();

        if !attrs.is_exported() || attrs.skip || serde.should_skip() {
            tracing::trace!(type_name = %id, field = %name, "field skipped");
            return Ok(None);
        }

        let type_name = type_display(&field.ty);
        let mapped = map_field_type(&field.ty).map_err(|e| {
            DistillError::unsupported(id.to_string(), &name, format!("{}: {}", type_name, e))
        })?;

        let ty = match &mapped.element {
            ElementType::Scalar(kind) => TypeRef::Scalar(*kind),
            ElementType::Named(path) => TypeRef::Named(self.resolve_field_type(id, &name, path)?),
        };
        let doc = extract_doc_comments(&field.attrs).unwrap_or_default();

        let descriptor = if attrs.embed || serde.flatten {
            let TypeRef::Named(target) = ty else {
                return Err(DistillError::unsupported(id.to_string(), &name, type_name));
            };
            let mut descriptor = FieldDescriptor::embedded(target)
                .with_layout(mapped.layout)
                .with_doc(doc);
            if mapped.layout != FieldLayout::Single {
                descriptor.type_name = type_name;
            }
            if let Some(text) = &attrs.tags {
                descriptor.tags.extend_from_str(text);
            }
            descriptor
        } else {
            let mut tags = Tags::new();
            if let Some(rule) = rename_all {
                tags.insert(RENAME_TAG, rule.apply(&name));
            }
            if let Some(rename) = &serde.rename {
                tags.insert(RENAME_TAG, rename.as_str());
            }
            if let Some(text) = &attrs.tags {
                tags.extend_from_str(text);
            }
            if let Some(rename) = &attrs.rename {
                tags.insert(RENAME_TAG, rename.as_str());
            }

            let mut descriptor = FieldDescriptor::new(name.clone(), ty, type_name)
                .with_layout(mapped.layout)
                .with_doc(doc);
            descriptor.tags = tags;
            descriptor
        };

        Ok(Some(DeclaredField {
            ident: name,
            descriptor,
            optional: is_option(&field.ty),
        }))
    }

    fn resolve_field_type(
        &self,
        owner: &TypeIdentity,
        field: &str,
        path: &syn::Path,
    ) -> Result<TypeIdentity, DistillError> {
        match self.index.resolve_type(&owner.namespace, &path_segments(path)) {
            Lookup::Found(id) => Ok(id),
            Lookup::Ambiguous(candidates) => {
                let candidates: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                Err(DistillError::ambiguous(
                    owner.to_string(),
                    field,
                    format!(
                        "type '{}' matches {} and no import selects one",
                        path_display(path),
                        candidates.join(", ")
                    ),
                ))
            }
            Lookup::Missing => Err(DistillError::resolution(
                path_display(path),
                format!("referenced by field '{}' of '{}' is not declared", field, owner),
            )),
        }
    }

    // =========================================================================
    // Enums
    // =========================================================================

    /// Build an enum descriptor, evaluating discriminants with `evaluator`.
    ///
    /// Enums with explicit discriminants are integer-valued; the others
    /// serialize as their (renamed) variant names.
    pub(crate) fn enum_descriptor(
        &self,
        id: &TypeIdentity,
        evaluator: &mut Evaluator<'_>,
    ) -> Result<EnumDescriptor, DistillError> {
        let item: &ItemEnum = self
            .index
            .enum_item(id)
            .ok_or_else(|| DistillError::resolution(id.to_string(), "no enum with this name"))?;
        let container = container_attrs(id, enum_input(item))?;
        let serde = SerdeContainerAttrs::from_attrs(&item.attrs);
        let rename_all = container.rename_all.or(serde.rename_all);
        let numeric = item.variants.iter().any(|v| v.discriminant.is_some());

        let mut descriptor = EnumDescriptor::new(id.clone());
        let mut next: i128 = 0;

        for variant in &item.variants {
            let name = variant.ident.unraw().to_string();
            if !matches!(variant.fields, Fields::Unit) {
                return Err(DistillError::unsupported(
                    id.to_string(),
                    name,
                    "data-carrying enum variant",
                ));
            }

            let attrs = VariantAttrs::from_variant(variant)
                .map_err(|e| DistillError::attribute(id.to_string(), e.to_string()))?;
            let serde = SerdeVariantAttrs::from_attrs(&variant.attrs);

            let value = if numeric {
                let n = match &variant.discriminant {
                    Some((_, expr)) => evaluator.eval_integer(&id.namespace, expr).ok_or_else(|| {
                        DistillError::attribute(
                            id.to_string(),
                            format!("cannot evaluate discriminant of '{}'", name),
                        )
                    })?,
                    None => next,
                };
                next = n + 1;
                int_value(n)
            } else {
                let serialized = attrs
                    .rename
                    .or(serde.rename)
                    .or_else(|| rename_all.map(|rule| rule.apply(&name)))
                    .unwrap_or_else(|| name.clone());
                Value::String(serialized)
            };

            if attrs.skip || serde.skip {
                continue;
            }

            let doc = extract_doc_comments(&variant.attrs).unwrap_or_default();
            descriptor = descriptor.with_constant(EnumConstant::new(name, value, doc));
        }

        tracing::debug!(type_name = %id, constants = descriptor.constants.len(), "enum resolved");
        Ok(descriptor)
    }
}

impl SchemaProvider for SourceSchemaProvider {
    fn locate(&self, name: &str) -> Result<TypeIdentity, DistillError> {
        let segments: Vec<String> = name
            .split("::")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        match self.index.resolve_type("", &segments) {
            Lookup::Found(id) => Ok(id),
            Lookup::Ambiguous(candidates) => {
                let candidates: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
                Err(DistillError::resolution(
                    name,
                    format!("matches {}; use a qualified path", candidates.join(", ")),
                ))
            }
            Lookup::Missing => Err(DistillError::resolution(name, "no struct or enum with this name")),
        }
    }

    fn resolve(&self, id: &TypeIdentity) -> Result<Declaration, DistillError> {
        if self.index.is_struct(id) {
            return self.build_struct(id).map(Declaration::Struct);
        }
        if self.index.is_enum(id) {
            let mut evaluator = Evaluator::new(self);
            return self.enum_descriptor(id, &mut evaluator).map(Declaration::Enum);
        }
        Err(DistillError::resolution(id.to_string(), "no struct or enum with this name"))
    }
}

// =============================================================================
// Attribute helpers
// =============================================================================

fn struct_input(item: &ItemStruct) -> DeriveInput {
    DeriveInput {
        attrs: item.attrs.clone(),
        vis: item.vis.clone(),
        ident: item.ident.clone(),
        generics: item.generics.clone(),
        data: syn::Data::Struct(syn::DataStruct {
            struct_token: item.struct_token,
            fields: item.fields.clone(),
            semi_token: item.semi_token,
        }),
    }
}

fn enum_input(item: &ItemEnum) -> DeriveInput {
    DeriveInput {
        attrs: item.attrs.clone(),
        vis: item.vis.clone(),
        ident: item.ident.clone(),
        generics: item.generics.clone(),
        data: syn::Data::Enum(syn::DataEnum {
            enum_token: item.enum_token,
            brace_token: item.brace_token,
            variants: item.variants.clone(),
        }),
    }
}

fn container_attrs(id: &TypeIdentity, input: DeriveInput) -> Result<ContainerAttrs, DistillError> {
    ContainerAttrs::from_derive_input(&input)
        .map_err(|e| DistillError::attribute(id.to_string(), e.to_string()))
}

fn field_attrs(id: &TypeIdentity, field: &Field) -> Result<FieldAttrs, DistillError> {
    FieldAttrs::from_field(field).map_err(|e| DistillError::attribute(id.to_string(), e.to_string()))
}

/// Whether `#[derive(...)]` lists the given trait.
fn derives(attrs: &[Attribute], name: &str) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .any(|attr| {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.segments.last().is_some_and(|s| s.ident == name) {
                    found = true;
                }
                Ok(())
            });
            found
        })
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_option(&reference.elem),
        Type::Paren(paren) => is_option(&paren.elem),
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == "Option"),
        _ => false,
    }
}

/// Extract doc comments from attributes.
pub fn extract_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let doc_lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }

            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value());
                    }
                }
            }
            None
        })
        .collect();

    let description = doc_lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if description.is_empty() {
        None
    } else {
        Some(description)
    }
}
