//! Serde attribute compatibility.
//!
//! Configuration types usually derive `Serialize`/`Deserialize` already, so
//! their `#[serde(...)]` attributes are honoured. `#[config(...)]` takes
//! precedence when both are present.

use syn::Attribute;

use super::attributes::RenameRule;

/// Serde container attributes extracted from `#[serde(...)]`.
#[derive(Debug, Clone, Default)]
pub struct SerdeContainerAttrs {
    /// Rename all fields or variants using a case convention
    pub rename_all: Option<RenameRule>,
}

impl SerdeContainerAttrs {
    /// Parse serde attributes from a list of attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();

        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    if let Some(value) = parse_string_value(&meta)? {
                        result.rename_all = RenameRule::from_name(&value);
                    }
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }

        result
    }
}

/// Serde field attributes extracted from `#[serde(...)]`.
#[derive(Debug, Clone, Default)]
pub struct SerdeFieldAttrs {
    /// Rename this field
    pub rename: Option<String>,

    /// Skip this field
    pub skip: bool,

    /// Skip serializing this field
    pub skip_serializing: bool,

    /// Flatten nested object
    pub flatten: bool,
}

impl SerdeFieldAttrs {
    /// Parse serde attributes from a list of attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();

        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(value) = parse_string_value(&meta)? {
                        result.rename = Some(value);
                    }
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("skip_serializing") {
                    result.skip_serializing = true;
                } else if meta.path.is_ident("flatten") {
                    result.flatten = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }

        result
    }

    /// A template only shows fields that are written out.
    pub fn should_skip(&self) -> bool {
        self.skip || self.skip_serializing
    }
}

/// Serde variant attributes extracted from `#[serde(...)]`.
#[derive(Debug, Clone, Default)]
pub struct SerdeVariantAttrs {
    /// Rename this variant
    pub rename: Option<String>,

    /// Skip this variant
    pub skip: bool,
}

impl SerdeVariantAttrs {
    /// Parse serde attributes from a list of attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();

        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(value) = parse_string_value(&meta)? {
                        result.rename = Some(value);
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    result.skip = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }

        result
    }
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}

/// Parse a string value from a meta item like `rename = "value"`.
///
/// `rename(serialize = "..")` yields the serialize name.
fn parse_string_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let value: syn::LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }

    let mut serialize = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("serialize") {
            let value: syn::LitStr = inner.value()?.parse()?;
            serialize = Some(value.value());
        } else {
            skip_value(&inner)?;
        }
        Ok(())
    })?;
    Ok(serialize)
}

/// Consume the value of an attribute this module does not interpret.
fn skip_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}
