//! `#[config(...)]` attribute parsing using darling.
//!
//! This module defines the attribute structures for `#[config(...)]` on
//! containers (structs/enums), fields and variants.

use darling::{FromDeriveInput, FromField, FromMeta, FromVariant};
use syn::{Ident, Type, Visibility};

/// Container-level attributes for structs and enums.
/// Parsed from `#[config(...)]` on the type definition.
#[derive(Debug, Clone, FromDeriveInput)]
#[darling(attributes(config))]
pub struct ContainerAttrs {
    /// The identifier of the type
    pub ident: Ident,

    /// Rename all fields or variants using a case convention
    #[darling(default)]
    pub rename_all: Option<RenameRule>,

    /// Free function building the default instance, instead of `impl Default`
    #[darling(default)]
    pub defaults: Option<String>,
}

/// Field-level attributes parsed from `#[config(...)]` on struct fields.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(config))]
pub struct FieldAttrs {
    /// Field identifier (None for tuple struct fields)
    pub ident: Option<Ident>,

    /// Field type
    pub ty: Type,

    /// Field visibility
    pub vis: Visibility,

    /// Rename this field
    #[darling(default)]
    pub rename: Option<String>,

    /// Skip this field
    #[darling(default)]
    pub skip: bool,

    /// Promote the fields of this struct into the parent
    #[darling(default)]
    pub embed: bool,

    /// Raw `key:"value"` tag text
    #[darling(default)]
    pub tags: Option<String>,
}

impl FieldAttrs {
    /// Whether the field is part of the configuration surface.
    ///
    /// `pub(self)` is private visibility spelled out and does not count.
    pub fn is_exported(&self) -> bool {
        match &self.vis {
            Visibility::Public(_) => true,
            Visibility::Restricted(restricted) => !restricted.path.is_ident("self"),
            _ => false,
        }
    }
}

/// Variant-level attributes for enum variants.
#[derive(Debug, Clone, FromVariant)]
#[darling(attributes(config))]
pub struct VariantAttrs {
    /// Variant identifier
    pub ident: Ident,

    /// Rename this variant
    #[darling(default)]
    pub rename: Option<String>,

    /// Skip this variant
    #[darling(default)]
    pub skip: bool,
}

/// Rename rule for field/variant name transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromMeta)]
pub enum RenameRule {
    /// lowercase
    #[darling(rename = "lowercase")]
    Lowercase,

    /// UPPERCASE
    #[darling(rename = "UPPERCASE")]
    Uppercase,

    /// camelCase
    #[darling(rename = "camelCase")]
    CamelCase,

    /// snake_case
    #[darling(rename = "snake_case")]
    SnakeCase,

    /// PascalCase
    #[darling(rename = "PascalCase")]
    PascalCase,

    /// SCREAMING_SNAKE_CASE
    #[darling(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnakeCase,

    /// kebab-case
    #[darling(rename = "kebab-case")]
    KebabCase,

    /// SCREAMING-KEBAB-CASE
    #[darling(rename = "SCREAMING-KEBAB-CASE")]
    ScreamingKebabCase,
}

impl RenameRule {
    /// Parse a serde-style rule name.
    pub fn from_name(name: &str) -> Option<Self> {
        let rule = match name {
            "lowercase" => RenameRule::Lowercase,
            "UPPERCASE" => RenameRule::Uppercase,
            "camelCase" => RenameRule::CamelCase,
            "snake_case" => RenameRule::SnakeCase,
            "PascalCase" => RenameRule::PascalCase,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnakeCase,
            "kebab-case" => RenameRule::KebabCase,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebabCase,
            _ => return None,
        };
        Some(rule)
    }

    /// Apply the rename rule to a string.
    pub fn apply(&self, name: &str) -> String {
        use convert_case::{Case, Casing};

        match self {
            RenameRule::Lowercase => name.to_lowercase(),
            RenameRule::Uppercase => name.to_uppercase(),
            RenameRule::CamelCase => name.to_case(Case::Camel),
            RenameRule::SnakeCase => name.to_case(Case::Snake),
            RenameRule::PascalCase => name.to_case(Case::Pascal),
            RenameRule::ScreamingSnakeCase => name.to_case(Case::UpperSnake),
            RenameRule::KebabCase => name.to_case(Case::Kebab),
            RenameRule::ScreamingKebabCase => name.to_case(Case::UpperSnake).replace('_', "-"),
        }
    }
}

impl std::str::FromStr for RenameRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown rename rule '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{parse_quote, DeriveInput, ItemStruct};

    #[test]
    fn test_rename_rule_camel_case() {
        assert_eq!(RenameRule::CamelCase.apply("user_name"), "userName");
        assert_eq!(RenameRule::CamelCase.apply("UserName"), "userName");
    }

    #[test]
    fn test_rename_rule_kebab_case() {
        assert_eq!(RenameRule::KebabCase.apply("log_level"), "log-level");
        assert_eq!(RenameRule::ScreamingKebabCase.apply("log_level"), "LOG-LEVEL");
    }

    #[test]
    fn test_rename_rule_plain_case() {
        assert_eq!(RenameRule::Lowercase.apply("LogLevel"), "loglevel");
        assert_eq!(RenameRule::Uppercase.apply("log_level"), "LOG_LEVEL");
    }

    #[test]
    fn test_rename_rule_from_name() {
        assert_eq!(RenameRule::from_name("snake_case"), Some(RenameRule::SnakeCase));
        assert_eq!("PascalCase".parse::<RenameRule>(), Ok(RenameRule::PascalCase));
        assert!(RenameRule::from_name("Title Case").is_none());
    }

    #[test]
    fn test_container_attrs() {
        let input: DeriveInput = parse_quote! {
            #[config(rename_all = "kebab-case", defaults = "base_config")]
            struct Config {
                pub log_level: String,
            }
        };

        let attrs = ContainerAttrs::from_derive_input(&input).unwrap();
        assert_eq!(attrs.ident, "Config");
        assert_eq!(attrs.rename_all, Some(RenameRule::KebabCase));
        assert_eq!(attrs.defaults.as_deref(), Some("base_config"));
    }

    #[test]
    fn test_unknown_container_attr_is_rejected() {
        let input: DeriveInput = parse_quote! {
            #[config(colour = "blue")]
            struct Config;
        };

        assert!(ContainerAttrs::from_derive_input(&input).is_err());
    }

    #[test]
    fn test_field_attrs() {
        let item: ItemStruct = parse_quote! {
            struct Config {
                #[config(rename = "stars", tags = "unit:\"count\"")]
                pub stars_count: u32,
                #[config(embed)]
                pub base: Base,
                #[config(skip)]
                pub cache: Cache,
                hidden: bool,
            }
        };

        let fields: Vec<FieldAttrs> = item
            .fields
            .iter()
            .map(|f| FieldAttrs::from_field(f).unwrap())
            .collect();

        assert_eq!(fields[0].rename.as_deref(), Some("stars"));
        assert_eq!(fields[0].tags.as_deref(), Some("unit:\"count\""));
        assert!(fields[1].embed);
        assert!(fields[2].skip);
        assert!(fields[0].is_exported());
        assert!(!fields[3].is_exported());
    }

    #[test]
    fn test_restricted_visibility_is_exported() {
        let item: ItemStruct = parse_quote! {
            struct Config {
                pub(crate) port: u16,
            }
        };

        let field = FieldAttrs::from_field(&item.fields.iter().next().unwrap().clone()).unwrap();
        assert!(field.is_exported());
    }

    #[test]
    fn test_self_restricted_visibility_is_private() {
        let item: ItemStruct = parse_quote! {
            struct Config {
                pub(super) port: u16,
                pub(self) secret: String,
                pub(in self) token: String,
            }
        };

        let exported: Vec<bool> = item
            .fields
            .iter()
            .map(|f| FieldAttrs::from_field(f).unwrap().is_exported())
            .collect();
        assert_eq!(exported, vec![true, false, false]);
    }
}
