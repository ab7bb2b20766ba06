//! Schema provider holding descriptors built in code.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::{Declaration, SchemaProvider};
use crate::error::DistillError;
use crate::schema::{EnumDescriptor, StructDescriptor, TypeIdentity};

/// Serves descriptors registered programmatically.
///
/// Useful when the configuration types live in a crate whose sources are not
/// at hand, or in tests. Defaults usually come from the type itself:
///
/// ```
/// use rs2cfg::distiller::StaticSchemaProvider;
/// use rs2cfg::schema::{FieldDescriptor, ScalarKind, StructDescriptor, TypeIdentity, TypeRef};
///
/// #[derive(serde::Serialize, Default)]
/// struct Server {
///     port: u16,
/// }
///
/// let defaults = StaticSchemaProvider::defaults_of::<Server>().unwrap();
/// let provider = StaticSchemaProvider::new().with_struct(
///     StructDescriptor::new(TypeIdentity::new("", "Server"))
///         .with_field(FieldDescriptor::new("port", TypeRef::Scalar(ScalarKind::U16), "u16"))
///         .with_defaults(defaults),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    structs: BTreeMap<TypeIdentity, StructDescriptor>,
    enums: BTreeMap<TypeIdentity, EnumDescriptor>,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_struct(mut self, descriptor: StructDescriptor) -> Self {
        self.add_struct(descriptor);
        self
    }

    pub fn with_enum(mut self, descriptor: EnumDescriptor) -> Self {
        self.add_enum(descriptor);
        self
    }

    pub fn add_struct(&mut self, descriptor: StructDescriptor) {
        self.structs.insert(descriptor.identity.clone(), descriptor);
    }

    pub fn add_enum(&mut self, descriptor: EnumDescriptor) {
        self.enums.insert(descriptor.identity.clone(), descriptor);
    }

    /// Serialize `T::default()` into a defaults tree.
    pub fn defaults_of<T: Serialize + Default>() -> Result<Value, DistillError> {
        serde_json::to_value(T::default())
            .map_err(|e| DistillError::attribute(std::any::type_name::<T>(), e.to_string()))
    }

    fn identities(&self) -> impl Iterator<Item = &TypeIdentity> {
        self.structs.keys().chain(self.enums.keys())
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn locate(&self, name: &str) -> Result<TypeIdentity, DistillError> {
        let (namespace, bare) = match name.rsplit_once("::") {
            Some(("crate", bare)) => (Some(""), bare),
            Some((namespace, bare)) => (Some(namespace.strip_prefix("crate::").unwrap_or(namespace)), bare),
            None => (None, name),
        };

        let matches: Vec<&TypeIdentity> = self
            .identities()
            .filter(|id| id.name == bare)
            .filter(|id| namespace.map_or(true, |ns| id.namespace == ns))
            .collect();

        match matches.as_slice() {
            [id] => Ok((*id).clone()),
            [] => Err(DistillError::resolution(name, "no descriptor registered under this name")),
            many => {
                let names: Vec<String> = many.iter().map(|id| id.to_string()).collect();
                Err(DistillError::resolution(
                    name,
                    format!("matches {}; use a qualified path", names.join(", ")),
                ))
            }
        }
    }

    fn resolve(&self, identity: &TypeIdentity) -> Result<Declaration, DistillError> {
        if let Some(descriptor) = self.structs.get(identity) {
            return Ok(Declaration::Struct(descriptor.clone()));
        }
        if let Some(descriptor) = self.enums.get(identity) {
            return Ok(Declaration::Enum(descriptor.clone()));
        }
        Err(DistillError::resolution(
            identity.to_string(),
            "no descriptor registered under this name",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Limits {
        burst: u32,
        name: Option<String>,
    }

    impl Default for Limits {
        fn default() -> Self {
            Self {
                burst: 10,
                name: None,
            }
        }
    }

    fn provider() -> StaticSchemaProvider {
        StaticSchemaProvider::new()
            .with_struct(StructDescriptor::new(TypeIdentity::new("", "Config")))
            .with_struct(StructDescriptor::new(TypeIdentity::new("net", "Config")))
            .with_struct(StructDescriptor::new(TypeIdentity::new("net", "Remote")))
            .with_enum(EnumDescriptor::new(TypeIdentity::new("", "Level")))
    }

    #[test]
    fn test_defaults_of_serializes_default_instance() {
        let value = StaticSchemaProvider::defaults_of::<Limits>().unwrap();
        assert_eq!(value, json!({"burst": 10, "name": null}));
    }

    #[test]
    fn test_locate_bare_and_qualified() {
        let provider = provider();

        assert_eq!(
            provider.locate("Remote").unwrap(),
            TypeIdentity::new("net", "Remote")
        );
        assert_eq!(
            provider.locate("net::Config").unwrap(),
            TypeIdentity::new("net", "Config")
        );
        assert_eq!(
            provider.locate("crate::Config").unwrap(),
            TypeIdentity::new("", "Config")
        );
        assert!(provider.locate("Config").is_err());
        assert!(provider.locate("Missing").is_err());
    }

    #[test]
    fn test_resolve() {
        let provider = provider();

        assert!(matches!(
            provider.resolve(&TypeIdentity::new("", "Level")),
            Ok(Declaration::Enum(_))
        ));
        assert!(matches!(
            provider.resolve(&TypeIdentity::new("net", "Remote")),
            Ok(Declaration::Struct(_))
        ));
        assert!(provider.resolve(&TypeIdentity::new("", "Remote")).is_err());
    }
}
