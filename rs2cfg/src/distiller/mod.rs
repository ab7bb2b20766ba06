//! Schema distillation.
//!
//! This module provides:
//! - The [`SchemaProvider`] trait, the seam between declared types and descriptors
//! - [`SourceSchemaProvider`], which reads declarations from Rust source with `syn`
//! - [`StaticSchemaProvider`], which serves descriptors built in code
//! - The [`Distiller`], which walks a root type and fills a [`GenerationSession`]

pub mod attributes;
mod defaults;
mod fields;
mod index;
mod memory;
mod serde_compat;
mod source;

pub use attributes::RenameRule;
pub use index::namespace_for_path;
pub use memory::StaticSchemaProvider;
pub use source::SourceSchemaProvider;

use std::collections::{BTreeSet, VecDeque};

use crate::error::DistillError;
use crate::registry::GenerationSession;
use crate::schema::{EnumDescriptor, StructDescriptor, TypeIdentity, TypeRef};

/// A resolved type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Struct(StructDescriptor),
    Enum(EnumDescriptor),
}

/// Source of type declarations.
pub trait SchemaProvider {
    /// Find the identity of a type from a user-supplied name, bare or `::`-qualified.
    fn locate(&self, name: &str) -> Result<TypeIdentity, DistillError>;

    /// Describe a declared type.
    fn resolve(&self, identity: &TypeIdentity) -> Result<Declaration, DistillError>;
}

impl<P: SchemaProvider + ?Sized> SchemaProvider for &P {
    fn locate(&self, name: &str) -> Result<TypeIdentity, DistillError> {
        (**self).locate(name)
    }

    fn resolve(&self, identity: &TypeIdentity) -> Result<Declaration, DistillError> {
        (**self).resolve(identity)
    }
}

/// Registers a root struct and every type reachable from it.
pub struct Distiller<'a, P: SchemaProvider + ?Sized> {
    provider: &'a P,
    session: &'a mut GenerationSession,
}

impl<'a, P: SchemaProvider + ?Sized> Distiller<'a, P> {
    pub fn new(provider: &'a P, session: &'a mut GenerationSession) -> Self {
        Self { provider, session }
    }

    /// Walk the root type breadth-first, registering structs and enums.
    ///
    /// Returns the identity of the root struct. Fails on the first
    /// unresolvable declaration and on reference cycles.
    pub fn distill(&mut self, root: &str) -> Result<TypeIdentity, DistillError> {
        let root_id = self.provider.locate(root)?;
        tracing::debug!(root = %root_id, "distilling");

        let mut queue = VecDeque::from([root_id.clone()]);
        let mut seen = BTreeSet::from([root_id.clone()]);
        let mut embeddings = Vec::new();

        while let Some(id) = queue.pop_front() {
            match self.provider.resolve(&id)? {
                Declaration::Struct(descriptor) => {
                    for field in &descriptor.fields {
                        let TypeRef::Named(target) = &field.ty else {
                            continue;
                        };
                        if field.embedded {
                            embeddings.push((id.clone(), target.clone()));
                        }
                        if seen.insert(target.clone()) {
                            queue.push_back(target.clone());
                        }
                    }
                    tracing::debug!(type_name = %id, "struct registered");
                    self.session.structs.register(descriptor);
                }
                Declaration::Enum(descriptor) => {
                    if id == root_id {
                        return Err(DistillError::resolution(
                            root,
                            "root type must be a struct, found an enum",
                        ));
                    }
                    tracing::debug!(type_name = %id, "enum registered");
                    self.session.enums.register(descriptor);
                }
            }
        }

        for (owner, target) in embeddings {
            if !self.session.structs.contains(&target) {
                return Err(DistillError::unsupported(
                    owner.to_string(),
                    target.name.clone(),
                    format!("embedded type '{}' is not a struct", target),
                ));
            }
        }

        if let Some(chain) = self.session.structs.detect_cycles() {
            return Err(DistillError::Cycle { chain });
        }

        tracing::debug!(
            root = %root_id,
            structs = self.session.structs.len(),
            enums = self.session.enums.len(),
            "distillation complete"
        );
        Ok(root_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distill(source: &str, root: &str) -> Result<(TypeIdentity, GenerationSession), DistillError> {
        let provider = SourceSchemaProvider::from_source(source)?;
        let mut session = GenerationSession::new();
        let id = Distiller::new(&provider, &mut session).distill(root)?;
        Ok((id, session))
    }

    #[test]
    fn test_registers_reachable_types() {
        let (root, session) = distill(
            r#"
            pub struct Config {
                pub server: Server,
                pub peers: Vec<Peer>,
                pub routes: std::collections::BTreeMap<String, Route>,
                #[serde(flatten)]
                pub base: Base,
            }
            pub struct Server { pub level: Level }
            pub struct Peer { pub addr: String }
            pub struct Route { pub target: String }
            pub struct Base { pub id: u32 }
            pub enum Level { Low, High }
            pub struct Unused { pub x: u8 }
            "#,
            "Config",
        )
        .unwrap();

        assert_eq!(root, TypeIdentity::new("", "Config"));
        assert_eq!(session.structs.len(), 5);
        assert_eq!(session.enums.len(), 1);
        assert!(!session.structs.contains(&TypeIdentity::new("", "Unused")));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let err = distill(
            r#"
            pub struct A { pub b: Option<Box<B>> }
            pub struct B { pub a: Vec<A> }
            "#,
            "A",
        )
        .unwrap_err();

        match err {
            DistillError::Cycle { chain } => assert_eq!(chain, vec!["A", "B", "A"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_self_embedding_is_a_cycle() {
        let err = distill(
            r#"
            pub struct Node {
                #[config(embed)]
                pub inner: Box<Node>,
            }
            "#,
            "Node",
        )
        .unwrap_err();

        assert!(matches!(err, DistillError::Cycle { .. }));
    }

    #[test]
    fn test_embedding_an_enum_is_unsupported() {
        let err = distill(
            r#"
            pub struct Config {
                #[serde(flatten)]
                pub level: Level,
            }
            pub enum Level { Low }
            "#,
            "Config",
        )
        .unwrap_err();

        assert!(matches!(err, DistillError::UnsupportedType { .. }));
    }

    #[test]
    fn test_root_must_be_a_struct() {
        let err = distill("pub enum Level { Low }", "Level").unwrap_err();
        assert!(matches!(err, DistillError::SchemaResolution { .. }));
    }

    #[test]
    fn test_missing_root() {
        let err = distill("pub struct Config;", "Settings").unwrap_err();
        assert!(err.to_string().contains("Settings"));
    }

    #[test]
    fn test_static_provider_through_reference() {
        let provider = StaticSchemaProvider::new()
            .with_struct(StructDescriptor::new(TypeIdentity::new("", "Empty")));
        let mut session = GenerationSession::new();

        let id = Distiller::new(&&provider, &mut session).distill("Empty").unwrap();
        assert_eq!(id.name, "Empty");
        assert_eq!(session.structs.len(), 1);
    }
}
