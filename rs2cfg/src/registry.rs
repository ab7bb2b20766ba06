//! Registries of distilled descriptors.
//!
//! Registries are owned by a [`GenerationSession`] and live for a single
//! generation. Nothing is shared between sessions.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::{EnumDescriptor, StructDescriptor, TypeIdentity, TypeRef};

/// Lookup from type identity to struct descriptor.
#[derive(Debug, Default)]
pub struct StructRegistry {
    structs: BTreeMap<TypeIdentity, StructDescriptor>,
}

impl StructRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same identity.
    pub fn register(&mut self, descriptor: StructDescriptor) {
        self.structs.insert(descriptor.identity.clone(), descriptor);
    }

    pub fn get(&self, identity: &TypeIdentity) -> Option<&StructDescriptor> {
        self.structs.get(identity)
    }

    pub fn contains(&self, identity: &TypeIdentity) -> bool {
        self.structs.contains_key(identity)
    }

    /// All registered descriptors, ordered by identity.
    pub fn structs(&self) -> impl Iterator<Item = &StructDescriptor> {
        self.structs.values()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Registered struct types referenced by the fields of `identity`.
    pub fn dependencies(&self, identity: &TypeIdentity) -> Vec<&TypeIdentity> {
        let Some(descriptor) = self.structs.get(identity) else {
            return Vec::new();
        };

        let mut seen = BTreeSet::new();
        descriptor
            .fields
            .iter()
            .filter_map(|field| match &field.ty {
                TypeRef::Named(id) if self.structs.contains_key(id) => Some(id),
                _ => None,
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Detect reference cycles and return the cycle path if found.
    ///
    /// The returned path starts and ends with the same type.
    pub fn detect_cycles(&self) -> Option<Vec<String>> {
        let mut visited = BTreeSet::new();
        let mut path = Vec::new();

        for identity in self.structs.keys() {
            if !visited.contains(identity) {
                if let Some(cycle) = self.find_cycle(identity, &mut visited, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn find_cycle<'a>(
        &'a self,
        identity: &'a TypeIdentity,
        visited: &mut BTreeSet<&'a TypeIdentity>,
        path: &mut Vec<&'a TypeIdentity>,
    ) -> Option<Vec<String>> {
        if let Some(start) = path.iter().position(|id| *id == identity) {
            let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
            cycle.push(identity.to_string());
            return Some(cycle);
        }

        if visited.contains(identity) {
            return None;
        }

        path.push(identity);
        for dep in self.dependencies(identity) {
            if let Some(cycle) = self.find_cycle(dep, visited, path) {
                return Some(cycle);
            }
        }
        path.pop();
        visited.insert(identity);

        None
    }
}

/// Lookup from type identity to enum descriptor.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    enums: BTreeMap<TypeIdentity, EnumDescriptor>,
}

impl EnumRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: EnumDescriptor) {
        self.enums.insert(descriptor.identity.clone(), descriptor);
    }

    pub fn get(&self, identity: &TypeIdentity) -> Option<&EnumDescriptor> {
        self.enums.get(identity)
    }

    pub fn contains(&self, identity: &TypeIdentity) -> bool {
        self.enums.contains_key(identity)
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

/// Caller-owned state of one generation: the struct and enum registries.
#[derive(Debug, Default)]
pub struct GenerationSession {
    pub structs: StructRegistry,
    pub enums: EnumRegistry,
}

impl GenerationSession {
    /// Create a session with empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the enum behind a type reference.
    pub fn enum_of(&self, ty: &TypeRef) -> Option<&EnumDescriptor> {
        ty.identity().and_then(|id| self.enums.get(id))
    }

    /// Look up the struct behind a type reference.
    pub fn struct_of(&self, ty: &TypeRef) -> Option<&StructDescriptor> {
        ty.identity().and_then(|id| self.structs.get(id))
    }
}
