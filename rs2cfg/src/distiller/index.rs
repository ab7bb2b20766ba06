//! Index of the items declared across a set of Rust source files.
//!
//! Files are parsed once with `syn`; the index keeps the structs, enums,
//! constants, functions and impl blocks of every module together with the
//! `use` declarations needed to resolve paths the way the compiler would.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use syn::{ImplItem, ImplItemFn, Item, ItemEnum, ItemFn, ItemStruct, Type, UseTree};

use crate::error::DistillError;
use crate::schema::TypeIdentity;

/// Result of resolving a path against the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(TypeIdentity),
    /// Several declarations match and nothing disambiguates them.
    Ambiguous(Vec<TypeIdentity>),
    Missing,
}

/// A value item a default expression may reference.
#[derive(Debug, Clone)]
pub enum ValueItem {
    /// A `const` or `static` with its declared type.
    Const { ty: Box<Type>, expr: Box<syn::Expr> },
    Fn(Box<ItemFn>),
}

/// Imports declared by one module.
#[derive(Debug, Clone, Default)]
struct ModuleScope {
    /// Alias to absolute path segments.
    imports: BTreeMap<String, Vec<String>>,
    /// Absolute module paths imported with `*`.
    globs: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
struct ImplEntry {
    namespace: String,
    self_ty: syn::Path,
    trait_name: Option<String>,
    fns: Vec<ImplItemFn>,
}

/// Parsed items of every added source file.
#[derive(Debug, Default)]
pub struct SourceIndex {
    modules: BTreeMap<String, ModuleScope>,
    structs: BTreeMap<TypeIdentity, ItemStruct>,
    enums: BTreeMap<TypeIdentity, ItemEnum>,
    values: BTreeMap<TypeIdentity, ValueItem>,
    impls: Vec<ImplEntry>,
}

impl SourceIndex {
    /// Parse a file and index its items under `namespace`.
    pub fn add_file(&mut self, namespace: &str, path: &Path, content: &str) -> Result<(), DistillError> {
        let file = syn::parse_file(content).map_err(|e| {
            let start = e.span().start();
            DistillError::parse(path.to_path_buf(), start.line, start.column + 1, e.to_string())
        })?;

        tracing::debug!(namespace, file = %path.display(), items = file.items.len(), "indexing source");
        self.add_items(namespace, &file.items);
        Ok(())
    }

    fn add_items(&mut self, namespace: &str, items: &[Item]) {
        self.modules.entry(namespace.to_string()).or_default();
        let ns_segments = split_namespace(namespace);

        for item in items {
            match item {
                Item::Struct(item_struct) => {
                    let id = TypeIdentity::new(namespace, item_struct.ident.to_string());
                    self.structs.insert(id, item_struct.clone());
                }
                Item::Enum(item_enum) => {
                    let id = TypeIdentity::new(namespace, item_enum.ident.to_string());
                    self.enums.insert(id, item_enum.clone());
                }
                Item::Const(item_const) => {
                    let id = TypeIdentity::new(namespace, item_const.ident.to_string());
                    self.values.insert(
                        id,
                        ValueItem::Const {
                            ty: item_const.ty.clone(),
                            expr: item_const.expr.clone(),
                        },
                    );
                }
                Item::Static(item_static) => {
                    let id = TypeIdentity::new(namespace, item_static.ident.to_string());
                    self.values.insert(
                        id,
                        ValueItem::Const {
                            ty: item_static.ty.clone(),
                            expr: item_static.expr.clone(),
                        },
                    );
                }
                Item::Fn(item_fn) => {
                    let id = TypeIdentity::new(namespace, item_fn.sig.ident.to_string());
                    self.values.insert(id, ValueItem::Fn(Box::new(item_fn.clone())));
                }
                Item::Impl(item_impl) => {
                    let Type::Path(self_ty) = item_impl.self_ty.as_ref() else {
                        continue;
                    };
                    let trait_name = item_impl.trait_.as_ref().and_then(|(_, path, _)| {
                        path.segments.last().map(|s| s.ident.to_string())
                    });
                    let fns = item_impl
                        .items
                        .iter()
                        .filter_map(|item| match item {
                            ImplItem::Fn(f) => Some(f.clone()),
                            _ => None,
                        })
                        .collect();
                    self.impls.push(ImplEntry {
                        namespace: namespace.to_string(),
                        self_ty: self_ty.path.clone(),
                        trait_name,
                        fns,
                    });
                }
                Item::Use(item_use) => {
                    let scope = self.modules.entry(namespace.to_string()).or_default();
                    collect_use(&item_use.tree, Vec::new(), &ns_segments, scope);
                }
                Item::Mod(item_mod) => {
                    if let Some((_, items)) = &item_mod.content {
                        let child = join_namespace(namespace, &item_mod.ident.to_string());
                        self.add_items(&child, items);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn struct_item(&self, id: &TypeIdentity) -> Option<&ItemStruct> {
        self.structs.get(id)
    }

    pub fn enum_item(&self, id: &TypeIdentity) -> Option<&ItemEnum> {
        self.enums.get(id)
    }

    pub fn value_item(&self, id: &TypeIdentity) -> Option<&ValueItem> {
        self.values.get(id)
    }

    pub fn is_struct(&self, id: &TypeIdentity) -> bool {
        self.structs.contains_key(id)
    }

    pub fn is_enum(&self, id: &TypeIdentity) -> bool {
        self.enums.contains_key(id)
    }

    pub fn is_type(&self, id: &TypeIdentity) -> bool {
        self.is_struct(id) || self.is_enum(id)
    }

    /// Identities of every declared struct and enum.
    pub fn type_identities(&self) -> impl Iterator<Item = &TypeIdentity> {
        let mut ids: BTreeSet<&TypeIdentity> = self.structs.keys().collect();
        ids.extend(self.enums.keys());
        ids.into_iter()
    }

    /// The `fn default()` of an `impl Default for T` block.
    pub fn default_impl(&self, id: &TypeIdentity) -> Option<(&str, &ImplItemFn)> {
        self.impls
            .iter()
            .filter(|entry| entry.trait_name.as_deref() == Some("Default"))
            .filter(|entry| self.resolves_to(entry, id))
            .find_map(|entry| {
                entry
                    .fns
                    .iter()
                    .find(|f| f.sig.ident == "default")
                    .map(|f| (entry.namespace.as_str(), f))
            })
    }

    /// An associated function of `T` taking no arguments, such as `T::new()`.
    pub fn associated_fn(&self, id: &TypeIdentity, name: &str) -> Option<(&str, &ImplItemFn)> {
        self.impls
            .iter()
            .filter(|entry| self.resolves_to(entry, id))
            .find_map(|entry| {
                entry
                    .fns
                    .iter()
                    .find(|f| f.sig.ident == name && f.sig.inputs.is_empty())
                    .map(|f| (entry.namespace.as_str(), f))
            })
    }

    fn resolves_to(&self, entry: &ImplEntry, id: &TypeIdentity) -> bool {
        let segments = path_segments(&entry.self_ty);
        self.resolve(&entry.namespace, &segments, |candidate| self.is_type(candidate))
            == Lookup::Found(id.clone())
    }

    /// Resolve a type path written inside `namespace`.
    pub fn resolve_type(&self, namespace: &str, segments: &[String]) -> Lookup {
        self.resolve(namespace, segments, |id| self.is_type(id))
    }

    /// Resolve a const, static or function path written inside `namespace`.
    pub fn resolve_value(&self, namespace: &str, segments: &[String]) -> Lookup {
        self.resolve(namespace, segments, |id| self.values.contains_key(id))
    }

    /// Resolve a path using imports, then the current module, then a unique
    /// declaration anywhere in the crate.
    fn resolve<F>(&self, namespace: &str, segments: &[String], exists: F) -> Lookup
    where
        F: Fn(&TypeIdentity) -> bool,
    {
        let Some((name, prefix)) = segments.split_last() else {
            return Lookup::Missing;
        };
        let ns_segments = split_namespace(namespace);
        let scope = self.modules.get(namespace);

        let found = |module: &[String]| {
            let id = TypeIdentity::new(module.join("::"), name.clone());
            exists(&id).then_some(id)
        };

        let Some(first) = prefix.first() else {
            if let Some(target) = scope.and_then(|s| s.imports.get(name)) {
                return match target.split_last() {
                    Some((last, module)) => {
                        let id = TypeIdentity::new(module.join("::"), last.clone());
                        if exists(&id) {
                            Lookup::Found(id)
                        } else {
                            Lookup::Missing
                        }
                    }
                    None => Lookup::Missing,
                };
            }

            if let Some(id) = found(&ns_segments) {
                return Lookup::Found(id);
            }

            if let Some(scope) = scope {
                let matches: Vec<_> = scope.globs.iter().filter_map(|g| found(g)).collect();
                if let Some(lookup) = pick(matches) {
                    return lookup;
                }
            }

            let matches: Vec<_> = self
                .all_identities()
                .filter(|id| id.name == *name && exists(id))
                .cloned()
                .collect();
            return pick(matches).unwrap_or(Lookup::Missing);
        };

        let candidates: Vec<Vec<String>> = match first.as_str() {
            "crate" => vec![prefix[1..].to_vec()],
            "self" | "super" => vec![normalize(prefix, &ns_segments)],
            _ => {
                let mut candidates = Vec::new();
                if let Some(target) = scope.and_then(|s| s.imports.get(first)) {
                    let mut module = target.clone();
                    module.extend_from_slice(&prefix[1..]);
                    candidates.push(module);
                }
                let mut relative = ns_segments.clone();
                relative.extend_from_slice(prefix);
                candidates.push(relative);
                candidates.push(prefix.to_vec());
                candidates
            }
        };

        candidates
            .iter()
            .find_map(|module| found(module))
            .map(Lookup::Found)
            .unwrap_or(Lookup::Missing)
    }

    fn all_identities(&self) -> impl Iterator<Item = &TypeIdentity> {
        self.structs
            .keys()
            .chain(self.enums.keys())
            .chain(self.values.keys())
    }
}

fn pick(mut matches: Vec<TypeIdentity>) -> Option<Lookup> {
    matches.sort();
    matches.dedup();
    match matches.len() {
        0 => None,
        1 => matches.pop().map(Lookup::Found),
        _ => Some(Lookup::Ambiguous(matches)),
    }
}

/// Record the aliases introduced by a `use` tree.
fn collect_use(tree: &UseTree, mut prefix: Vec<String>, ns_segments: &[String], scope: &mut ModuleScope) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use(&path.tree, prefix, ns_segments, scope);
        }
        UseTree::Name(name) => {
            if name.ident == "self" {
                if let Some(alias) = prefix.last().cloned() {
                    scope.imports.insert(alias, normalize(&prefix, ns_segments));
                }
            } else {
                let alias = name.ident.to_string();
                prefix.push(alias.clone());
                scope.imports.insert(alias, normalize(&prefix, ns_segments));
            }
        }
        UseTree::Rename(rename) => {
            if rename.ident != "self" {
                prefix.push(rename.ident.to_string());
            }
            scope
                .imports
                .insert(rename.rename.to_string(), normalize(&prefix, ns_segments));
        }
        UseTree::Glob(_) => scope.globs.push(normalize(&prefix, ns_segments)),
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use(item, prefix.clone(), ns_segments, scope);
            }
        }
    }
}

/// Turn a `crate::`, `self::` or `super::` path into an absolute one.
fn normalize(path: &[String], ns_segments: &[String]) -> Vec<String> {
    match path.first().map(String::as_str) {
        Some("crate") => path[1..].to_vec(),
        Some("self") => {
            let mut out = ns_segments.to_vec();
            out.extend_from_slice(&path[1..]);
            out
        }
        Some("super") => {
            let mut out = ns_segments.to_vec();
            let mut rest = path;
            while let Some(("super", tail)) = rest.split_first().map(|(h, t)| (h.as_str(), t)) {
                out.pop();
                rest = tail;
            }
            out.extend_from_slice(rest);
            out
        }
        _ => path.to_vec(),
    }
}

/// Identifiers of a path, leading `::` dropped.
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

pub fn split_namespace(namespace: &str) -> Vec<String> {
    if namespace.is_empty() {
        Vec::new()
    } else {
        namespace.split("::").map(str::to_string).collect()
    }
}

pub fn join_namespace(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}::{}", parent, child)
    }
}

/// Namespace of a source file relative to its crate's `src/` directory.
///
/// `src/net/tcp.rs` maps to `net::tcp`; `lib.rs`, `main.rs` and `mod.rs`
/// map to their directory.
pub fn namespace_for_path(relative: &Path) -> String {
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
        .collect();

    if parts.first().map(String::as_str) == Some("src") {
        parts.remove(0);
    }

    if let Some(last) = parts.pop() {
        let stem = PathBuf::from(&last)
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or(last);
        if !matches!(stem.as_str(), "lib" | "main" | "mod") {
            parts.push(stem);
        }
    }

    parts.join("::")
}
