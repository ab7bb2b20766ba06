//! Field type mapping from the Rust AST to field layouts.
//!
//! This module handles:
//! - Scalars (bool, integers, floats, char, strings and paths)
//! - Transparent wrappers (Option, Box, Rc, Arc, Cow, references)
//! - Sequences (Vec, VecDeque, LinkedList, sets, arrays, slices)
//! - Maps (HashMap, BTreeMap, IndexMap) with scalar keys
//! - Named types, resolved later by the schema provider

use quote::ToTokens;
use syn::{Expr, ExprLit, GenericArgument, Lit, Path, PathArguments, Type};

use crate::schema::{FieldLayout, ScalarKind};

/// Reason a field type has no configuration representation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("collections of collections are not supported")]
    NestedCollection,

    #[error("tuple types are not supported")]
    Tuple,

    #[error("map keys must be scalars")]
    MapKey,

    #[error("generic type arguments are not supported")]
    Generic,

    #[error("missing type argument for {0}")]
    MissingGeneric(String),

    #[error("unsupported type form")]
    Unsupported,
}

/// The value or element type of a field, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Scalar(ScalarKind),
    /// A path naming a declared struct or enum.
    Named(Path),
}

/// Mapped shape of a field type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub layout: FieldLayout,
    pub element: ElementType,
}

const WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow"];
const SEQUENCES: &[&str] = &["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet", "IndexSet"];
const MAPS: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];

/// Map a declared field type to its layout and element type.
pub fn map_field_type(ty: &Type) -> Result<FieldType, TypeError> {
    let ty = unwrap_transparent(ty)?;

    match ty {
        Type::Array(array) => sequence(&array.elem),
        Type::Slice(slice) => sequence(&slice.elem),
        Type::Path(type_path) => {
            let ident = last_ident(&type_path.path);
            if SEQUENCES.contains(&ident.as_str()) {
                let args = type_args(&type_path.path);
                let elem = args
                    .first()
                    .ok_or_else(|| TypeError::MissingGeneric(ident.clone()))?;
                sequence(elem)
            } else if MAPS.contains(&ident.as_str()) {
                let args = type_args(&type_path.path);
                let (key, value) = match args.as_slice() {
                    [key, value, ..] => (*key, *value),
                    _ => return Err(TypeError::MissingGeneric(ident)),
                };
                if !matches!(element(key)?, ElementType::Scalar(_)) {
                    return Err(TypeError::MapKey);
                }
                Ok(FieldType {
                    layout: FieldLayout::Map,
                    element: element(value)?,
                })
            } else {
                Ok(FieldType {
                    layout: FieldLayout::Single,
                    element: element(ty)?,
                })
            }
        }
        Type::Tuple(_) => Err(TypeError::Tuple),
        _ => Err(TypeError::Unsupported),
    }
}

fn sequence(elem: &Type) -> Result<FieldType, TypeError> {
    Ok(FieldType {
        layout: FieldLayout::Array,
        element: element(elem)?,
    })
}

/// Map a collection element, which must be a scalar or a named type.
fn element(ty: &Type) -> Result<ElementType, TypeError> {
    match unwrap_transparent(ty)? {
        Type::Path(type_path) => {
            if type_path.qself.is_some() {
                return Err(TypeError::Unsupported);
            }
            let ident = last_ident(&type_path.path);
            if SEQUENCES.contains(&ident.as_str()) || MAPS.contains(&ident.as_str()) {
                return Err(TypeError::NestedCollection);
            }
            if let Some(kind) = ScalarKind::from_ident(&ident) {
                return Ok(ElementType::Scalar(kind));
            }
            if !type_args(&type_path.path).is_empty() {
                return Err(TypeError::Generic);
            }
            Ok(ElementType::Named(type_path.path.clone()))
        }
        Type::Array(_) | Type::Slice(_) => Err(TypeError::NestedCollection),
        Type::Tuple(_) => Err(TypeError::Tuple),
        _ => Err(TypeError::Unsupported),
    }
}

/// Strip references, parentheses and transparent wrappers.
fn unwrap_transparent(ty: &Type) -> Result<&Type, TypeError> {
    match ty {
        Type::Reference(reference) => unwrap_transparent(&reference.elem),
        Type::Paren(paren) => unwrap_transparent(&paren.elem),
        Type::Group(group) => unwrap_transparent(&group.elem),
        Type::Path(type_path) => {
            let ident = last_ident(&type_path.path);
            if !WRAPPERS.contains(&ident.as_str()) {
                return Ok(ty);
            }
            let args = type_args(&type_path.path);
            let inner = args.first().ok_or(TypeError::MissingGeneric(ident))?;
            unwrap_transparent(inner)
        }
        _ => Ok(ty),
    }
}

fn last_ident(path: &Path) -> String {
    path.segments
        .last()
        .map(|segment| segment.ident.to_string())
        .unwrap_or_default()
}

/// Type arguments of the last path segment, lifetimes skipped.
fn type_args(path: &Path) -> Vec<&Type> {
    let Some(segment) = path.segments.last() else {
        return Vec::new();
    };
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Render a type the way it is written in the source, without lifetimes.
pub fn type_display(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => path_display(&type_path.path),
        Type::Reference(reference) => {
            let mutability = if reference.mutability.is_some() { "mut " } else { "" };
            format!("&{}{}", mutability, type_display(&reference.elem))
        }
        Type::Array(array) => format!(
            "[{}; {}]",
            type_display(&array.elem),
            expr_display(&array.len)
        ),
        Type::Slice(slice) => format!("[{}]", type_display(&slice.elem)),
        Type::Tuple(tuple) => {
            let elems: Vec<_> = tuple.elems.iter().map(type_display).collect();
            format!("({})", elems.join(", "))
        }
        Type::Paren(paren) => type_display(&paren.elem),
        Type::Group(group) => type_display(&group.elem),
        other => other.to_token_stream().to_string(),
    }
}

/// Render a path with its type arguments.
pub fn path_display(path: &Path) -> String {
    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|segment| {
            let args: Vec<String> = match &segment.arguments {
                PathArguments::AngleBracketed(args) => args
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        GenericArgument::Type(ty) => Some(type_display(ty)),
                        GenericArgument::Const(expr) => Some(expr_display(expr)),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            if args.is_empty() {
                segment.ident.to_string()
            } else {
                format!("{}<{}>", segment.ident, args.join(", "))
            }
        })
        .collect();

    let prefix = if path.leading_colon.is_some() { "::" } else { "" };
    format!("{}{}", prefix, segments.join("::"))
}

fn expr_display(expr: &Expr) -> String {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_digits().to_string(),
        Expr::Path(path) => path_display(&path.path),
        other => other.to_token_stream().to_string(),
    }
}
