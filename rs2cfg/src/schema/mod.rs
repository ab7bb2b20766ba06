//! Schema model shared by the distiller and the renderers.
//!
//! These are passive descriptors: they are built once per generation pass by
//! the [`Distiller`](crate::distiller::Distiller) and never mutated afterwards.

mod tags;

pub use tags::{Tags, RENAME_TAG};

use serde_json::Value;
use std::fmt;

// =============================================================================
// Type identity
// =============================================================================

/// Stable identity of a declared type: its module path plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdentity {
    /// `::`-joined module path, empty for the crate root.
    pub namespace: String,
    /// Declared type name.
    pub name: String,
}

impl TypeIdentity {
    /// Create a new identity.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The type name without its module path.
    pub fn bare_name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.namespace, self.name)
        }
    }
}

// =============================================================================
// Scalar kinds
// =============================================================================

/// Closed set of scalar kinds a configuration field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Char,
    String,
}

impl ScalarKind {
    /// Map a type identifier to its scalar kind.
    ///
    /// Path-like and owned string types all collapse to [`ScalarKind::String`].
    pub fn from_ident(ident: &str) -> Option<Self> {
        let kind = match ident {
            "bool" => Self::Bool,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "i128" => Self::I128,
            "isize" => Self::Isize,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "usize" => Self::Usize,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "char" => Self::Char,
            "String" | "str" | "PathBuf" | "Path" | "OsString" | "OsStr" => Self::String,
            _ => return None,
        };
        Some(kind)
    }

    /// The zero literal used when a field has no explicit default.
    pub fn zero_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::I8
            | Self::I16
            | Self::I32
            | Self::I64
            | Self::I128
            | Self::Isize
            | Self::U8
            | Self::U16
            | Self::U32
            | Self::U64
            | Self::U128
            | Self::Usize => Value::from(0),
            Self::F32 | Self::F64 => Value::from(0.0),
            Self::Char | Self::String => Value::String(String::new()),
        }
    }

    /// Whether values of this kind render as quoted strings.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Char | Self::String)
    }

    /// Whether values of this kind are floating point numbers.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether values of this kind are integers.
    pub fn is_integer(self) -> bool {
        !self.is_textual() && !self.is_float() && self != Self::Bool
    }
}

/// The value type of a field, or the element type of a collection field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A built-in scalar.
    Scalar(ScalarKind),
    /// A declared struct or enum.
    Named(TypeIdentity),
}

impl TypeRef {
    /// The scalar kind, if this is a scalar.
    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            TypeRef::Scalar(kind) => Some(*kind),
            TypeRef::Named(_) => None,
        }
    }

    /// The declared identity, if this is a named type.
    pub fn identity(&self) -> Option<&TypeIdentity> {
        match self {
            TypeRef::Scalar(_) => None,
            TypeRef::Named(id) => Some(id),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Scalar(kind) => write!(f, "{:?}", kind),
            TypeRef::Named(id) => write!(f, "{}", id),
        }
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// Shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLayout {
    #[default]
    Single,
    Array,
    Map,
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared identifier, empty when the field is embedded.
    pub name: String,
    /// Value type for `Single` fields, element type for `Array` and `Map`.
    pub ty: TypeRef,
    /// The type as written in the source, used for doc annotations.
    pub type_name: String,
    pub layout: FieldLayout,
    /// Embedded fields have their own fields promoted into the parent.
    pub embedded: bool,
    pub tags: Tags,
    /// Leading and trailing doc text joined by newlines.
    pub doc: String,
}

impl FieldDescriptor {
    /// Create a named single-valued field.
    pub fn new(name: impl Into<String>, ty: TypeRef, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            type_name: type_name.into(),
            layout: FieldLayout::Single,
            embedded: false,
            tags: Tags::default(),
            doc: String::new(),
        }
    }

    /// Create an embedded field of the given struct type.
    pub fn embedded(identity: TypeIdentity) -> Self {
        let type_name = identity.name.clone();
        Self {
            name: String::new(),
            ty: TypeRef::Named(identity),
            type_name,
            layout: FieldLayout::Single,
            embedded: true,
            tags: Tags::default(),
            doc: String::new(),
        }
    }

    pub fn with_layout(mut self, layout: FieldLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key, value);
        self
    }

    /// Element type for collection layouts.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self.layout {
            FieldLayout::Single => None,
            FieldLayout::Array | FieldLayout::Map => Some(&self.ty),
        }
    }

    /// The name this field is serialized under.
    pub fn serialized_name(&self) -> &str {
        self.tags.get(RENAME_TAG).unwrap_or(&self.name)
    }

    /// Key of this field inside its parent's defaults tree.
    ///
    /// Embedded fields are keyed by the embedded type's bare name.
    pub fn default_key(&self) -> &str {
        if self.embedded {
            match &self.ty {
                TypeRef::Named(id) => id.bare_name(),
                TypeRef::Scalar(_) => &self.type_name,
            }
        } else {
            self.serialized_name()
        }
    }
}

/// One declared record type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDescriptor {
    pub identity: TypeIdentity,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    pub doc: String,
    /// Ordered default tree, `None` when the type has no defaults factory.
    pub defaults: Option<Value>,
}

impl StructDescriptor {
    pub fn new(identity: TypeIdentity) -> Self {
        Self {
            identity,
            fields: Vec::new(),
            doc: String::new(),
            defaults: None,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

/// One named constant of an enum type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    /// Literal written to configuration files for this constant.
    pub value: Value,
    pub doc: String,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>, value: Value, doc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            doc: doc.into(),
        }
    }

    /// Doc text collapsed to a single line.
    pub fn inline_doc(&self) -> String {
        self.doc
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A type declaring a closed set of constants.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub identity: TypeIdentity,
    /// Constants in declaration order.
    pub constants: Vec<EnumConstant>,
}

impl EnumDescriptor {
    pub fn new(identity: TypeIdentity) -> Self {
        Self {
            identity,
            constants: Vec::new(),
        }
    }

    pub fn with_constant(mut self, constant: EnumConstant) -> Self {
        self.constants.push(constant);
        self
    }

    /// First declared constant, used when a field has no default.
    pub fn first(&self) -> Option<&EnumConstant> {
        self.constants.first()
    }

    /// Find the constant with the given declared or serialized name.
    pub fn constant(&self, name: &str) -> Option<&EnumConstant> {
        self.constants.iter().find(|c| c.name == name)
    }
}
