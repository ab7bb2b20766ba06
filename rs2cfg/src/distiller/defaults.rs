//! Static evaluation of default expressions.
//!
//! Defaults factories are never executed. Their bodies are read from the
//! parsed source and reduced to a `serde_json::Value`, following calls to
//! other factories, `const` items and enum variants. Anything the evaluator
//! does not understand is logged and left absent, so the renderers fall back
//! to zero values for it.

use proc_macro2::{Delimiter, Group, TokenStream, TokenTree};
use quote::ToTokens;
use serde_json::{Map, Value};
use syn::punctuated::Punctuated;
use syn::{
    BinOp, Block, Expr, ExprCall, ExprMethodCall, ExprRepeat, ExprStruct, Lit, Macro, Member, Pat,
    Stmt, Token, Type, UnOp,
};

use super::index::{path_segments, Lookup, SourceIndex, ValueItem};
use super::source::SourceSchemaProvider;
use crate::error::DistillError;
use crate::schema::{FieldDescriptor, FieldLayout, ScalarKind, TypeIdentity, TypeRef};

/// Nesting limit for factories, constants and locals referring to each other.
const MAX_DEPTH: usize = 64;

/// Types whose `new()` and `default()` produce an empty value.
const BUILTIN_TYPES: &[&str] = &[
    "String", "PathBuf", "OsString", "Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet",
    "IndexSet", "HashMap", "BTreeMap", "IndexMap", "Option", "Box", "Rc", "Arc", "Cow",
];

/// Smart pointers whose `new(x)` is transparent.
const POINTERS: &[&str] = &["Box", "Rc", "Arc", "Cell", "RefCell", "Mutex", "RwLock"];

/// Methods that do not change the configured value.
const TRANSPARENT_METHODS: &[&str] = &[
    "to_string",
    "to_owned",
    "into",
    "clone",
    "to_vec",
    "to_path_buf",
    "into_iter",
    "iter",
    "cloned",
    "copied",
    "collect",
    "as_str",
    "into_boxed_str",
    "into_boxed_slice",
    "unwrap",
    "expect",
    "unwrap_or_default",
];

/// Expected shape of the value an expression produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// No type information, as for discriminants and untyped constants.
    Any,
    Scalar(ScalarKind),
    Enum(TypeIdentity),
    Struct(TypeIdentity),
    Array(Box<Shape>),
    Map(Box<Shape>),
}

impl Shape {
    /// Shape of a declared field.
    pub fn of_field(field: &FieldDescriptor, index: &SourceIndex) -> Self {
        let element = match &field.ty {
            TypeRef::Scalar(kind) => Shape::Scalar(*kind),
            TypeRef::Named(id) if index.is_enum(id) => Shape::Enum(id.clone()),
            TypeRef::Named(id) => Shape::Struct(id.clone()),
        };
        match field.layout {
            FieldLayout::Single => element,
            FieldLayout::Array => Shape::Array(Box::new(element)),
            FieldLayout::Map => Shape::Map(Box::new(element)),
        }
    }

    fn element(&self) -> Shape {
        match self {
            Shape::Array(inner) | Shape::Map(inner) => inner.as_ref().clone(),
            _ => Shape::Any,
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Shape::Scalar(kind) if kind.is_float())
    }
}

/// Where an expression is evaluated: its module, `Self` and visible locals.
#[derive(Debug, Clone)]
struct Scope<'e> {
    namespace: String,
    self_ty: Option<TypeIdentity>,
    locals: Vec<(String, &'e Expr)>,
}

impl<'e> Scope<'e> {
    fn new(namespace: impl Into<String>, self_ty: Option<TypeIdentity>) -> Self {
        Self {
            namespace: namespace.into(),
            self_ty,
            locals: Vec::new(),
        }
    }
}

/// Evaluates default expressions against a [`SourceSchemaProvider`].
pub struct Evaluator<'p> {
    provider: &'p SourceSchemaProvider,
    index: &'p SourceIndex,
    active: Vec<String>,
}

impl<'p> Evaluator<'p> {
    pub fn new(provider: &'p SourceSchemaProvider) -> Self {
        Self {
            provider,
            index: provider.index(),
            active: Vec::new(),
        }
    }

    /// Defaults tree of a struct: its `#[config(defaults)]` factory when
    /// declared, its `Default` instance otherwise.
    pub fn struct_defaults(
        &mut self,
        id: &TypeIdentity,
        factory: Option<&str>,
    ) -> Result<Option<Value>, DistillError> {
        let value = match factory {
            Some(name) => {
                let index = self.index;
                let segments: Vec<String> = name.split("::").map(str::to_string).collect();
                let item = match index.resolve_value(&id.namespace, &segments) {
                    Lookup::Found(fn_id) => index.value_item(&fn_id).map(|item| (fn_id, item)),
                    _ => None,
                };
                let Some((fn_id, ValueItem::Fn(item_fn))) = item else {
                    return Err(DistillError::attribute(
                        id.to_string(),
                        format!("defaults function '{}' not found", name),
                    ));
                };
                if !item_fn.sig.inputs.is_empty() {
                    return Err(DistillError::attribute(
                        id.to_string(),
                        format!("defaults function '{}' must take no arguments", name),
                    ));
                }
                let scope = Scope::new(fn_id.namespace.clone(), None);
                self.guarded(format!("fn {}", fn_id), |this| {
                    this.eval_block(&item_fn.block, &Shape::Struct(id.clone()), scope)
                })
            }
            None => self.default_instance(id),
        };

        match value {
            Some(Value::Object(map)) => {
                tracing::debug!(type_name = %id, keys = map.len(), "defaults evaluated");
                Ok(Some(Value::Object(map)))
            }
            Some(other) => {
                tracing::warn!(type_name = %id, value = %other, "defaults factory did not produce a struct");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Evaluate an integer expression, as used for enum discriminants.
    pub fn eval_integer(&mut self, namespace: &str, expr: &Expr) -> Option<i128> {
        let scope = Scope::new(namespace, None);
        self.eval(expr, &Shape::Any, &scope).as_ref().and_then(as_int)
    }

    /// Value of `T::default()`: an `impl Default` body or a derived instance.
    fn default_instance(&mut self, id: &TypeIdentity) -> Option<Value> {
        let index = self.index;
        if let Some((namespace, item_fn)) = index.default_impl(id) {
            let scope = Scope::new(namespace, Some(id.clone()));
            return self.guarded(format!("default {}", id), |this| {
                this.eval_block(&item_fn.block, &Shape::Struct(id.clone()), scope)
            });
        }

        if !self.provider.derives_default(id) {
            tracing::debug!(type_name = %id, "no defaults factory");
            return None;
        }

        self.guarded(format!("default {}", id), |this| {
            let fields = match this.provider.declared_fields(id) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!(type_name = %id, error = %e, "cannot derive defaults");
                    return None;
                }
            };
            let mut out = Map::new();
            for field in fields.iter().filter(|f| !f.optional) {
                let shape = Shape::of_field(&field.descriptor, index);
                if let Some(value) = this.default_of(&shape) {
                    out.insert(field.descriptor.default_key().to_string(), value);
                }
            }
            Some(Value::Object(out))
        })
    }

    /// `Default::default()` for a value of the given shape.
    fn default_of(&mut self, shape: &Shape) -> Option<Value> {
        match shape {
            Shape::Any => None,
            Shape::Scalar(kind) => Some(kind.zero_value()),
            Shape::Array(_) => Some(Value::Array(Vec::new())),
            Shape::Map(_) => Some(Value::Object(Map::new())),
            Shape::Struct(id) => self.default_instance(id),
            Shape::Enum(id) => self.default_variant(id),
        }
    }

    fn default_variant(&mut self, id: &TypeIdentity) -> Option<Value> {
        let variant = self.provider.default_variant(id)?;
        self.variant_value(id, &variant)
    }

    fn variant_value(&mut self, id: &TypeIdentity, variant: &str) -> Option<Value> {
        let provider = self.provider;
        let descriptor = self.guarded_result(format!("enum {}", id), |this| {
            provider.enum_descriptor(id, this).ok()
        })?;
        descriptor.constant(variant).map(|c| c.value.clone())
    }

    fn guarded<F>(&mut self, key: String, f: F) -> Option<Value>
    where
        F: FnOnce(&mut Self) -> Option<Value>,
    {
        self.guarded_result(key, f)
    }

    fn guarded_result<T, F>(&mut self, key: String, f: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> Option<T>,
    {
        if self.active.contains(&key) || self.active.len() >= MAX_DEPTH {
            tracing::warn!(item = %key, "recursive default expression, value omitted");
            return None;
        }
        self.active.push(key);
        let result = f(self);
        self.active.pop();
        result
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn eval_block<'e>(&mut self, block: &'e Block, shape: &Shape, mut scope: Scope<'e>) -> Option<Value> {
        let mut result = None;
        let count = block.stmts.len();

        for (i, stmt) in block.stmts.iter().enumerate() {
            match stmt {
                Stmt::Local(local) => {
                    if let (Some(name), Some(init)) = (pat_ident(&local.pat), &local.init) {
                        scope.locals.push((name, &*init.expr));
                    }
                }
                Stmt::Expr(Expr::Return(ret), _) => {
                    return ret.expr.as_ref().and_then(|e| self.eval(e, shape, &scope));
                }
                Stmt::Expr(expr, None) if i + 1 == count => {
                    result = self.eval(expr, shape, &scope);
                }
                Stmt::Item(_) => {}
                other => {
                    tracing::warn!(
                        statement = %other.to_token_stream(),
                        "statement in default body ignored"
                    );
                }
            }
        }

        result
    }

    fn eval(&mut self, expr: &Expr, shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        match expr {
            Expr::Lit(lit) => literal(&lit.lit, shape),
            Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
                negate(self.eval(&unary.expr, shape, scope)?)
            }
            Expr::Unary(unary) if matches!(unary.op, UnOp::Not(_)) => {
                match self.eval(&unary.expr, shape, scope)? {
                    Value::Bool(b) => Some(Value::Bool(!b)),
                    _ => unsupported(expr),
                }
            }
            Expr::Binary(binary) => {
                let left = self.eval(&binary.left, shape, scope)?;
                let right = self.eval(&binary.right, shape, scope)?;
                binary_op(&binary.op, &left, &right).or_else(|| unsupported(expr))
            }
            Expr::Paren(paren) => self.eval(&paren.expr, shape, scope),
            Expr::Group(group) => self.eval(&group.expr, shape, scope),
            Expr::Reference(reference) => self.eval(&reference.expr, shape, scope),
            Expr::Cast(cast) => {
                let value = self.eval(&cast.expr, &Shape::Any, scope)?;
                cast_value(value, &cast.ty)
            }
            Expr::Block(block) => self.eval_block(&block.block, shape, scope.clone()),
            Expr::Array(array) => self.eval_sequence(array.elems.iter(), shape, scope),
            Expr::Repeat(repeat) => self.eval_repeat(repeat, shape, scope),
            Expr::Macro(mac) => self.eval_macro(&mac.mac, shape, scope),
            Expr::MethodCall(call) => self.eval_method(call, shape, scope),
            Expr::Call(call) => self.eval_call(call, shape, scope),
            Expr::Path(path) if path.qself.is_none() => {
                let segments = path_segments(&path.path);
                self.eval_path(&segments, shape, scope)
                    .or_else(|| unsupported(expr))
            }
            Expr::Struct(literal) => self.eval_struct(literal, scope),
            _ => unsupported(expr),
        }
    }

    fn eval_sequence<'a, I>(&mut self, elems: I, shape: &Shape, scope: &Scope<'_>) -> Option<Value>
    where
        I: Iterator<Item = &'a Expr>,
    {
        let inner = shape.element();

        if let Shape::Map(_) = shape {
            let mut out = Map::new();
            for elem in elems {
                let Expr::Tuple(tuple) = elem else {
                    return unsupported(elem);
                };
                let (Some(key), Some(value), 2) =
                    (tuple.elems.first(), tuple.elems.last(), tuple.elems.len())
                else {
                    return unsupported(elem);
                };
                let key = map_key(self.eval(key, &Shape::Any, scope)?)?;
                let value = self.eval(value, &inner, scope)?;
                out.insert(key, value);
            }
            return Some(Value::Object(out));
        }

        let mut out = Vec::new();
        for elem in elems {
            out.push(self.eval(elem, &inner, scope)?);
        }
        Some(Value::Array(out))
    }

    fn eval_repeat(&mut self, repeat: &ExprRepeat, shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        let count = self.eval(&repeat.len, &Shape::Any, scope).as_ref().and_then(as_int)?;
        let count = usize::try_from(count).ok()?;
        let item = self.eval(&repeat.expr, &shape.element(), scope)?;
        Some(Value::Array(vec![item; count]))
    }

    fn eval_macro(&mut self, mac: &Macro, shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        let is_vec = mac.path.segments.last().is_some_and(|s| s.ident == "vec");
        if !is_vec {
            tracing::warn!(
                expression = %mac.to_token_stream(),
                "unsupported macro in default expression, value omitted"
            );
            return None;
        }

        if let Ok(elems) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            return self.eval_sequence(elems.iter(), shape, scope);
        }

        // `vec![x; n]`
        let bracketed: TokenStream =
            TokenTree::Group(Group::new(Delimiter::Bracket, mac.tokens.clone())).into();
        match syn::parse2::<ExprRepeat>(bracketed) {
            Ok(repeat) => self.eval_repeat(&repeat, shape, scope),
            Err(_) => {
                tracing::warn!(expression = %mac.to_token_stream(), "malformed vec! in default expression");
                None
            }
        }
    }

    fn eval_method(&mut self, call: &ExprMethodCall, shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        let method = call.method.to_string();

        if TRANSPARENT_METHODS.contains(&method.as_str()) {
            return self.eval(&call.receiver, shape, scope);
        }

        if method == "parse" {
            let text = match self.eval(&call.receiver, &Shape::Any, scope)? {
                Value::String(text) => text,
                _ => return unsupported(&Expr::MethodCall(call.clone())),
            };
            return parse_scalar(&text, shape);
        }

        unsupported(&Expr::MethodCall(call.clone()))
    }

    fn eval_call(&mut self, call: &ExprCall, shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        let Expr::Path(func) = call.func.as_ref() else {
            return unsupported(&Expr::Call(call.clone()));
        };
        let segments = path_segments(&func.path);
        let Some((last, prefix)) = segments.split_last() else {
            return None;
        };
        let owner = prefix.last().map(String::as_str);

        if call.args.len() == 1 {
            let transparent = matches!(
                last.as_str(),
                "Some" | "from" | "from_iter" | "Owned" | "Borrowed"
            ) || (last == "new" && owner.is_some_and(|o| POINTERS.contains(&o)));
            if transparent {
                return call.args.first().and_then(|arg| self.eval(arg, shape, scope));
            }
        }

        let builtin_owner = owner.is_some_and(|o| {
            o == "Default" || BUILTIN_TYPES.contains(&o) || ScalarKind::from_ident(o).is_some()
        });

        if builtin_owner && matches!(last.as_str(), "default" | "new" | "with_capacity") {
            return self.default_of(shape);
        }

        if !call.args.is_empty() {
            return unsupported(&Expr::Call(call.clone()));
        }

        if !prefix.is_empty() {
            if let Some(owner_id) = self.type_of(prefix, scope) {
                if last == "default" {
                    let owner_shape = if self.index.is_enum(&owner_id) {
                        Shape::Enum(owner_id)
                    } else {
                        Shape::Struct(owner_id)
                    };
                    return self.default_of(&owner_shape);
                }

                let index = self.index;
                if let Some((namespace, item_fn)) = index.associated_fn(&owner_id, last) {
                    let inner = Scope::new(namespace, Some(owner_id.clone()));
                    return self.guarded(format!("fn {}::{}", owner_id, last), |this| {
                        this.eval_block(&item_fn.block, shape, inner)
                    });
                }
            }
        }

        let index = self.index;
        if let Lookup::Found(fn_id) = index.resolve_value(&scope.namespace, &segments) {
            if let Some(ValueItem::Fn(item_fn)) = index.value_item(&fn_id) {
                if item_fn.sig.inputs.is_empty() {
                    let inner = Scope::new(fn_id.namespace.clone(), None);
                    return self.guarded(format!("fn {}", fn_id), |this| {
                        this.eval_block(&item_fn.block, shape, inner)
                    });
                }
            }
        }

        unsupported(&Expr::Call(call.clone()))
    }

    fn eval_path(&mut self, segments: &[String], shape: &Shape, scope: &Scope<'_>) -> Option<Value> {
        if let [name] = segments {
            if name == "None" {
                return Some(Value::Null);
            }
            if let Some(pos) = scope.locals.iter().rposition(|(local, _)| local == name) {
                let expr = scope.locals[pos].1;
                let mut visible = scope.clone();
                visible.locals.truncate(pos);
                return self.eval(expr, shape, &visible);
            }
        }

        if let [owner, constant] = segments {
            if let Some(value) = numeric_bound(owner, constant) {
                return Some(value);
            }
        }

        if let Some((variant, prefix)) = segments.split_last() {
            if !prefix.is_empty() {
                if let Some(id) = self.type_of(prefix, scope) {
                    if self.index.is_enum(&id) {
                        return self.variant_value(&id, variant);
                    }
                }
            }
        }

        let index = self.index;
        let Lookup::Found(const_id) = index.resolve_value(&scope.namespace, segments) else {
            return None;
        };
        let Some(ValueItem::Const { ty, expr }) = index.value_item(&const_id) else {
            return None;
        };
        let const_shape = match shape {
            Shape::Any => const_shape(ty),
            other => other.clone(),
        };
        let inner = Scope::new(const_id.namespace.clone(), None);
        self.guarded(format!("const {}", const_id), |this| {
            this.eval(expr, &const_shape, &inner)
        })
    }

    fn eval_struct(&mut self, literal: &ExprStruct, scope: &Scope<'_>) -> Option<Value> {
        let segments = path_segments(&literal.path);
        let Some(id) = self.type_of(&segments, scope).filter(|id| self.index.is_struct(id)) else {
            return unsupported(&Expr::Struct(literal.clone()));
        };

        let fields = match self.provider.declared_fields(&id) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(type_name = %id, error = %e, "cannot evaluate struct literal");
                return None;
            }
        };

        let base = match &literal.rest {
            Some(rest) => self.eval(rest, &Shape::Struct(id.clone()), scope),
            None => None,
        };

        let mut out = Map::new();
        for field in &fields {
            let key = field.descriptor.default_key();
            let init = literal.fields.iter().find(|init| match &init.member {
                Member::Named(ident) => *ident == field.ident,
                Member::Unnamed(_) => false,
            });

            let value = match init {
                Some(init) => {
                    let shape = Shape::of_field(&field.descriptor, self.index);
                    self.eval(&init.expr, &shape, scope)
                }
                None => base.as_ref().and_then(|b| b.get(key)).cloned(),
            };

            match value {
                None | Some(Value::Null) => {}
                Some(value) => {
                    out.insert(key.to_string(), value);
                }
            }
        }

        Some(Value::Object(out))
    }

    /// Resolve a type path, `Self` included.
    fn type_of(&self, segments: &[String], scope: &Scope<'_>) -> Option<TypeIdentity> {
        if let [single] = segments {
            if single == "Self" {
                return scope.self_ty.clone();
            }
        }
        match self.index.resolve_type(&scope.namespace, segments) {
            Lookup::Found(id) => Some(id),
            _ => None,
        }
    }
}

// =============================================================================
// Value helpers
// =============================================================================

fn unsupported(expr: &Expr) -> Option<Value> {
    tracing::warn!(
        expression = %expr.to_token_stream(),
        "unsupported default expression, value omitted"
    );
    None
}

fn pat_ident(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(ident) => Some(ident.ident.to_string()),
        Pat::Type(typed) => pat_ident(&typed.pat),
        _ => None,
    }
}

fn literal(lit: &Lit, shape: &Shape) -> Option<Value> {
    match lit {
        Lit::Str(s) => Some(Value::String(s.value())),
        Lit::Char(c) => Some(Value::String(c.value().to_string())),
        Lit::Bool(b) => Some(Value::Bool(b.value)),
        Lit::Int(int) => {
            let n: i128 = int.base10_parse().ok()?;
            if shape.is_float() || matches!(int.suffix(), "f32" | "f64") {
                Some(Value::from(n as f64))
            } else {
                Some(int_value(n))
            }
        }
        Lit::Float(float) => float.base10_parse::<f64>().ok().map(Value::from),
        _ => None,
    }
}

/// JSON number for an integer, falling back to a float outside 64 bits.
pub fn int_value(n: i128) -> Value {
    if let Ok(n) = i64::try_from(n) {
        Value::from(n)
    } else if let Ok(n) = u64::try_from(n) {
        Value::from(n)
    } else {
        Value::from(n as f64)
    }
}

fn as_int(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

fn negate(value: Value) -> Option<Value> {
    if let Some(n) = as_int(&value) {
        return Some(int_value(-n));
    }
    value.as_f64().map(|f| Value::from(-f))
}

fn binary_op(op: &BinOp, left: &Value, right: &Value) -> Option<Value> {
    if let (Some(l), Some(r)) = (as_int(left), as_int(right)) {
        let n = match op {
            BinOp::Add(_) => l.checked_add(r)?,
            BinOp::Sub(_) => l.checked_sub(r)?,
            BinOp::Mul(_) => l.checked_mul(r)?,
            BinOp::Div(_) => l.checked_div(r)?,
            BinOp::Rem(_) => l.checked_rem(r)?,
            BinOp::Shl(_) => l.checked_shl(u32::try_from(r).ok()?)?,
            BinOp::Shr(_) => l.checked_shr(u32::try_from(r).ok()?)?,
            BinOp::BitOr(_) => l | r,
            BinOp::BitAnd(_) => l & r,
            BinOp::BitXor(_) => l ^ r,
            _ => return None,
        };
        return Some(int_value(n));
    }

    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        let f = match op {
            BinOp::Add(_) => l + r,
            BinOp::Sub(_) => l - r,
            BinOp::Mul(_) => l * r,
            BinOp::Div(_) => l / r,
            _ => return None,
        };
        return Some(Value::from(f));
    }

    match (op, left, right) {
        (BinOp::Add(_), Value::String(l), Value::String(r)) => Some(Value::String(format!("{}{}", l, r))),
        (BinOp::And(_), Value::Bool(l), Value::Bool(r)) => Some(Value::Bool(*l && *r)),
        (BinOp::Or(_), Value::Bool(l), Value::Bool(r)) => Some(Value::Bool(*l || *r)),
        _ => None,
    }
}

fn cast_value(value: Value, ty: &Type) -> Option<Value> {
    let Type::Path(type_path) = ty else {
        return Some(value);
    };
    let Some(target) = type_path.path.segments.last().map(|s| s.ident.to_string()) else {
        return Some(value);
    };
    let Some(kind) = ScalarKind::from_ident(&target) else {
        return Some(value);
    };

    if kind.is_integer() {
        let bounds = int_bounds(&target);
        if let Value::Bool(b) = value {
            return Some(Value::from(u8::from(b)));
        }
        if let Some(i) = as_int(&value) {
            return Some(int_value(bounds.map_or(i, |b| wrap_int(i, b))));
        }
        if let Some(f) = value.as_f64() {
            let (min, max) = bounds.unwrap_or((i128::MIN, i128::MAX));
            return Some(int_value(saturate_float(f, min, max, &target)));
        }
        if let Some(c) = value.as_str().and_then(|s| s.chars().next()) {
            let code = i128::from(u32::from(c));
            return Some(int_value(bounds.map_or(code, |b| wrap_int(code, b))));
        }
    } else if kind.is_float() {
        if let Some(f) = value.as_f64() {
            return Some(Value::from(f));
        }
    }

    Some(value)
}

/// Range of a fixed-width integer type up to 64 bits.
fn int_bounds(ident: &str) -> Option<(i128, i128)> {
    let bounds = match ident {
        "i8" => (i8::MIN.into(), i8::MAX.into()),
        "i16" => (i16::MIN.into(), i16::MAX.into()),
        "i32" => (i32::MIN.into(), i32::MAX.into()),
        "i64" | "isize" => (i64::MIN.into(), i64::MAX.into()),
        "u8" => (0, u8::MAX.into()),
        "u16" => (0, u16::MAX.into()),
        "u32" => (0, u32::MAX.into()),
        "u64" | "usize" => (0, u64::MAX.into()),
        _ => return None,
    };
    Some(bounds)
}

/// Integer `as` casts truncate to the target width.
fn wrap_int(n: i128, (min, max): (i128, i128)) -> i128 {
    let span = max - min + 1;
    (n - min).rem_euclid(span) + min
}

/// Float `as` casts truncate toward zero and saturate at the target bounds.
fn saturate_float(f: f64, min: i128, max: i128, target: &str) -> i128 {
    let t = f.trunc();
    let (lo, hi) = (min as f64, max as f64);
    if f.is_nan() || t < lo || t > hi {
        tracing::warn!(value = f, target, "float out of range for cast, saturated");
    }

    if f.is_nan() {
        0
    } else if t <= lo {
        min
    } else if t >= hi {
        max
    } else {
        t as i128
    }
}

fn numeric_bound(owner: &str, constant: &str) -> Option<Value> {
    let (min, max) = int_bounds(owner)?;
    match constant {
        "MIN" => Some(int_value(min)),
        "MAX" => Some(int_value(max)),
        _ => None,
    }
}

fn const_shape(ty: &Type) -> Shape {
    match ty {
        Type::Reference(reference) => const_shape(&reference.elem),
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .and_then(|s| ScalarKind::from_ident(&s.ident.to_string()))
            .map(Shape::Scalar)
            .unwrap_or(Shape::Any),
        _ => Shape::Any,
    }
}

fn parse_scalar(text: &str, shape: &Shape) -> Option<Value> {
    match shape {
        Shape::Scalar(ScalarKind::Bool) => text.parse::<bool>().ok().map(Value::Bool),
        Shape::Scalar(kind) if kind.is_integer() => text.parse::<i128>().ok().map(int_value),
        Shape::Scalar(kind) if kind.is_float() => text.parse::<f64>().ok().map(Value::from),
        _ => Some(Value::String(text.to_string())),
    }
}

fn map_key(key: Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            tracing::warn!(key = %other, "map key is not a scalar, value omitted");
            None
        }
    }
}
