//! Host input type system.
//!
//! Object fields name their types through [`InputType::Named`], which is
//! only resolved against a [`TypeRegistry`] when a value is coerced. That
//! late binding is what allows a type to reach itself again through a
//! union, so no construction step ever has to embed a cycle.
pub mod registry;
pub mod scalars;

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::ast::{Source, ValueNode};
use crate::union::UnionError;

pub use registry::TypeRegistry;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// GraphQL name rule, shared by types, fields and unions.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone)]
pub enum InputType {
    Scalar(Arc<dyn ScalarType>),
    Object(Arc<ObjectType>),
    Enum(Arc<EnumType>),
    List(Box<InputType>),
    NonNull(Box<InputType>),
    /// Late-bound reference, looked up in the registry at coercion time.
    Named(String),
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    /// Declaration order is preserved.
    pub fields: IndexMap<String, InputField>,
}

#[derive(Debug, Clone)]
pub struct InputField {
    pub name: String,
    pub ty: InputType,
    pub description: Option<String>,
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: IndexSet<String>,
}

/// Contract every scalar-like type implements, built-in or custom.
pub trait ScalarType: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    /// Output direction.
    fn serialize(&self, value: &Value) -> Value;

    /// Validate an already-parsed runtime value.
    fn parse_value(&self, value: &Value, registry: &TypeRegistry) -> Result<Value, ScalarError>;

    /// Validate a literal embedded in `source`.
    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        registry: &TypeRegistry,
    ) -> Result<Value, ScalarError>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScalarError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Union(#[from] UnionError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid name \"{0}\": names must match /^[_A-Za-z][_0-9A-Za-z]*$/")]
    InvalidName(String),

    #[error("type \"{0}\" is defined more than once")]
    DuplicateType(String),

    #[error("field \"{field}\" is defined more than once on type \"{type_name}\"")]
    DuplicateField { type_name: String, field: String },

    #[error("\"{0}\" is not a named type and cannot be registered")]
    NotNamed(String),

    #[error("unknown type \"{name}\" referenced by \"{referenced_by}\"")]
    UnknownType { name: String, referenced_by: String },

    #[error("invalid type reference \"{0}\"")]
    InvalidTypeRef(String),

    #[error("unions form a cycle through their input types: {}", .0.join(" -> "))]
    UnionCycle(Vec<String>),

    #[error(transparent)]
    Union(#[from] UnionError),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputType {
    pub fn named(name: impl Into<String>) -> Self {
        InputType::Named(name.into())
    }

    pub fn list(of: InputType) -> Self {
        InputType::List(Box::new(of))
    }

    pub fn non_null(of: InputType) -> Self {
        InputType::NonNull(Box::new(of))
    }

    pub fn scalar(scalar: impl ScalarType + 'static) -> Self {
        InputType::Scalar(Arc::new(scalar))
    }

    pub fn object(object: ObjectType) -> Self {
        InputType::Object(Arc::new(object))
    }

    pub fn enumeration(enum_: EnumType) -> Self {
        InputType::Enum(Arc::new(enum_))
    }

    /// Name of a named type or late-bound reference; `None` for wrappers.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            InputType::Scalar(s) => Some(s.name()),
            InputType::Object(o) => Some(&o.name),
            InputType::Enum(e) => Some(&e.name),
            InputType::Named(n) => Some(n),
            InputType::List(_) | InputType::NonNull(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            InputType::Scalar(_) => "scalar",
            InputType::Object(_) => "object",
            InputType::Enum(_) => "enum",
            InputType::List(_) => "list",
            InputType::NonNull(_) => "non-null",
            InputType::Named(_) => "named reference",
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, InputType::NonNull(_))
    }

    /// Follow a late-bound reference one step; other types return themselves.
    pub fn resolve<'a>(&'a self, registry: &'a TypeRegistry) -> Option<&'a InputType> {
        match self {
            InputType::Named(name) => registry.get(name),
            other => Some(other),
        }
    }
}

/// Printed in GraphQL type-reference syntax, e.g. `[jedi!]!`.
impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::List(inner) => write!(f, "[{inner}]"),
            InputType::NonNull(inner) => write!(f, "{inner}!"),
            named => f.write_str(named.type_name().unwrap_or_default()),
        }
    }
}

impl fmt::Debug for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputType({} {self})", self.kind_name())
    }
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: IndexMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field; a later field with the same name replaces the earlier.
    pub fn field(mut self, name: impl Into<String>, ty: InputType) -> Self {
        self.push_field(InputField::new(name, ty));
        self
    }

    pub fn push_field(&mut self, field: InputField) {
        self.fields.insert(field.name.clone(), field);
    }
}

impl InputField {
    pub fn new(name: impl Into<String>, ty: InputType) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parse `Name`, `[T]` and `T!` references into late-bound input types.
pub fn parse_type_ref(src: &str) -> Result<InputType, SchemaError> {
    let trimmed = src.trim();
    let invalid = || SchemaError::InvalidTypeRef(src.to_string());
    if let Some(inner) = trimmed.strip_suffix('!') {
        let inner = parse_type_ref(inner)?;
        if inner.is_non_null() {
            return Err(invalid());
        }
        return Ok(InputType::non_null(inner));
    }
    if let Some(rest) = trimmed.strip_prefix('[') {
        let inner = rest.strip_suffix(']').ok_or_else(invalid)?;
        return Ok(InputType::list(parse_type_ref(inner)?));
    }
    if is_valid_name(trimmed) {
        Ok(InputType::named(trimmed))
    } else {
        Err(invalid())
    }
}
