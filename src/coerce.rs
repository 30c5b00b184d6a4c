//! Host coercion primitives.
//!
//! - [`coerce_input_value`] validates an already-parsed JSON value and
//!   collects every problem it finds, each tagged with the path it was found
//!   at.
//! - [`value_from_ast`] converts a literal and answers `None` as soon as the
//!   literal cannot match.
//!
//! Custom scalars (union facades included) are re-entered through
//! [`ScalarType`](crate::schema::ScalarType), so nested unions recurse through ordinary field traversal.
use std::fmt;

use serde_json::{Map, Value};

use crate::ast::{NodeValue, Source, ValueNode};
use crate::schema::{EnumType, InputType, ObjectType, TypeRegistry};

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl CoercionError {
    fn new(path: &[PathSegment], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    /// `value.friends[1].name` style rendering of [`Self::path`].
    pub fn path_string(&self) -> String {
        let mut out = String::from("value");
        for seg in &self.path {
            match seg {
                PathSegment::Key(k) => {
                    out.push('.');
                    out.push_str(k);
                }
                PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
            }
        }
        out
    }
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "At \"{}\": {}", self.path_string(), self.message)
        }
    }
}

impl std::error::Error for CoercionError {}

// ————————————————————————————————————————————————————————————————————————————
// RUNTIME VALUES
// ————————————————————————————————————————————————————————————————————————————

/// Coerce `value` against `ty`. On failure returns every error found.
pub fn coerce_input_value(
    value: &Value,
    ty: &InputType,
    registry: &TypeRegistry,
) -> Result<Value, Vec<CoercionError>> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    let out = coerce_at(value, ty, registry, &mut path, &mut errors);
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

fn coerce_at(
    value: &Value,
    ty: &InputType,
    registry: &TypeRegistry,
    path: &mut Vec<PathSegment>,
    errors: &mut Vec<CoercionError>,
) -> Value {
    match ty {
        InputType::NonNull(inner) => {
            if value.is_null() {
                errors.push(CoercionError::new(
                    path,
                    format!("Expected non-nullable type \"{ty}\" not to be null."),
                ));
                return Value::Null;
            }
            coerce_at(value, inner, registry, path, errors)
        }
        _ if value.is_null() => Value::Null,
        InputType::Named(name) => match registry.get(name) {
            Some(resolved) => coerce_at(value, resolved, registry, path, errors),
            None => {
                errors.push(CoercionError::new(
                    path,
                    format!("Unknown type \"{name}\"."),
                ));
                Value::Null
            }
        },
        InputType::List(item) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, el) in items.iter().enumerate() {
                    path.push(PathSegment::Index(i));
                    out.push(coerce_at(el, item, registry, path, errors));
                    path.pop();
                }
                Value::Array(out)
            }
            // a lone item stands for a one-element list
            single => Value::Array(vec![coerce_at(single, item, registry, path, errors)]),
        },
        InputType::Object(object) => coerce_object(value, object, registry, path, errors),
        InputType::Enum(enum_) => coerce_enum(value, enum_, path, errors),
        InputType::Scalar(scalar) => match scalar.parse_value(value, registry) {
            Ok(parsed) => parsed,
            Err(error) => {
                errors.push(CoercionError::new(
                    path,
                    format!("Expected type \"{}\". {error}", scalar.name()),
                ));
                Value::Null
            }
        },
    }
}

fn coerce_object(
    value: &Value,
    object: &ObjectType,
    registry: &TypeRegistry,
    path: &mut Vec<PathSegment>,
    errors: &mut Vec<CoercionError>,
) -> Value {
    let Value::Object(given) = value else {
        errors.push(CoercionError::new(
            path,
            format!("Expected type \"{}\" to be an object.", object.name),
        ));
        return Value::Null;
    };

    let mut out = Map::new();
    for (name, field) in &object.fields {
        match given.get(name) {
            Some(field_value) => {
                path.push(PathSegment::Key(name.clone()));
                let coerced = coerce_at(field_value, &field.ty, registry, path, errors);
                path.pop();
                out.insert(name.clone(), coerced);
            }
            None => {
                if let Some(default) = &field.default_value {
                    out.insert(name.clone(), default.clone());
                } else if field.ty.is_non_null() {
                    errors.push(CoercionError::new(
                        path,
                        format!(
                            "Field \"{name}\" of required type \"{}\" was not provided.",
                            field.ty
                        ),
                    ));
                }
            }
        }
    }

    for key in given.keys() {
        if !object.fields.contains_key(key) {
            errors.push(CoercionError::new(
                path,
                format!(
                    "Field \"{key}\" is not defined by type \"{}\".",
                    object.name
                ),
            ));
        }
    }

    Value::Object(out)
}

fn coerce_enum(
    value: &Value,
    enum_: &EnumType,
    path: &[PathSegment],
    errors: &mut Vec<CoercionError>,
) -> Value {
    match value {
        Value::String(s) if enum_.values.contains(s) => value.clone(),
        other => {
            errors.push(CoercionError::new(
                path,
                format!("Value {other} does not exist in \"{}\" enum.", enum_.name),
            ));
            Value::Null
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LITERALS
// ————————————————————————————————————————————————————————————————————————————

/// Convert a literal under `ty`. `None` means the literal does not match.
pub fn value_from_ast(
    node: &ValueNode,
    ty: &InputType,
    source: &Source,
    registry: &TypeRegistry,
) -> Option<Value> {
    match ty {
        InputType::NonNull(inner) => match value_from_ast(node, inner, source, registry)? {
            Value::Null => None,
            v => Some(v),
        },
        _ if matches!(node.value, NodeValue::Null) => Some(Value::Null),
        InputType::Named(name) => value_from_ast(node, registry.get(name)?, source, registry),
        InputType::List(item) => match &node.value {
            NodeValue::List(items) => items
                .iter()
                .map(|el| value_from_ast(el, item, source, registry))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            _ => value_from_ast(node, item, source, registry).map(|v| Value::Array(vec![v])),
        },
        InputType::Object(object) => object_from_ast(node, object, source, registry),
        InputType::Enum(enum_) => match &node.value {
            NodeValue::Enum(name) if enum_.values.contains(name) => {
                Some(Value::String(name.clone()))
            }
            _ => None,
        },
        InputType::Scalar(scalar) => match scalar.parse_literal(node, source, registry) {
            Ok(v) => Some(v),
            Err(error) => {
                tracing::debug!(
                    scalar = scalar.name(),
                    literal = source.slice(node.span),
                    %error,
                    "literal rejected by scalar"
                );
                None
            }
        },
    }
}

fn object_from_ast(
    node: &ValueNode,
    object: &ObjectType,
    source: &Source,
    registry: &TypeRegistry,
) -> Option<Value> {
    let fields = node.fields()?;
    if fields
        .iter()
        .any(|f| !object.fields.contains_key(&f.name.value))
    {
        return None;
    }

    let mut out = Map::new();
    for (name, field) in &object.fields {
        match fields.iter().find(|f| &f.name.value == name) {
            Some(given) => {
                let v = value_from_ast(&given.value, &field.ty, source, registry)?;
                out.insert(name.clone(), v);
            }
            None => {
                if let Some(default) = &field.default_value {
                    out.insert(name.clone(), default.clone());
                } else if field.ty.is_non_null() {
                    return None;
                }
            }
        }
    }
    Some(Value::Object(out))
}
