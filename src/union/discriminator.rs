//! Discriminator strategies.
//!
//! Caller-supplied callbacks plug in through three small traits; closures
//! implement them directly. The strategy for each input mode is picked once
//! when the union is built and never re-derived per call.
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::UnionError;
use super::wrapper::{TYPE_FIELD, VALUE_FIELD};
use crate::ast::{NodeValue, Source, ValueNode};
use crate::schema::InputType;

// ————————————————————————————————————————————————————————————————————————————
// CALLBACKS
// ————————————————————————————————————————————————————————————————————————————

/// Maps a discriminator string to a candidate type (`resolveType`).
pub trait TypeResolver: Send + Sync {
    fn resolve_type(&self, discriminator: &str) -> Option<InputType>;
}

/// Picks a candidate type straight from a literal (`resolveTypeFromAst`).
pub trait AstTypeResolver: Send + Sync {
    fn resolve_type_from_ast(&self, node: &ValueNode) -> Option<InputType>;
}

/// Reads the discriminator out of a runtime value (`resolveTypeFromValue`).
/// The result is used as a lookup key as-is.
pub trait ValueDiscriminator: Send + Sync {
    fn discriminate(&self, value: &Value) -> String;
}

impl<F> TypeResolver for F
where
    F: Fn(&str) -> Option<InputType> + Send + Sync,
{
    fn resolve_type(&self, discriminator: &str) -> Option<InputType> {
        self(discriminator)
    }
}

impl<F> AstTypeResolver for F
where
    F: Fn(&ValueNode) -> Option<InputType> + Send + Sync,
{
    fn resolve_type_from_ast(&self, node: &ValueNode) -> Option<InputType> {
        self(node)
    }
}

impl<F> ValueDiscriminator for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn discriminate(&self, value: &Value) -> String {
        self(value)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RUNTIME VALUES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone)]
pub(crate) enum ValueStrategy {
    Callback(Arc<dyn ValueDiscriminator>),
    Field(String),
    /// `{_type_, _value_}`; both members must be truthy.
    Implicit,
}

impl ValueStrategy {
    pub(crate) fn discriminator(&self, union: &str, value: &Value) -> Result<String, UnionError> {
        match self {
            ValueStrategy::Callback(callback) => Ok(callback.discriminate(value)),
            ValueStrategy::Field(field) => match value.get(field) {
                Some(key) if is_truthy(key) => Ok(key_text(key)),
                _ => Err(UnionError::MissingDiscriminatorField {
                    union: union.to_string(),
                    field: field.clone(),
                }),
            },
            ValueStrategy::Implicit => match (value.get(TYPE_FIELD), value.get(VALUE_FIELD)) {
                (Some(key), Some(payload)) if is_truthy(key) && is_truthy(payload) => {
                    Ok(key_text(key))
                }
                _ => Err(UnionError::MalformedUnionValue {
                    union: union.to_string(),
                }),
            },
        }
    }
}

/// Truthiness as loosely-typed callers understand it: null, false, 0 and ""
/// do not count as present.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// LITERALS
// ————————————————————————————————————————————————————————————————————————————

pub(crate) enum LiteralTarget {
    /// The AST resolver already chose the type.
    Type(InputType),
    Discriminator(String),
}

#[derive(Clone)]
pub(crate) enum LiteralStrategy {
    Ast(Arc<dyn AstTypeResolver>),
    Field(String),
    /// Field 0 must be `_type_` and field 1 `_value_`, by position.
    Implicit,
}

impl LiteralStrategy {
    pub(crate) fn resolve(
        &self,
        union: &str,
        node: &ValueNode,
        source: &Source,
    ) -> Result<LiteralTarget, UnionError> {
        match self {
            LiteralStrategy::Ast(resolver) => resolver
                .resolve_type_from_ast(node)
                .map(LiteralTarget::Type)
                .ok_or_else(|| UnionError::UnresolvedLiteral {
                    union: union.to_string(),
                    found: source.slice(node.span).to_string(),
                }),
            LiteralStrategy::Field(field) => node
                .field(field)
                .and_then(|f| literal_key(&f.value))
                .map(LiteralTarget::Discriminator)
                .ok_or_else(|| UnionError::MissingDiscriminatorField {
                    union: union.to_string(),
                    field: field.clone(),
                }),
            LiteralStrategy::Implicit => match node.fields().unwrap_or_default() {
                [first, second, ..]
                    if first.name.value == TYPE_FIELD && second.name.value == VALUE_FIELD =>
                {
                    literal_key(&first.value)
                        .map(LiteralTarget::Discriminator)
                        .ok_or_else(|| UnionError::MalformedUnionLiteral {
                            union: union.to_string(),
                        })
                }
                _ => Err(UnionError::MalformedUnionLiteral {
                    union: union.to_string(),
                }),
            },
        }
    }
}

/// Quoted strings and bare enum names may carry a discriminator.
fn literal_key(node: &ValueNode) -> Option<String> {
    match &node.value {
        NodeValue::String(s) | NodeValue::Enum(s) => Some(s.clone()),
        _ => None,
    }
}

// ------------------------------------ Debug ------------------------------------ //

impl fmt::Debug for ValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueStrategy::Callback(_) => f.write_str("Callback(..)"),
            ValueStrategy::Field(field) => f.debug_tuple("Field").field(field).finish(),
            ValueStrategy::Implicit => f.write_str("Implicit"),
        }
    }
}

impl fmt::Debug for LiteralStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralStrategy::Ast(_) => f.write_str("Ast(..)"),
            LiteralStrategy::Field(field) => f.debug_tuple("Field").field(field).finish(),
            LiteralStrategy::Implicit => f.write_str("Implicit"),
        }
    }
}
