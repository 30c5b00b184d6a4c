//! Bridges a resolved candidate to the host coercion primitives and folds
//! their failures into [`UnionError`].
use serde_json::Value;

use super::UnionError;
use crate::ast::{Source, ValueNode};
use crate::coerce::{coerce_input_value, value_from_ast};
use crate::schema::{InputType, TypeRegistry};

/// Validate `value` against `ty`. The value itself is returned untouched;
/// this is a gate, not a transform.
pub fn coerce_value(
    union: &str,
    value: &Value,
    ty: &InputType,
    registry: &TypeRegistry,
) -> Result<Value, UnionError> {
    match coerce_input_value(value, ty, registry) {
        Ok(_) => Ok(value.clone()),
        Err(errors) => Err(UnionError::CoercionFailed {
            union: union.to_string(),
            type_name: ty.to_string(),
            message: errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        }),
    }
}

/// Convert `node` under `ty`, quoting the literal's source text on mismatch.
pub fn coerce_literal(
    union: &str,
    node: &ValueNode,
    ty: &InputType,
    source: &Source,
    registry: &TypeRegistry,
) -> Result<Value, UnionError> {
    value_from_ast(node, ty, source, registry).ok_or_else(|| UnionError::LiteralTypeMismatch {
        union: union.to_string(),
        type_name: ty.to_string(),
        found: source.slice(node.span).to_string(),
    })
}
