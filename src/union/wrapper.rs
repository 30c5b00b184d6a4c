//! Synthetic `{_type_, _value_}` wrappers for candidates that carry no
//! discriminator field of their own.
use super::UnionError;
use crate::schema::{InputType, ObjectType, scalars};

/// Discriminator member of a synthesized wrapper. Always declared first.
pub const TYPE_FIELD: &str = "_type_";
/// Payload member of a synthesized wrapper. Always declared second.
pub const VALUE_FIELD: &str = "_value_";

/// Only object and scalar types may stand as union candidates.
pub fn ensure_candidate(union: &str, key: &str, ty: &InputType) -> Result<(), UnionError> {
    match ty {
        InputType::Object(_) | InputType::Scalar(_) => Ok(()),
        other => Err(UnionError::InvalidCandidateKind {
            union: union.to_string(),
            candidate: other
                .type_name()
                .map_or_else(|| key.to_string(), str::to_string),
            kind: other.kind_name(),
        }),
    }
}

/// Wrap `payload` in an object named `discriminator` with exactly two
/// fields: `_type_: String` then `_value_: payload`.
///
/// Literal resolution inspects the fields positionally, so the order is
/// part of the contract.
pub fn synthesize_wrapper(
    union: &str,
    discriminator: &str,
    payload: &InputType,
) -> Result<InputType, UnionError> {
    ensure_candidate(union, discriminator, payload)?;
    Ok(InputType::object(
        ObjectType::new(discriminator)
            .field(TYPE_FIELD, scalars::string())
            .field(VALUE_FIELD, payload.clone()),
    ))
}
