//! Tagged-union input types.
//!
//! A union input type accepts a value that is exactly one of several
//! candidate input types, where the concrete candidate is named inside the
//! value itself. Resolution runs in four steps:
//!
//! 1. a discriminator strategy reads the candidate key from the value or
//!    literal ([`discriminator`]);
//! 2. the key is looked up in the candidate table built at construction, or
//!    handed to a caller-supplied resolver ([`candidates`]);
//! 3. without an explicit type key, each candidate is wrapped in a synthetic
//!    `{_type_, _value_}` object ([`wrapper`]);
//! 4. the payload is validated against the resolved type by the host
//!    coercion primitives ([`adapter`]).
//!
//! [`UnionInputType`] ties these together and plugs into the schema as a
//! custom scalar, so union-typed fields can nest arbitrarily, including
//! through themselves.
pub mod adapter;
pub mod candidates;
pub mod discriminator;
pub mod scalar;
pub mod wrapper;

use thiserror::Error;

pub use candidates::{CandidateTable, InputTypes, Lookup};
pub use discriminator::{AstTypeResolver, TypeResolver, ValueDiscriminator};
pub use scalar::{UnionInputType, UnionInputTypeConfig};
pub use wrapper::{TYPE_FIELD, VALUE_FIELD, synthesize_wrapper};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnionError {
    #[error(
        "{union}(UnionInputType): all inputTypes must be object or scalar types, \"{candidate}\" is of kind {kind}"
    )]
    InvalidCandidateKind {
        union: String,
        candidate: String,
        kind: &'static str,
    },

    #[error("{union}(UnionInputType): input type key \"{key}\" is defined more than once")]
    DuplicateDiscriminator { union: String, key: String },

    #[error("{union}(UnionInputType): Expected an object with \"{field}\" property")]
    MissingDiscriminatorField { union: String, field: String },

    #[error(
        "{union}(UnionInputType): Expected an object with _type_ and _value_ properties in this order"
    )]
    MalformedUnionValue { union: String },

    #[error(
        "{union}(UnionInputType): Expected an object literal with _type_ and _value_ fields in this order"
    )]
    MalformedUnionLiteral { union: String },

    #[error("{union}(UnionInputType): \"{value}\" is not a valid type. {}", expected_hint(.expected))]
    UnknownDiscriminatorValue {
        union: String,
        value: String,
        expected: Vec<String>,
    },

    #[error("{union}(UnionInputType): value does not match type \"{type_name}\":\n{message}")]
    CoercionFailed {
        union: String,
        type_name: String,
        message: String,
    },

    #[error("{union}(UnionInputType): expected type {type_name}, found {found}")]
    LiteralTypeMismatch {
        union: String,
        type_name: String,
        found: String,
    },

    #[error("{union}(UnionInputType): no input type could be resolved for {found}")]
    UnresolvedLiteral { union: String, found: String },

    #[error("{union}(UnionInputType): runtime values need inputTypes or resolveType")]
    NoValueResolution { union: String },

    #[error(
        "{union}(UnionInputType): one of inputTypes, resolveType or resolveTypeFromAst is required"
    )]
    MissingCandidates { union: String },

    #[error("\"{union}\" is not a valid union name")]
    InvalidName { union: String },
}

fn expected_hint(expected: &[String]) -> String {
    if expected.is_empty() {
        "The type resolver returned no type.".to_string()
    } else {
        format!("Expected one of: {}", expected.join(", "))
    }
}

impl UnionError {
    /// Stable variant name, for reports and fixture expectations.
    pub fn kind(&self) -> &'static str {
        match self {
            UnionError::InvalidCandidateKind { .. } => "InvalidCandidateKind",
            UnionError::DuplicateDiscriminator { .. } => "DuplicateDiscriminator",
            UnionError::MissingDiscriminatorField { .. } => "MissingDiscriminatorField",
            UnionError::MalformedUnionValue { .. } => "MalformedUnionValue",
            UnionError::MalformedUnionLiteral { .. } => "MalformedUnionLiteral",
            UnionError::UnknownDiscriminatorValue { .. } => "UnknownDiscriminatorValue",
            UnionError::CoercionFailed { .. } => "CoercionFailed",
            UnionError::LiteralTypeMismatch { .. } => "LiteralTypeMismatch",
            UnionError::UnresolvedLiteral { .. } => "UnresolvedLiteral",
            UnionError::NoValueResolution { .. } => "NoValueResolution",
            UnionError::MissingCandidates { .. } => "MissingCandidates",
            UnionError::InvalidName { .. } => "InvalidName",
        }
    }

    /// Name of the union the error was raised for.
    pub fn union_name(&self) -> &str {
        match self {
            UnionError::InvalidCandidateKind { union, .. }
            | UnionError::DuplicateDiscriminator { union, .. }
            | UnionError::MissingDiscriminatorField { union, .. }
            | UnionError::MalformedUnionValue { union }
            | UnionError::MalformedUnionLiteral { union }
            | UnionError::UnknownDiscriminatorValue { union, .. }
            | UnionError::CoercionFailed { union, .. }
            | UnionError::LiteralTypeMismatch { union, .. }
            | UnionError::UnresolvedLiteral { union, .. }
            | UnionError::NoValueResolution { union }
            | UnionError::MissingCandidates { union }
            | UnionError::InvalidName { union } => union,
        }
    }
}
