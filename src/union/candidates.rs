//! Candidate registry: discriminator string → candidate input type.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::UnionError;
use super::discriminator::TypeResolver;
use super::wrapper::{ensure_candidate, synthesize_wrapper};
use crate::schema::InputType;

/// Candidate types as configured on a union.
#[derive(Debug, Clone)]
pub enum InputTypes {
    /// Keyed by each type's own name.
    List(Vec<InputType>),
    /// Explicit keys, in declaration order.
    Keyed(Vec<(String, InputType)>),
}

/// Immutable table built once per union.
#[derive(Debug, Clone, Default)]
pub struct CandidateTable {
    entries: IndexMap<String, InputType>,
}

impl CandidateTable {
    /// Normalize `input_types` into a table. With `wrap` set (no explicit
    /// type key), every candidate is replaced by its synthesized wrapper.
    pub fn build(union: &str, input_types: InputTypes, wrap: bool) -> Result<Self, UnionError> {
        let keyed = match input_types {
            InputTypes::Keyed(pairs) => pairs,
            InputTypes::List(types) => types
                .into_iter()
                .map(|ty| {
                    ensure_candidate(union, &ty.to_string(), &ty)?;
                    let key = ty.type_name().unwrap_or_default().to_string();
                    Ok((key, ty))
                })
                .collect::<Result<Vec<_>, UnionError>>()?,
        };

        let mut entries = IndexMap::with_capacity(keyed.len());
        for (key, ty) in keyed {
            if entries.contains_key(&key) {
                return Err(UnionError::DuplicateDiscriminator {
                    union: union.to_string(),
                    key,
                });
            }
            let ty = if wrap {
                synthesize_wrapper(union, &key, &ty)?
            } else {
                ensure_candidate(union, &key, &ty)?;
                ty
            };
            entries.insert(key, ty);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&InputType> {
        self.entries.get(key)
    }

    /// Registered discriminator strings, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a discriminator turns into a type: an eager table, or a resolver
/// consulted per call (wrapping its answer when `wrap` is set).
#[derive(Clone)]
pub enum Lookup {
    Table(CandidateTable),
    Deferred {
        resolver: Arc<dyn TypeResolver>,
        wrap: bool,
    },
}

impl Lookup {
    pub fn resolve(&self, union: &str, discriminator: &str) -> Result<InputType, UnionError> {
        match self {
            Lookup::Table(table) => table.get(discriminator).cloned().ok_or_else(|| {
                UnionError::UnknownDiscriminatorValue {
                    union: union.to_string(),
                    value: discriminator.to_string(),
                    expected: table.keys().map(str::to_string).collect(),
                }
            }),
            Lookup::Deferred { resolver, wrap } => {
                let ty = resolver.resolve_type(discriminator).ok_or_else(|| {
                    UnionError::UnknownDiscriminatorValue {
                        union: union.to_string(),
                        value: discriminator.to_string(),
                        expected: Vec::new(),
                    }
                })?;
                if *wrap {
                    synthesize_wrapper(union, discriminator, &ty)
                } else {
                    ensure_candidate(union, discriminator, &ty)?;
                    Ok(ty)
                }
            }
        }
    }

    /// Known keys; `None` when resolution is deferred to a callback.
    pub fn keys(&self) -> Option<Vec<&str>> {
        match self {
            Lookup::Table(table) => Some(table.keys().collect()),
            Lookup::Deferred { .. } => None,
        }
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Table(table) => f.debug_tuple("Table").field(table).finish(),
            Lookup::Deferred { wrap, .. } => f
                .debug_struct("Deferred")
                .field("wrap", wrap)
                .finish_non_exhaustive(),
        }
    }
}
