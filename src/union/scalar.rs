//! The union input type as the schema sees it: a named custom scalar.
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use super::UnionError;
use super::adapter::{coerce_literal, coerce_value};
use super::candidates::{CandidateTable, InputTypes, Lookup};
use super::discriminator::{
    AstTypeResolver, LiteralStrategy, LiteralTarget, TypeResolver, ValueDiscriminator,
    ValueStrategy,
};
use super::wrapper::ensure_candidate;
use crate::ast::{Source, ValueNode};
use crate::schema::{InputType, ScalarError, ScalarType, TypeRegistry, is_valid_name};

// ————————————————————————————————————————————————————————————————————————————
// CONFIGURATION
// ————————————————————————————————————————————————————————————————————————————

/// Options for [`UnionInputType::new`].
///
/// - `type_key`: member naming the candidate. Without it values must be
///   shaped `{_type_, _value_}`, in that order for literals.
/// - `input_types`: ignored when `resolve_type` is set.
/// - `resolve_type_from_ast`: takes over literal resolution entirely.
/// - `resolve_type_from_value`: takes over discriminator extraction for
///   runtime values.
#[derive(Clone, Default)]
pub struct UnionInputTypeConfig {
    pub name: String,
    pub description: Option<String>,
    pub type_key: Option<String>,
    pub input_types: Option<InputTypes>,
    pub resolve_type: Option<Arc<dyn TypeResolver>>,
    pub resolve_type_from_ast: Option<Arc<dyn AstTypeResolver>>,
    pub resolve_type_from_value: Option<Arc<dyn ValueDiscriminator>>,
}

impl UnionInputTypeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = Some(key.into());
        self
    }

    /// Candidates keyed by their own type names.
    pub fn input_types(mut self, types: impl IntoIterator<Item = InputType>) -> Self {
        self.input_types = Some(InputTypes::List(types.into_iter().collect()));
        self
    }

    /// Candidates under explicit keys.
    pub fn keyed_input_types<K: Into<String>>(
        mut self,
        types: impl IntoIterator<Item = (K, InputType)>,
    ) -> Self {
        self.input_types = Some(InputTypes::Keyed(
            types.into_iter().map(|(k, ty)| (k.into(), ty)).collect(),
        ));
        self
    }

    pub fn resolve_type<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<InputType> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(resolver));
        self
    }

    pub fn resolve_type_from_ast<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ValueNode) -> Option<InputType> + Send + Sync + 'static,
    {
        self.resolve_type_from_ast = Some(Arc::new(resolver));
        self
    }

    pub fn resolve_type_from_value<F>(mut self, discriminator: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.resolve_type_from_value = Some(Arc::new(discriminator));
        self
    }

    pub fn build(self) -> Result<UnionInputType, UnionError> {
        UnionInputType::new(self)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FACADE
// ————————————————————————————————————————————————————————————————————————————

/// Immutable after construction; resolution calls share nothing mutable, so
/// one instance may serve any number of threads.
#[derive(Debug, Clone)]
pub struct UnionInputType {
    name: String,
    description: Option<String>,
    type_key: Option<String>,
    value_strategy: ValueStrategy,
    literal_strategy: LiteralStrategy,
    /// `None` only for configurations with nothing but an AST resolver.
    lookup: Option<Lookup>,
}

impl UnionInputType {
    pub fn new(config: UnionInputTypeConfig) -> Result<Self, UnionError> {
        let UnionInputTypeConfig {
            name,
            description,
            type_key,
            input_types,
            resolve_type,
            resolve_type_from_ast,
            resolve_type_from_value,
        } = config;

        if !is_valid_name(&name) {
            return Err(UnionError::InvalidName { union: name });
        }

        let wrap = type_key.is_none();
        let lookup = match (resolve_type, input_types) {
            (Some(resolver), _) => Some(Lookup::Deferred { resolver, wrap }),
            (None, Some(types)) => Some(Lookup::Table(CandidateTable::build(&name, types, wrap)?)),
            (None, None) if resolve_type_from_ast.is_some() => None,
            (None, None) => return Err(UnionError::MissingCandidates { union: name }),
        };

        let value_strategy = match (resolve_type_from_value, &type_key) {
            (Some(callback), _) => ValueStrategy::Callback(callback),
            (None, Some(key)) => ValueStrategy::Field(key.clone()),
            (None, None) => ValueStrategy::Implicit,
        };
        let literal_strategy = match (resolve_type_from_ast, &type_key) {
            (Some(resolver), _) => LiteralStrategy::Ast(resolver),
            (None, Some(key)) => LiteralStrategy::Field(key.clone()),
            (None, None) => LiteralStrategy::Implicit,
        };

        debug!(
            union = %name,
            ?value_strategy,
            ?literal_strategy,
            ?lookup,
            "built union input type"
        );

        Ok(Self {
            name,
            description,
            type_key,
            value_strategy,
            literal_strategy,
            lookup,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> Option<&str> {
        self.type_key.as_deref()
    }

    /// Registered discriminators; `None` when a resolver decides per call.
    pub fn candidate_keys(&self) -> Option<Vec<&str>> {
        self.lookup.as_ref()?.keys()
    }

    /// Register-ready handle for use as a field type or candidate.
    pub fn into_input_type(self) -> InputType {
        InputType::scalar(self)
    }

    /// Resolve and validate a runtime value. Returns the value unchanged.
    pub fn parse_value(&self, value: &Value, registry: &TypeRegistry) -> Result<Value, UnionError> {
        let discriminator = self.value_strategy.discriminator(&self.name, value)?;
        let lookup = self
            .lookup
            .as_ref()
            .ok_or_else(|| UnionError::NoValueResolution {
                union: self.name.clone(),
            })?;
        let ty = lookup.resolve(&self.name, &discriminator)?;
        trace!(union = %self.name, %discriminator, resolved = %ty, "resolved runtime value");
        coerce_value(&self.name, value, &ty, registry)
    }

    /// Resolve and convert a literal from `source`.
    pub fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        registry: &TypeRegistry,
    ) -> Result<Value, UnionError> {
        let ty = match self.literal_strategy.resolve(&self.name, node, source)? {
            LiteralTarget::Type(ty) => {
                ensure_candidate(&self.name, &ty.to_string(), &ty)?;
                ty
            }
            LiteralTarget::Discriminator(discriminator) => {
                let lookup = self
                    .lookup
                    .as_ref()
                    .ok_or_else(|| UnionError::NoValueResolution {
                        union: self.name.clone(),
                    })?;
                lookup.resolve(&self.name, &discriminator)?
            }
        };
        trace!(union = %self.name, resolved = %ty, "resolved literal");
        coerce_literal(&self.name, node, &ty, source, registry)
    }
}

impl ScalarType for UnionInputType {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, registry: &TypeRegistry) -> Result<Value, ScalarError> {
        UnionInputType::parse_value(self, value, registry).map_err(ScalarError::from)
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        registry: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        UnionInputType::parse_literal(self, node, source, registry).map_err(ScalarError::from)
    }
}
