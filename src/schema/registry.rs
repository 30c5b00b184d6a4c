use indexmap::IndexMap;

use super::{InputType, SchemaError, is_valid_name, scalars};

/// Name → named type table that late-bound references resolve against.
///
/// Built once, then only read; share it behind `&` or `Arc` across threads.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, InputType>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry pre-seeded with the built-in scalars.
    pub fn new() -> Self {
        let types = scalars::builtins()
            .into_iter()
            .filter_map(|ty| Some((ty.type_name()?.to_string(), ty)))
            .collect();
        Self { types }
    }

    /// Add a named type (scalar, object or enum).
    pub fn register(&mut self, ty: InputType) -> Result<(), SchemaError> {
        let name = match &ty {
            InputType::Scalar(_) | InputType::Object(_) | InputType::Enum(_) => {
                ty.type_name().unwrap_or_default().to_string()
            }
            other => return Err(SchemaError::NotNamed(other.to_string())),
        };
        if !is_valid_name(&name) {
            return Err(SchemaError::InvalidName(name));
        }
        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateType(name));
        }
        tracing::trace!(%name, kind = ty.kind_name(), "registered type");
        self.types.insert(name, ty);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, ty: InputType) -> Result<Self, SchemaError> {
        self.register(ty)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&InputType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Types in registration order, built-ins first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputType)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumType, ObjectType};

    #[test]
    fn builtins_are_present() {
        let reg = TypeRegistry::new();
        for name in ["String", "Int", "Float", "Boolean", "ID"] {
            assert!(reg.contains(name), "{name} missing");
        }
    }

    #[test]
    fn rejects_duplicates_wrappers_and_bad_names() {
        let mut reg = TypeRegistry::new();
        reg.register(InputType::object(ObjectType::new("jedi")))
            .unwrap();
        assert_eq!(
            reg.register(InputType::object(ObjectType::new("jedi"))),
            Err(SchemaError::DuplicateType("jedi".into()))
        );
        assert!(matches!(
            reg.register(InputType::list(InputType::named("jedi"))),
            Err(SchemaError::NotNamed(_))
        ));
        assert!(matches!(
            reg.register(InputType::enumeration(EnumType::new("bad-name", ["A"]))),
            Err(SchemaError::InvalidName(_))
        ));
    }

    #[test]
    fn named_references_resolve_lazily() {
        let reg = TypeRegistry::new()
            .with(InputType::object(ObjectType::new("sith")))
            .unwrap();
        let late = InputType::named("sith");
        assert!(matches!(late.resolve(&reg), Some(InputType::Object(o)) if o.name == "sith"));
        assert!(InputType::named("nope").resolve(&reg).is_none());
    }
}
