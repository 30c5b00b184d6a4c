//! JSON schema documents.
//!
//! ```json
//! {"types": [
//!   {"kind": "object", "name": "jedi", "fields": {"name": "String!", "friends": "[jediUnion]"}},
//!   {"kind": "union", "name": "jediUnion", "inputTypes": ["jedi", "sith"]},
//!   {"kind": "union", "name": "heroUnion", "typeKey": "side", "inputTypes": {"JEDI": "jedi"}}
//! ]}
//! ```
//!
//! Object fields refer to types by name, so declaration order does not
//! matter and objects may reference themselves through unions. Unions hold
//! their candidates by handle and are therefore built in dependency order.
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde_json::{Value, json};

use crate::path_de::{DocumentError, from_str_with_path};
use crate::schema::{
    EnumType, InputField, InputType, ObjectType, SchemaError, TypeRegistry, parse_type_ref,
};
use crate::union::{UnionInputType, UnionInputTypeConfig};

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDef {
    Object(ObjectDef),
    Enum(EnumDef),
    Union(UnionDef),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Pairs<FieldDef>,
}

/// `"String!"` or `{"type": "String!", "description": ..., "defaultValue": ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldDef {
    Short(String),
    Full {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, rename = "defaultValue")]
        default_value: Option<Value>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub type_key: Option<String>,
    pub input_types: InputTypesDef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InputTypesDef {
    List(Vec<String>),
    Keyed(Pairs<String>),
}

/// A JSON object read as its raw member list, in document order. Repeated
/// keys are kept so the schema builder can reject them.
#[derive(Debug, Clone, Default)]
pub struct Pairs<T>(pub Vec<(String, T)>);

/// Registry plus typed handles to every union it declares.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    pub registry: TypeRegistry,
    pub unions: IndexMap<String, Arc<UnionInputType>>,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read schema document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema document {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: DocumentError,
    },
    #[error("invalid schema document {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<T> Pairs<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, (String, T)> {
        self.0.iter()
    }
}

impl<'a, T> IntoIterator for &'a Pairs<T> {
    type Item = &'a (String, T);
    type IntoIter = std::slice::Iter<'a, (String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Pairs<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for PairsVisitor<T> {
            type Value = Pairs<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    out.push(entry);
                }
                Ok(Pairs(out))
            }
        }

        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }
}

impl SchemaDocument {
    pub fn from_json_str(src: &str) -> Result<Self, DocumentError> {
        from_str_with_path(src)
    }

    /// Read, parse and compile a document file.
    pub fn load(path: &Path) -> Result<CompiledSchema, LoadError> {
        let display = path.display().to_string();
        let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: display.clone(),
            source,
        })?;
        let document = Self::from_json_str(&src).map_err(|source| LoadError::Document {
            path: display.clone(),
            source,
        })?;
        document.build().map_err(|source| LoadError::Schema {
            path: display,
            source,
        })
    }

    pub fn build(&self) -> Result<CompiledSchema, SchemaError> {
        let mut registry = TypeRegistry::new();
        let mut unions = IndexMap::<&str, &UnionDef>::new();

        for def in &self.types {
            match def {
                TypeDef::Object(object) => registry.register(object.to_input_type()?)?,
                TypeDef::Enum(enum_) => registry.register(enum_.to_input_type())?,
                TypeDef::Union(union) => {
                    if unions.insert(union.name.as_str(), union).is_some() {
                        return Err(SchemaError::DuplicateType(union.name.clone()));
                    }
                }
            }
        }
        if let Some(name) = unions.keys().find(|name| registry.contains(name)) {
            return Err(SchemaError::DuplicateType(name.to_string()));
        }

        let mut builder = UnionBuilder {
            defs: &unions,
            registry,
            built: IndexMap::new(),
            visiting: Vec::new(),
        };
        for name in unions.keys() {
            builder.ensure(name)?;
        }
        let UnionBuilder {
            registry, built, ..
        } = builder;

        for def in &self.types {
            let TypeDef::Object(object) = def else {
                continue;
            };
            for (field_name, field) in &object.fields {
                let ty = parse_type_ref(field.type_ref())?;
                let name = innermost_name(&ty);
                if !registry.contains(name) {
                    return Err(SchemaError::UnknownType {
                        name: name.to_string(),
                        referenced_by: format!("{}.{field_name}", object.name),
                    });
                }
            }
        }

        tracing::debug!(
            types = registry.len(),
            unions = built.len(),
            "compiled schema document"
        );
        Ok(CompiledSchema {
            registry,
            unions: built,
        })
    }
}

impl FieldDef {
    fn type_ref(&self) -> &str {
        match self {
            FieldDef::Short(ty) | FieldDef::Full { ty, .. } => ty,
        }
    }
}

impl ObjectDef {
    fn to_input_type(&self) -> Result<InputType, SchemaError> {
        let mut object = ObjectType::new(&self.name);
        object.description = self.description.clone();
        for (name, def) in &self.fields {
            if object.fields.contains_key(name) {
                return Err(SchemaError::DuplicateField {
                    type_name: self.name.clone(),
                    field: name.clone(),
                });
            }
            let mut field = InputField::new(name, parse_type_ref(def.type_ref())?);
            if let FieldDef::Full {
                description,
                default_value,
                ..
            } = def
            {
                field.description = description.clone();
                field.default_value = default_value.clone();
            }
            object.push_field(field);
        }
        Ok(InputType::object(object))
    }
}

impl EnumDef {
    fn to_input_type(&self) -> InputType {
        let mut enum_ = EnumType::new(&self.name, self.values.iter().cloned());
        enum_.description = self.description.clone();
        InputType::enumeration(enum_)
    }
}

fn innermost_name(ty: &InputType) -> &str {
    match ty {
        InputType::List(inner) | InputType::NonNull(inner) => innermost_name(inner),
        named => named.type_name().unwrap_or_default(),
    }
}

struct UnionBuilder<'a> {
    defs: &'a IndexMap<&'a str, &'a UnionDef>,
    registry: TypeRegistry,
    built: IndexMap<String, Arc<UnionInputType>>,
    visiting: Vec<String>,
}

impl UnionBuilder<'_> {
    /// Build `name` after every union it lists as a candidate.
    fn ensure(&mut self, name: &str) -> Result<InputType, SchemaError> {
        if let Some(ty) = self.registry.get(name) {
            return Ok(ty.clone());
        }
        if let Some(pos) = self.visiting.iter().position(|v| v == name) {
            let mut cycle = self.visiting[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(SchemaError::UnionCycle(cycle));
        }
        let Some(def) = self.defs.get(name).copied() else {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
                referenced_by: self.visiting.last().cloned().unwrap_or_default(),
            });
        };

        self.visiting.push(name.to_string());
        let mut config = UnionInputTypeConfig::new(&def.name);
        config.description = def.description.clone();
        config.type_key = def.type_key.clone();
        config = match &def.input_types {
            InputTypesDef::List(names) => {
                let types = names
                    .iter()
                    .map(|n| self.ensure(n))
                    .collect::<Result<Vec<_>, _>>()?;
                config.input_types(types)
            }
            InputTypesDef::Keyed(pairs) => {
                let types = pairs
                    .iter()
                    .map(|(key, n)| Ok((key.clone(), self.ensure(n)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                config.keyed_input_types(types)
            }
        };
        self.visiting.pop();

        let union = Arc::new(config.build()?);
        let ty = InputType::Scalar(union.clone());
        self.registry.register(ty.clone())?;
        self.built.insert(def.name.clone(), union);
        Ok(ty)
    }
}

impl CompiledSchema {
    pub fn union(&self, name: &str) -> Option<&UnionInputType> {
        self.unions.get(name).map(Arc::as_ref)
    }

    /// JSON overview of every registered type.
    pub fn describe(&self) -> Value {
        let types: Vec<Value> = self
            .registry
            .iter()
            .map(|(name, ty)| {
                let mut entry = json!({ "name": name, "kind": ty.kind_name() });
                match ty {
                    InputType::Object(object) => {
                        let fields: serde_json::Map<String, Value> = object
                            .fields
                            .values()
                            .map(|f| (f.name.clone(), Value::from(f.ty.to_string())))
                            .collect();
                        entry["fields"] = Value::Object(fields);
                    }
                    InputType::Enum(enum_) => {
                        entry["values"] = json!(enum_.values);
                    }
                    _ => {}
                }
                if let Some(union) = self.union(name) {
                    entry["kind"] = Value::from("union");
                    entry["typeKey"] = json!(union.type_key());
                    entry["inputTypes"] = json!(union.candidate_keys());
                }
                let description = match ty {
                    InputType::Scalar(s) => s.description(),
                    InputType::Object(o) => o.description.as_deref(),
                    InputType::Enum(e) => e.description.as_deref(),
                    _ => None,
                };
                if let Some(d) = description {
                    entry["description"] = Value::from(d);
                }
                entry
            })
            .collect();
        json!({ "types": types })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::union::UnionError;
    use pretty_assertions::assert_eq;

    fn build(src: &str) -> Result<CompiledSchema, SchemaError> {
        SchemaDocument::from_json_str(src).unwrap().build()
    }

    const STAR_WARS: &str = r#"{"types": [
        {"kind": "object", "name": "jedi", "fields": {
            "name": "String", "saberColor": "String", "friends": "[jediUnion]"}},
        {"kind": "object", "name": "sith", "fields": {
            "name": "String", "saberColor": "String", "doubleBlade": "Boolean",
            "friends": {"type": "sithUnion!", "description": "allies"}}},
        {"kind": "union", "name": "sithUnion", "inputTypes": ["qqq", "www"]},
        {"kind": "union", "name": "qqq", "inputTypes": ["jedi"]},
        {"kind": "union", "name": "www", "inputTypes": ["jedi"]},
        {"kind": "union", "name": "jediUnion", "inputTypes": ["jedi", "sith"]},
        {"kind": "union", "name": "heroUnion", "description": "any hero", "inputTypes": ["jedi", "sith"]}
    ]}"#;

    #[test]
    fn unions_of_unions_build_in_dependency_order() {
        let schema = build(STAR_WARS).unwrap();
        assert_eq!(
            schema.unions.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["qqq", "www", "sithUnion", "jediUnion", "heroUnion"]
        );
        assert_eq!(
            schema.union("sithUnion").unwrap().candidate_keys(),
            Some(vec!["qqq", "www"])
        );
    }

    #[test]
    fn union_cycles_are_reported() {
        let err = build(
            r#"{"types": [
                {"kind": "union", "name": "a", "inputTypes": ["b"]},
                {"kind": "union", "name": "b", "inputTypes": ["a"]}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnionCycle(vec!["a".into(), "b".into(), "a".into()])
        );
    }

    #[test]
    fn unknown_references_are_reported() {
        let err = build(r#"{"types": [{"kind": "union", "name": "u", "inputTypes": ["ghost"]}]}"#)
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                name: "ghost".into(),
                referenced_by: "u".into()
            }
        );

        let err =
            build(r#"{"types": [{"kind": "object", "name": "o", "fields": {"f": "[Ghost!]"}}]}"#)
                .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownType {
                name: "Ghost".into(),
                referenced_by: "o.f".into()
            }
        );
    }

    #[test]
    fn enum_candidates_are_rejected() {
        let err = build(
            r#"{"types": [
                {"kind": "enum", "name": "Side", "values": ["JEDI", "SITH"]},
                {"kind": "union", "name": "u", "typeKey": "side", "inputTypes": {"S": "Side"}}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Union(ref e) if e.kind() == "InvalidCandidateKind"));
    }

    #[test]
    fn repeated_keys_in_documents_are_rejected() {
        let err = build(
            r#"{"types": [
                {"kind": "object", "name": "jedi", "fields": {"name": "String"}},
                {"kind": "object", "name": "sith", "fields": {"name": "String"}},
                {"kind": "union", "name": "heroUnion", "typeKey": "side",
                 "inputTypes": {"JEDI": "jedi", "JEDI": "sith"}}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::Union(UnionError::DuplicateDiscriminator {
                union: "heroUnion".into(),
                key: "JEDI".into()
            })
        );

        let err = build(
            r#"{"types": [{"kind": "object", "name": "jedi", "fields": {"name": "String", "name": "Int"}}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                type_name: "jedi".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn keyed_candidates_keep_document_order() {
        let schema = build(
            r#"{"types": [
                {"kind": "object", "name": "jedi", "fields": {"side": "String"}},
                {"kind": "object", "name": "sith", "fields": {"side": "String"}},
                {"kind": "union", "name": "heroUnion", "typeKey": "side",
                 "inputTypes": {"SITH": "sith", "JEDI": "jedi"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            schema.union("heroUnion").unwrap().candidate_keys(),
            Some(vec!["SITH", "JEDI"])
        );
    }

    #[test]
    fn document_errors_carry_json_path() {
        let err = SchemaDocument::from_json_str(
            r#"{"types": [{"kind": "enum", "name": "E", "values": [1]}]}"#,
        )
        .unwrap_err();
        assert!(err.path.starts_with("types[0]"), "{}", err.path);
    }

    #[test]
    fn describe_lists_union_keys() {
        let schema = build(STAR_WARS).unwrap();
        let described = schema.describe();
        let hero = described["types"]
            .as_array()
            .unwrap()
            .iter()
            .find(|t| t["name"] == "heroUnion")
            .unwrap();
        assert_eq!(
            hero,
            &json!({
                "name": "heroUnion",
                "kind": "union",
                "typeKey": null,
                "inputTypes": ["jedi", "sith"],
                "description": "any hero"
            })
        );
    }
}
