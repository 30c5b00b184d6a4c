use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use union_input::schema::{InputType, ObjectType, TypeRegistry, scalars};
use union_input::{SchemaDocument, Source, UnionError, UnionInputTypeConfig, parse_literal};

/// `jedi.friends` refers back to `jediUnion`, which resolves keys through a
/// callback. `sithUnion` is a union of the single-candidate unions `qqq` and `www`.
fn registry() -> TypeRegistry {
    let jedi = InputType::object(
        ObjectType::new("jedi")
            .field("name", scalars::string())
            .field("friends", InputType::list(InputType::named("jediUnion"))),
    );
    let sith = InputType::object(
        ObjectType::new("sith")
            .field("name", scalars::string())
            .field("doubleBlade", scalars::boolean())
            .field("allies", InputType::named("sithUnion")),
    );
    let jedi_union = UnionInputTypeConfig::new("jediUnion")
        .resolve_type({
            let jedi = jedi.clone();
            move |key| (key == "jedi").then(|| jedi.clone())
        })
        .build()
        .unwrap()
        .into_input_type();
    let qqq = UnionInputTypeConfig::new("qqq")
        .input_types([jedi.clone()])
        .build()
        .unwrap()
        .into_input_type();
    let www = UnionInputTypeConfig::new("www")
        .input_types([sith.clone()])
        .build()
        .unwrap()
        .into_input_type();
    let sith_union = UnionInputTypeConfig::new("sithUnion")
        .input_types([qqq.clone(), www.clone()])
        .build()
        .unwrap()
        .into_input_type();

    TypeRegistry::new()
        .with(jedi)
        .and_then(|r| r.with(sith))
        .and_then(|r| r.with(jedi_union))
        .and_then(|r| r.with(qqq))
        .and_then(|r| r.with(www))
        .and_then(|r| r.with(sith_union))
        .unwrap()
}

fn parse_value(reg: &TypeRegistry, union: &str, value: &Value) -> Result<Value, String> {
    let ty = reg.get(union).unwrap();
    let InputType::Scalar(scalar) = ty else {
        panic!("{union} is not a scalar")
    };
    scalar.parse_value(value, reg).map_err(|e| e.to_string())
}

fn parse_lit(reg: &TypeRegistry, union: &str, src: &str) -> Result<Value, String> {
    let InputType::Scalar(scalar) = reg.get(union).unwrap() else {
        panic!("{union} is not a scalar")
    };
    let source = Source::anonymous(src);
    let node = parse_literal(&source).unwrap();
    scalar
        .parse_literal(&node, &source, reg)
        .map_err(|e| e.to_string())
}

#[test]
fn self_reference_three_levels_deep() {
    let reg = registry();
    let value = json!({"_type_": "jedi", "_value_": {"name": "Luke", "friends": [
        {"_type_": "jedi", "_value_": {"name": "Obi-Wan", "friends": [
            {"_type_": "jedi", "_value_": {"name": "Qui-Gon", "friends": []}}
        ]}}
    ]}});
    assert_eq!(parse_value(&reg, "jediUnion", &value).unwrap(), value);

    let lit = r#"{_type_: "jedi", _value_: {name: "Luke", friends: [
        {_type_: "jedi", _value_: {name: "Obi-Wan", friends: [{_type_: "jedi", _value_: {name: "Qui-Gon"}}]}}
    ]}}"#;
    assert_eq!(
        parse_lit(&reg, "jediUnion", lit).unwrap(),
        json!({"_type_": "jedi", "_value_": {"name": "Luke", "friends": [
            {"_type_": "jedi", "_value_": {"name": "Obi-Wan", "friends": [
                {"_type_": "jedi", "_value_": {"name": "Qui-Gon"}}
            ]}}
        ]}})
    );
}

#[test]
fn deep_failures_surface_at_the_outer_union() {
    let reg = registry();
    let value = json!({"_type_": "jedi", "_value_": {"friends": [
        {"_type_": "jedi", "_value_": {"friends": [{"_type_": "sith", "_value_": {}}]}}
    ]}});
    let message = parse_value(&reg, "jediUnion", &value).unwrap_err();
    assert!(
        message.starts_with("jediUnion(UnionInputType): value does not match type \"jedi\":"),
        "{message}"
    );
    assert!(
        message.contains("The type resolver returned no type."),
        "{message}"
    );
}

#[test]
fn union_of_unions() {
    let reg = registry();
    let maul = json!({"_type_": "www", "_value_": {"_type_": "sith", "_value_": {"name": "Maul", "doubleBlade": true}}});
    assert_eq!(parse_value(&reg, "sithUnion", &maul).unwrap(), maul);

    let nested = json!({"_type_": "www", "_value_": {"_type_": "sith", "_value_": {"name": "Sidious", "allies":
        {"_type_": "qqq", "_value_": {"_type_": "jedi", "_value_": {"name": "Anakin"}}}
    }}});
    assert_eq!(parse_value(&reg, "sithUnion", &nested).unwrap(), nested);

    let wrong_inner = json!({"_type_": "qqq", "_value_": {"_type_": "sith", "_value_": {}}});
    assert!(parse_value(&reg, "sithUnion", &wrong_inner).is_err());

    let lit = r#"{_type_: "qqq", _value_: {_type_: "jedi", _value_: {name: "Kenobi"}}}"#;
    assert_eq!(
        parse_lit(&reg, "sithUnion", lit).unwrap(),
        json!({"_type_": "qqq", "_value_": {"_type_": "jedi", "_value_": {"name": "Kenobi"}}})
    );
}

#[test]
fn accepted_values_round_trip_through_serialize() {
    let reg = registry();
    let InputType::Scalar(scalar) = reg.get("sithUnion").unwrap() else {
        panic!()
    };
    let value =
        json!({"_type_": "qqq", "_value_": {"_type_": "jedi", "_value_": {"name": "Ahsoka"}}});
    let parsed = scalar.parse_value(&value, &reg).unwrap();
    assert_eq!(scalar.serialize(&parsed), value);
}

#[test]
fn schema_documents_build_the_same_shapes() {
    let schema = SchemaDocument::from_json_str(
        r#"{"types": [
            {"kind": "object", "name": "jedi", "fields": {"name": "String", "friends": "[jediUnion]"}},
            {"kind": "union", "name": "jediUnion", "inputTypes": ["jedi"]}
        ]}"#,
    )
    .unwrap()
    .build()
    .unwrap();
    let union = schema.union("jediUnion").unwrap();
    let value = json!({"_type_": "jedi", "_value_": {"friends": {"_type_": "jedi", "_value_": {"name": "Rey"}}}});
    assert_eq!(union.parse_value(&value, &schema.registry).unwrap(), value);

    let err = union
        .parse_value(
            &json!({"_type_": "jedi", "_value_": {"rank": 1}}),
            &schema.registry,
        )
        .unwrap_err();
    assert!(matches!(err, UnionError::CoercionFailed { ref type_name, .. } if type_name == "jedi"));
}
