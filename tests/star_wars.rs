use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use union_input::schema::{InputType, ObjectType, TypeRegistry, scalars};
use union_input::{Source, UnionError, UnionInputType, UnionInputTypeConfig, parse_literal};

fn jedi(with_side: bool) -> ObjectType {
    let object = ObjectType::new("jedi");
    let object = if with_side {
        object.field("side", InputType::non_null(scalars::string()))
    } else {
        object
    };
    object
        .field("name", scalars::string())
        .field("saberColor", scalars::string())
}

fn sith(with_side: bool) -> ObjectType {
    let object = ObjectType::new("sith");
    let object = if with_side {
        object.field("side", InputType::non_null(scalars::string()))
    } else {
        object
    };
    object
        .field("name", scalars::string())
        .field("saberColor", scalars::string())
        .field("doubleBlade", scalars::boolean())
}

fn implicit_union() -> UnionInputType {
    UnionInputTypeConfig::new("heroUnion")
        .input_types([
            InputType::object(jedi(false)),
            InputType::object(sith(false)),
        ])
        .build()
        .unwrap()
}

fn side_union() -> UnionInputType {
    UnionInputTypeConfig::new("heroUnion")
        .type_key("side")
        .keyed_input_types([
            ("JEDI", InputType::object(jedi(true))),
            ("SITH", InputType::object(sith(true))),
        ])
        .build()
        .unwrap()
}

fn literal(union: &UnionInputType, src: &str) -> Result<Value, UnionError> {
    let source = Source::new("query.graphql", src);
    let node = parse_literal(&source).unwrap();
    union.parse_literal(&node, &source, &TypeRegistry::new())
}

#[test]
fn implicit_wrapper_accepts_both_sides() {
    let union = implicit_union();
    let reg = TypeRegistry::new();
    for value in [
        json!({"_type_": "jedi", "_value_": {"name": "Luke", "saberColor": "green"}}),
        json!({"_type_": "sith", "_value_": {"name": "Maul", "saberColor": "red", "doubleBlade": true}}),
    ] {
        assert_eq!(union.parse_value(&value, &reg).unwrap(), value);
    }

    let yoda = literal(
        &union,
        r#"{_type_: "jedi", _value_: {name: "Yoda", saberColor: "green"}}"#,
    )
    .unwrap();
    assert_eq!(
        yoda,
        json!({"_type_": "jedi", "_value_": {"name": "Yoda", "saberColor": "green"}})
    );
}

#[test]
fn type_key_selects_by_side() {
    let union = side_union();
    let reg = TypeRegistry::new();
    let maul = json!({"side": "SITH", "name": "Maul", "doubleBlade": true});
    assert_eq!(union.parse_value(&maul, &reg).unwrap(), maul);

    let err = union
        .parse_value(&json!({"side": "JEDI", "doubleBlade": true}), &reg)
        .unwrap_err();
    assert_eq!(err.kind(), "CoercionFailed");
    assert!(
        err.to_string()
            .starts_with("heroUnion(UnionInputType): value does not match type \"jedi\":\n")
    );

    assert_eq!(
        literal(&union, r#"{name: "Yoda", side: "JEDI"}"#).unwrap(),
        json!({"side": "JEDI", "name": "Yoda"})
    );
}

#[test]
fn literal_wrapper_is_positional_but_runtime_is_not() {
    let union = implicit_union();
    let swapped = json!({"_value_": {"name": "Maul"}, "_type_": "sith"});
    assert!(union.parse_value(&swapped, &TypeRegistry::new()).is_ok());

    let err = literal(&union, r#"{_value_: {name: "Maul"}, _type_: "sith"}"#).unwrap_err();
    assert_eq!(
        err.to_string(),
        "heroUnion(UnionInputType): Expected an object literal with _type_ and _value_ fields in this order"
    );
}

#[test]
fn missing_members_are_reported() {
    let reg = TypeRegistry::new();
    let err = implicit_union()
        .parse_value(&json!({"_type_": "jedi"}), &reg)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "heroUnion(UnionInputType): Expected an object with _type_ and _value_ properties in this order"
    );

    let err = side_union()
        .parse_value(&json!({"name": "Yoda"}), &reg)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "heroUnion(UnionInputType): Expected an object with \"side\" property"
    );
}

#[test]
fn unknown_keys_list_what_is_expected() {
    let err = implicit_union()
        .parse_value(
            &json!({"_type_": "droid", "_value_": {"name": "R2"}}),
            &TypeRegistry::new(),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "heroUnion(UnionInputType): \"droid\" is not a valid type. Expected one of: jedi, sith"
    );

    let err = literal(&side_union(), r#"{side: "EWOK"}"#).unwrap_err();
    assert_eq!(
        err,
        UnionError::UnknownDiscriminatorValue {
            union: "heroUnion".into(),
            value: "EWOK".into(),
            expected: vec!["JEDI".into(), "SITH".into()],
        }
    );
}

#[test]
fn literal_mismatch_quotes_the_source() {
    let err = literal(
        &implicit_union(),
        r#"{_type_: "jedi", _value_: {doubleBlade: true}}"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"heroUnion(UnionInputType): expected type jedi, found {_type_: "jedi", _value_: {doubleBlade: true}}"#
    );
}

#[test]
fn independently_built_unions_agree() {
    let reg = TypeRegistry::new();
    let inputs = [
        json!({"side": "JEDI", "name": "Yoda"}),
        json!({"side": "SITH", "bogus": 1}),
        json!({"side": "EWOK"}),
        json!({"name": "Yoda"}),
        json!(null),
    ];
    let (first, second) = (side_union(), side_union());
    for value in &inputs {
        let a = first.parse_value(value, &reg);
        assert_eq!(a, second.parse_value(value, &reg), "{value}");
        assert_eq!(a, first.parse_value(value, &reg), "{value}");
    }

    let (first, second) = (implicit_union(), implicit_union());
    for src in [
        r#"{_type_: "sith", _value_: {name: "Maul", doubleBlade: true}}"#,
        r#"{_type_: "jedi", _value_: {doubleBlade: true}}"#,
        r#"{_value_: {}, _type_: "jedi"}"#,
    ] {
        assert_eq!(literal(&first, src), literal(&second, src), "{src}");
    }
}

#[test]
fn sith_payload_is_rejected_under_the_jedi_tag() {
    let union = implicit_union();
    let reg = TypeRegistry::new();
    let maul = json!({"name": "Maul", "saberColor": "red", "doubleBlade": true});

    let as_sith = json!({"_type_": "sith", "_value_": maul.clone()});
    assert_eq!(union.parse_value(&as_sith, &reg).unwrap(), as_sith);

    let as_jedi = json!({"_type_": "jedi", "_value_": maul});
    let err = union.parse_value(&as_jedi, &reg).unwrap_err();
    assert_eq!(err.kind(), "CoercionFailed");
    assert!(
        err.to_string()
            .contains("Field \"doubleBlade\" is not defined by type \"jedi\"."),
        "{err}"
    );

    let src = r#"{_type_: "jedi", _value_: {name: "Maul", saberColor: "red", doubleBlade: true}}"#;
    assert_eq!(
        literal(&union, src).unwrap_err().kind(),
        "LiteralTypeMismatch"
    );
}

#[test]
fn shared_across_threads() {
    let union = implicit_union();
    let reg = TypeRegistry::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (union, reg) = (&union, &reg);
                scope.spawn(move || {
                    let side = if i % 2 == 0 { "jedi" } else { "sith" };
                    let value =
                        json!({"_type_": side, "_value_": {"name": format!("padawan-{i}")}});
                    (value.clone(), union.parse_value(&value, reg))
                })
            })
            .collect();
        for handle in handles {
            let (value, result) = handle.join().unwrap();
            assert_eq!(result.unwrap(), value);
        }
    });
}
