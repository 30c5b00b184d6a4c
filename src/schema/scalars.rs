//! Built-in scalars: `String`, `Int`, `Float`, `Boolean`, `ID`.
use once_cell::sync::Lazy;
use serde_json::{Number, Value};

use super::{InputType, ScalarError, ScalarType, TypeRegistry};
use crate::ast::{NodeValue, Source, ValueNode};

static STRING: Lazy<InputType> = Lazy::new(|| InputType::scalar(StringScalar));
static INT: Lazy<InputType> = Lazy::new(|| InputType::scalar(IntScalar));
static FLOAT: Lazy<InputType> = Lazy::new(|| InputType::scalar(FloatScalar));
static BOOLEAN: Lazy<InputType> = Lazy::new(|| InputType::scalar(BooleanScalar));
static ID: Lazy<InputType> = Lazy::new(|| InputType::scalar(IdScalar));

pub fn string() -> InputType {
    STRING.clone()
}
pub fn int() -> InputType {
    INT.clone()
}
pub fn float() -> InputType {
    FLOAT.clone()
}
pub fn boolean() -> InputType {
    BOOLEAN.clone()
}
pub fn id() -> InputType {
    ID.clone()
}

pub fn builtins() -> [InputType; 5] {
    [string(), int(), float(), boolean(), id()]
}

fn invalid(msg: String) -> ScalarError {
    ScalarError::Invalid(msg)
}

fn int_from_f64(f: f64) -> Option<i32> {
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

fn float_value(f: f64) -> Result<Value, ScalarError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| invalid(format!("Float cannot represent non numeric value: {f}")))
}

fn literal_mismatch(scalar: &str, node: &ValueNode, source: &Source) -> ScalarError {
    invalid(format!(
        "{scalar} cannot represent a non {} value: {}",
        scalar.to_lowercase(),
        source.slice(node.span)
    ))
}

// ---------------------------------- String ---------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct StringScalar;

impl ScalarType for StringScalar {
    fn name(&self) -> &str {
        "String"
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, _: &TypeRegistry) -> Result<Value, ScalarError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(invalid(format!(
                "String cannot represent a non string value: {other}"
            ))),
        }
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        _: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        match &node.value {
            NodeValue::String(s) => Ok(Value::String(s.clone())),
            _ => Err(literal_mismatch("String", node, source)),
        }
    }
}

// ----------------------------------- Int ------------------------------------ //

/// Signed 32-bit, as GraphQL defines it.
#[derive(Debug, Clone, Copy)]
pub struct IntScalar;

impl ScalarType for IntScalar {
    fn name(&self) -> &str {
        "Int"
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, _: &TypeRegistry) -> Result<Value, ScalarError> {
        let Value::Number(n) = value else {
            return Err(invalid(format!(
                "Int cannot represent non-integer value: {value}"
            )));
        };
        let parsed = match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n.as_f64().and_then(int_from_f64),
        };
        match parsed {
            Some(i) => Ok(Value::from(i)),
            None if n.is_f64() => Err(invalid(format!(
                "Int cannot represent non-integer value: {n}"
            ))),
            None => Err(invalid(format!(
                "Int cannot represent non 32-bit signed integer value: {n}"
            ))),
        }
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        _: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        let NodeValue::Int(text) = &node.value else {
            return Err(literal_mismatch("Int", node, source));
        };
        text.parse::<i32>().map(Value::from).map_err(|_| {
            invalid(format!(
                "Int cannot represent non 32-bit signed integer value: {text}"
            ))
        })
    }
}

// ---------------------------------- Float ----------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct FloatScalar;

impl ScalarType for FloatScalar {
    fn name(&self) -> &str {
        "Float"
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, _: &TypeRegistry) -> Result<Value, ScalarError> {
        match value {
            Value::Number(_) => Ok(value.clone()),
            other => Err(invalid(format!(
                "Float cannot represent non numeric value: {other}"
            ))),
        }
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        _: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        match &node.value {
            NodeValue::Int(text) | NodeValue::Float(text) => {
                let f = text.parse::<f64>().map_err(|_| {
                    invalid(format!("Float cannot represent non numeric value: {text}"))
                })?;
                float_value(f)
            }
            _ => Err(literal_mismatch("Float", node, source)),
        }
    }
}

// --------------------------------- Boolean ---------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct BooleanScalar;

impl ScalarType for BooleanScalar {
    fn name(&self) -> &str {
        "Boolean"
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, _: &TypeRegistry) -> Result<Value, ScalarError> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(invalid(format!(
                "Boolean cannot represent a non boolean value: {other}"
            ))),
        }
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        _: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        match node.value {
            NodeValue::Boolean(b) => Ok(Value::Bool(b)),
            _ => Err(literal_mismatch("Boolean", node, source)),
        }
    }
}

// ------------------------------------ ID ------------------------------------ //

/// Accepts strings and integers; always yields a string.
#[derive(Debug, Clone, Copy)]
pub struct IdScalar;

impl ScalarType for IdScalar {
    fn name(&self) -> &str {
        "ID"
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn parse_value(&self, value: &Value, _: &TypeRegistry) -> Result<Value, ScalarError> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            other => Err(invalid(format!("ID cannot represent value: {other}"))),
        }
    }

    fn parse_literal(
        &self,
        node: &ValueNode,
        source: &Source,
        _: &TypeRegistry,
    ) -> Result<Value, ScalarError> {
        match &node.value {
            NodeValue::String(s) | NodeValue::Int(s) => Ok(Value::String(s.clone())),
            _ => Err(invalid(format!(
                "ID cannot represent a non-string and non-integer value: {}",
                source.slice(node.span)
            ))),
        }
    }
}
