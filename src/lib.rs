//! Tagged-union input types: resolve which of several candidate input types
//! a value belongs to, then validate it against that type, for both runtime
//! JSON values and literals embedded in query text.
pub mod ast;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod path_de;
pub mod schema;
pub mod union;

pub use ast::{Source, ValueNode, parse_literal};
pub use config::SchemaDocument;
pub use schema::{InputType, ObjectType, ScalarType, TypeRegistry};
pub use union::{UnionError, UnionInputType, UnionInputTypeConfig};
