//! Literal syntax tree for input values embedded in query text.
//!
//! The shape follows GraphQL's value grammar: scalars, enum names, lists and
//! objects whose fields keep their source order. Every node carries a byte
//! span into its [`Source`] so callers can quote the offending text.
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use parser::parse_literal;

// ————————————————————————————————————————————————————————————————————————————
// SOURCE
// ————————————————————————————————————————————————————————————————————————————

/// Byte range into a [`Source`] body (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Literal text together with a display name (file path, `<expr>`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub body: String,
}

impl Source {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Anonymous source, for literals built in code.
    pub fn anonymous(body: impl Into<String>) -> Self {
        Self::new("<literal>", body)
    }

    /// Exact source text of `span`; empty when the span is out of range.
    pub fn slice(&self, span: Span) -> &str {
        self.body.get(span.start..span.end).unwrap_or("")
    }

    /// 1-indexed (line, column) of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.body.len());
        let before = &self.body.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        (line, offset - line_start + 1)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// NODES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Int,
    Float,
    String,
    Boolean,
    Enum,
    List,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    pub value: NodeValue,
    pub span: Span,
}

/// Numbers stay in their source spelling; scalars decide how to read them.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Null,
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<ValueNode>),
    Object(Vec<ObjectField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: Name,
    pub value: ValueNode,
    pub span: Span,
}

impl ValueNode {
    pub fn new(value: NodeValue, span: Span) -> Self {
        Self { value, span }
    }

    pub fn kind(&self) -> ValueKind {
        match &self.value {
            NodeValue::Null => ValueKind::Null,
            NodeValue::Int(_) => ValueKind::Int,
            NodeValue::Float(_) => ValueKind::Float,
            NodeValue::String(_) => ValueKind::String,
            NodeValue::Boolean(_) => ValueKind::Boolean,
            NodeValue::Enum(_) => ValueKind::Enum,
            NodeValue::List(_) => ValueKind::List,
            NodeValue::Object(_) => ValueKind::Object,
        }
    }

    /// Ordered field list of an object literal.
    pub fn fields(&self) -> Option<&[ObjectField]> {
        match &self.value {
            NodeValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// First field named `name`, for object literals.
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        self.fields()?.iter().find(|f| f.name.value == name)
    }

    /// Raw text of a scalar-ish literal (string contents, enum name, number
    /// spelling). `None` for null, lists and objects.
    pub fn as_scalar_text(&self) -> Option<&str> {
        match &self.value {
            NodeValue::String(s) | NodeValue::Enum(s) | NodeValue::Int(s) | NodeValue::Float(s) => {
                Some(s)
            }
            _ => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unexpected token '{found}' at {}..{}, expected {expected}", span.start, span.end)]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("unexpected end of input at {}, expected {expected}", span.start)]
    UnexpectedEof { expected: String, span: Span },

    #[error("invalid escape sequence '{sequence}' at {}..{}", span.start, span.end)]
    InvalidEscape { sequence: String, span: Span },

    #[error("unrecognized token '{text}' at {}..{}", span.start, span.end)]
    Unrecognized { text: String, span: Span },

    #[error("unexpected trailing input at {}..{}", span.start, span.end)]
    TrailingInput { span: Span },

    #[error("literal nests deeper than {limit} lists or objects at {}", span.start)]
    TooDeep { limit: usize, span: Span },
}

impl LiteralError {
    pub fn span(&self) -> Span {
        match self {
            LiteralError::UnexpectedToken { span, .. }
            | LiteralError::UnexpectedEof { span, .. }
            | LiteralError::InvalidEscape { span, .. }
            | LiteralError::Unrecognized { span, .. }
            | LiteralError::TrailingInput { span }
            | LiteralError::TooDeep { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_col_counts_from_one() {
        let src = Source::anonymous("{\n  a: 1\n}");
        assert_eq!(src.line_col(0), (1, 1));
        assert_eq!(src.line_col(4), (2, 3));
        assert_eq!(src.slice(Span::new(4, 8)), "a: 1");
    }

    #[test]
    fn field_lookup_keeps_first_match() {
        let src = Source::anonymous(r#"{side: "SITH", name: "Maul"}"#);
        let node = parse_literal(&src).unwrap();
        assert_eq!(node.kind(), ValueKind::Object);
        let side = node.field("side").unwrap();
        assert_eq!(side.value.as_scalar_text(), Some("SITH"));
        assert!(node.field("missing").is_none());
    }
}
