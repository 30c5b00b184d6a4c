//! Recursive-descent parser for a single input-value literal.

use super::lexer::{SpannedToken, Token, tokenize};
use super::{LiteralError, Name, NodeValue, ObjectField, Source, Span, ValueNode};

/// Deepest list/object nesting accepted, the same limit `serde_json` applies
/// to runtime values.
pub const MAX_DEPTH: usize = 128;

/// Parse `source` as exactly one value literal.
pub fn parse_literal(source: &Source) -> Result<ValueNode, LiteralError> {
    let tokens = tokenize(&source.body)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.body.len(),
        depth: 0,
    };
    let node = parser.value()?;
    if let Some(extra) = parser.peek() {
        return Err(LiteralError::TrailingInput { span: extra.span });
    }
    Ok(node)
}

struct Parser<'a> {
    tokens: Vec<SpannedToken<'a>>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<SpannedToken<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self, expected: &str) -> Result<SpannedToken<'a>, LiteralError> {
        match self.peek() {
            Some(tok) => {
                self.pos += 1;
                Ok(tok)
            }
            None => Err(LiteralError::UnexpectedEof {
                expected: expected.to_string(),
                span: Span::new(self.end, self.end),
            }),
        }
    }

    fn expect(&mut self, token: Token) -> Result<SpannedToken<'a>, LiteralError> {
        let tok = self.bump(token.describe())?;
        if tok.token != token {
            return Err(unexpected(tok, token.describe()));
        }
        Ok(tok)
    }

    fn value(&mut self) -> Result<ValueNode, LiteralError> {
        let tok = self.bump("value")?;
        let value = match tok.token {
            Token::BraceOpen | Token::BracketOpen => return self.nested(tok),
            Token::Int => NodeValue::Int(tok.text.to_string()),
            Token::Float => NodeValue::Float(tok.text.to_string()),
            Token::String => NodeValue::String(unescape(tok.text, tok.span)?),
            Token::Name => match tok.text {
                "true" => NodeValue::Boolean(true),
                "false" => NodeValue::Boolean(false),
                "null" => NodeValue::Null,
                name => NodeValue::Enum(name.to_string()),
            },
            _ => return Err(unexpected(tok, "value")),
        };
        Ok(ValueNode::new(value, tok.span))
    }

    fn nested(&mut self, open: SpannedToken<'a>) -> Result<ValueNode, LiteralError> {
        if self.depth == MAX_DEPTH {
            return Err(LiteralError::TooDeep {
                limit: MAX_DEPTH,
                span: open.span,
            });
        }
        self.depth += 1;
        let node = match open.token {
            Token::BraceOpen => self.object(open.span),
            _ => self.list(open.span),
        };
        self.depth -= 1;
        node
    }

    fn list(&mut self, open: Span) -> Result<ValueNode, LiteralError> {
        let mut values = Vec::new();
        loop {
            match self.peek() {
                Some(tok) if tok.token == Token::BracketClose => {
                    self.pos += 1;
                    return Ok(ValueNode::new(
                        NodeValue::List(values),
                        open.merge(&tok.span),
                    ));
                }
                _ => values.push(self.value()?),
            }
        }
    }

    fn object(&mut self, open: Span) -> Result<ValueNode, LiteralError> {
        let mut fields = Vec::new();
        loop {
            let tok = self.bump("field name or '}'")?;
            match tok.token {
                Token::BraceClose => {
                    return Ok(ValueNode::new(
                        NodeValue::Object(fields),
                        open.merge(&tok.span),
                    ));
                }
                Token::Name => {
                    self.expect(Token::Colon)?;
                    let value = self.value()?;
                    let span = tok.span.merge(&value.span);
                    fields.push(ObjectField {
                        name: Name {
                            value: tok.text.to_string(),
                            span: tok.span,
                        },
                        value,
                        span,
                    });
                }
                _ => return Err(unexpected(tok, "field name or '}'")),
            }
        }
    }
}

fn unexpected(tok: SpannedToken<'_>, expected: &str) -> LiteralError {
    LiteralError::UnexpectedToken {
        found: tok.text.to_string(),
        expected: expected.to_string(),
        span: tok.span,
    }
}

/// Decode a quoted string token (quotes included).
fn unescape(raw: &str, span: Span) -> Result<String, LiteralError> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let bad = |len: usize| LiteralError::InvalidEscape {
            sequence: inner[i..(i + len).min(inner.len())].to_string(),
            span: Span::new(
                span.start + 1 + i,
                span.start + 1 + (i + len).min(inner.len()),
            ),
        };
        let Some((_, esc)) = chars.next() else {
            return Err(bad(1));
        };
        match esc {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '/' => out.push('/'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let hex = inner
                    .get(i + 2..i + 6)
                    .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                    .ok_or_else(|| bad(6))?;
                let decoded = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| bad(6))?;
                out.push(decoded);
                for _ in 0..4 {
                    chars.next();
                }
            }
            _ => return Err(bad(2)),
        }
    }
    Ok(out)
}
