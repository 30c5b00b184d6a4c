//! Tokens for input-value literals.
//!
//! Commas are insignificant, as in GraphQL, so they are skipped together
//! with whitespace and `#` line comments.

use logos::Logos;

use super::{LiteralError, Span};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n,]+|#[^\n]*)")]
pub enum Token {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(":")]
    Colon,
    #[regex(r"[_A-Za-z][_0-9A-Za-z]*")]
    Name,
    #[regex(r"-?(0|[1-9][0-9]*)")]
    Int,
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)")]
    Float,
    /// Quoted string including its quotes; escapes are decoded by the parser.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
}

impl Token {
    pub fn describe(&self) -> &'static str {
        match self {
            Token::BraceOpen => "'{'",
            Token::BraceClose => "'}'",
            Token::BracketOpen => "'['",
            Token::BracketClose => "']'",
            Token::Colon => "':'",
            Token::Name => "name",
            Token::Int => "int",
            Token::Float => "float",
            Token::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

/// Lex the whole input up front; literals are small.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken<'_>>, LiteralError> {
    let mut lexer = Token::lexer(source);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(token) => out.push(SpannedToken {
                token,
                span,
                text: lexer.slice(),
            }),
            Err(()) => {
                return Err(LiteralError::Unrecognized {
                    text: lexer.slice().to_string(),
                    span,
                });
            }
        }
    }
    Ok(out)
}
