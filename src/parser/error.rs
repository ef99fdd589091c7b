use crate::lexer::{LexicalError, Span, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected {expected} but got token {actual}.")]
    UnexpectedToken {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("Expected an expression but got token {0}.")]
    NonExpression(TokenKind),
    #[error("Expected a statement but got {0}.")]
    InvalidStatement(TokenKind),
    #[error("Integer literal {0} does not fit in 64 bits.")]
    InvalidNumber(String),
    #[error("Encountered a lexer error {0}.")]
    LexicalError(#[from] LexicalError),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression(_) => "PA002",
            ParserErrorKind::InvalidStatement(_) => "PA003",
            ParserErrorKind::InvalidNumber(_) => "PA004",
            ParserErrorKind::LexicalError(ref error) => error.code(),
        }
    }
}

impl From<LexicalError> for ParserError {
    fn from(value: LexicalError) -> Self {
        Self {
            span: value.span,
            kind: ParserErrorKind::LexicalError(value),
        }
    }
}
