use super::Value;
use crate::lexer::{LineBreaks, SourcePosition, Span};
use crate::string::IdentName;
use compact_str::CompactString;
use thiserror::Error;

/// A `break` or `continue` that found no enclosing loop.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    #[error("`break` outside of a loop")]
    Break,
    #[error("`continue` outside of a loop")]
    Continue,
}

#[derive(Debug, Error, Clone)]
pub enum TypeMismatch {
    #[error("Non-Number {{Unary}}: {0}")]
    NonNumeric(Value),
    #[error("Non-Numbers {{Binary}}: [{0} , {1}]")]
    NonNumerics(Value, Value),
    #[error("Non-Boolean: {0}")]
    NonBoolean(Value),
    #[error("Incomparable: [{0} , {1}]")]
    Incomparable(Value, Value),
}

#[derive(Debug, Error, Clone)]
pub enum RuntimeErrorKind {
    #[error("Undefined Variable: {0}")]
    UndefinedVariable(IdentName),
    #[error("Undefined Function: {0}")]
    UndefinedFunction(IdentName),
    #[error("Type Mismatch: {0}")]
    TypeMismatch(#[from] TypeMismatch),
    #[error("Arity Mismatch: `{name}` takes {expected} arguments but got {actual}")]
    ArityMismatch {
        name: IdentName,
        expected: usize,
        actual: usize,
    },
    #[error("Division By Zero")]
    DivisionByZero,
    #[error("Control Flow Error: {0}")]
    ControlFlowError(ControlSignal),
    #[error("Stack Exhausted: call depth exceeded {0}")]
    StackExhausted(usize),
    #[error("Invalid Input: {0}")]
    InvalidInput(CompactString),
}

#[derive(Debug, Error, Clone)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(kind: impl Into<RuntimeErrorKind>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::UndefinedVariable(_) => "RT001",
            RuntimeErrorKind::UndefinedFunction(_) => "RT002",
            RuntimeErrorKind::TypeMismatch(_) => "RT003",
            RuntimeErrorKind::ArityMismatch { .. } => "RT004",
            RuntimeErrorKind::DivisionByZero => "RT005",
            RuntimeErrorKind::ControlFlowError(_) => "RT006",
            RuntimeErrorKind::StackExhausted(_) => "RT007",
            RuntimeErrorKind::InvalidInput(_) => "RT008",
        }
    }

    pub fn position(&self, line_breaks: &LineBreaks) -> SourcePosition {
        line_breaks.get_position_from_span(self.span)
    }
}
