mod call;
pub mod config;
pub mod context;
mod expression;
mod tree;

pub use config::InterpreterConfig;
pub use tree::{TreeWalkInterpreter, TreeWalkStatementInterpreter};

use crate::lexer::Span;
use crate::value::error::{ControlSignal, RuntimeError, RuntimeErrorKind};
use crate::value::Value;

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum ProgramState {
    Run,
    Return(Value),
    Break(Span),
    Continue(Span),
}

impl ProgramState {
    /// Interprets the state at a function or program boundary.
    ///
    /// `Some(v)` means the body returned `v`. A loop signal that got this far
    /// had no loop to act on.
    pub(crate) fn into_return_value(self) -> Result<Option<Value>, RuntimeError> {
        match self {
            ProgramState::Run => Ok(None),
            ProgramState::Return(value) => Ok(Some(value)),
            ProgramState::Break(span) => Err(RuntimeError::new(
                RuntimeErrorKind::ControlFlowError(ControlSignal::Break),
                span,
            )),
            ProgramState::Continue(span) => Err(RuntimeError::new(
                RuntimeErrorKind::ControlFlowError(ControlSignal::Continue),
                span,
            )),
        }
    }
}

/// The host side of `read` and `write`.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
    fn read_line(&mut self) -> Option<String>;
}
