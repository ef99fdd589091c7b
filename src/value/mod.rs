pub mod error;
pub mod formatter;

use crate::environment::FrameRef;
use crate::interpreter::SystemContext;
use crate::parser::statement::FunctionDef;
use error::{RuntimeErrorKind, TypeMismatch};
use std::sync::Arc;

pub trait NativeFunction: std::fmt::Debug + Send + Sync {
    fn get_name(&self) -> &'static str;
    fn get_parameters(&self) -> &'static [&'static str];
    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind>;
}

/// A user-defined function paired with the frame it was defined in.
#[derive(Debug, Clone)]
pub struct Function {
    pub definition: Arc<FunctionDef>,
    pub closure: FrameRef,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.definition.name.name
    }

    pub fn arity(&self) -> usize {
        self.definition.parameters.len()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Number(i64),
    Bool(bool),
    None,
    Function(Arc<Function>),
    NativeFunction(Arc<dyn NativeFunction>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::None => write!(f, "none"),
            Self::Function(fun) => write!(f, "<fn {}>", fun.name()),
            Self::NativeFunction(fun) => write!(f, "<native fn {}>", fun.get_name()),
        }
    }
}

/// Values of different variants are never equal. Functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::None, Value::None) => true,
            (Value::Function(lhs), Value::Function(rhs)) => Arc::ptr_eq(lhs, rhs),
            (Value::NativeFunction(lhs), Value::NativeFunction(rhs)) => Arc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::None => "none",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "native function",
        }
    }

    /// The frame a closure keeps alive, if any.
    pub fn get_closure(&self) -> Option<FrameRef> {
        match self {
            Value::Function(fun) => Some(fun.closure),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::NativeFunction(_))
    }

    /// Conditions and logical operands must be Booleans.
    pub fn as_condition(&self) -> Result<bool, RuntimeErrorKind> {
        match self {
            Value::Bool(v) => Ok(*v),
            v => Err(TypeMismatch::NonBoolean(v.clone()).into()),
        }
    }
}

// Unary operators
impl Value {
    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Number(v) => Ok(Value::Number(v.wrapping_neg())),
            v => Err(TypeMismatch::NonNumeric(v.clone()).into()),
        }
    }
}

impl Value {
    fn numeric_operands(&self, other: &Value) -> Result<(i64, i64), RuntimeErrorKind> {
        match (self, other) {
            (Value::Number(lhs), Value::Number(rhs)) => Ok((*lhs, *rhs)),
            (lhs, rhs) => Err(TypeMismatch::NonNumerics(lhs.clone(), rhs.clone()).into()),
        }
    }

    // Arithmetic
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Number(lhs.wrapping_add(rhs)))
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Number(lhs.wrapping_sub(rhs)))
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Number(lhs.wrapping_mul(rhs)))
    }

    /// Truncates toward zero.
    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match self.numeric_operands(other)? {
            (_, 0) => Err(RuntimeErrorKind::DivisionByZero),
            (lhs, rhs) => Ok(Value::Number(lhs.wrapping_div(rhs))),
        }
    }

    /// The remainder takes the sign of the dividend.
    pub fn remainder(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match self.numeric_operands(other)? {
            (_, 0) => Err(RuntimeErrorKind::DivisionByZero),
            (lhs, rhs) => Ok(Value::Number(lhs.wrapping_rem(rhs))),
        }
    }

    // Comparison
    pub fn less_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Bool(lhs < rhs))
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Bool(lhs <= rhs))
    }

    pub fn greater_than(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Bool(lhs > rhs))
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let (lhs, rhs) = self.numeric_operands(other)?;
        Ok(Value::Bool(lhs >= rhs))
    }

    // Equality
    pub fn is_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        let comparable = std::mem::discriminant(self) == std::mem::discriminant(other);
        if comparable {
            Ok(Value::Bool(self == other))
        } else {
            Err(TypeMismatch::Incomparable(self.clone(), other.clone()).into())
        }
    }

    pub fn is_not_equal(&self, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match self.is_equal(other)? {
            Value::Bool(v) => Ok(Value::Bool(!v)),
            v => Ok(v),
        }
    }
}
