use super::{SystemContext, TreeWalkStatementInterpreter};
use crate::environment::{Environment, FrameRef};
use crate::parser::expression::{
    AdditiveOperator, Addition, Atom, AtomKind, ComparisonOperator, Expr, ExprKind,
    LogicalOperator, Multiplication, MultiplicativeOperator,
};
use crate::stack::ensure_sufficient_stack;
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::Value;

// Expression evaluator
impl TreeWalkStatementInterpreter {
    pub fn evaluate<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        expr: &Expr,
    ) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Addition(addition) => {
                self.evaluate_addition(environment, frame, context, addition)
            }
            ExprKind::Comparison { operator, lhs, rhs } => {
                let lhs = self.evaluate_addition(environment, frame, context, lhs)?;
                let rhs = self.evaluate_addition(environment, frame, context, rhs)?;
                let result = match operator {
                    ComparisonOperator::Equal => lhs.is_equal(&rhs),
                    ComparisonOperator::NotEqual => lhs.is_not_equal(&rhs),
                    ComparisonOperator::LessThan => lhs.less_than(&rhs),
                    ComparisonOperator::LessThanEqual => lhs.less_than_or_equal(&rhs),
                    ComparisonOperator::GreaterThan => lhs.greater_than(&rhs),
                    ComparisonOperator::GreaterThanEqual => lhs.greater_than_or_equal(&rhs),
                };
                result.map_err(|kind| RuntimeError::new(kind, expr.span))
            }
            ExprKind::Logical { operator, lhs, rhs } => {
                let lhs = ensure_sufficient_stack(|| {
                    self.evaluate_condition(environment, frame, context, lhs)
                })?;
                let short_circuit = match operator {
                    LogicalOperator::And => (!lhs).then_some(false),
                    LogicalOperator::Or => lhs.then_some(true),
                    LogicalOperator::EagerAnd | LogicalOperator::EagerOr => None,
                };
                if let Some(result) = short_circuit {
                    return Ok(Value::Bool(result));
                }
                let rhs = ensure_sufficient_stack(|| {
                    self.evaluate_condition(environment, frame, context, rhs)
                })?;
                Ok(Value::Bool(match operator {
                    LogicalOperator::And | LogicalOperator::EagerAnd => lhs && rhs,
                    LogicalOperator::Or | LogicalOperator::EagerOr => lhs || rhs,
                }))
            }
        }
    }

    /// Evaluates `expr` and requires a Boolean.
    pub fn evaluate_condition<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        expr: &Expr,
    ) -> Result<bool, RuntimeError> {
        self.evaluate(environment, frame, context, expr)?
            .as_condition()
            .map_err(|kind| RuntimeError::new(kind, expr.span))
    }

    fn evaluate_addition<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        addition: &Addition,
    ) -> Result<Value, RuntimeError> {
        let mut accumulator =
            self.evaluate_multiplication(environment, frame, context, &addition.first)?;
        for term in addition.rest.iter() {
            let rhs = self.evaluate_multiplication(environment, frame, context, &term.operand)?;
            let result = match term.operator {
                AdditiveOperator::Add => accumulator.add(&rhs),
                AdditiveOperator::Subtract => accumulator.subtract(&rhs),
            };
            accumulator = result.map_err(|kind| RuntimeError::new(kind, term.span))?;
        }
        Ok(accumulator)
    }

    fn evaluate_multiplication<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        multiplication: &Multiplication,
    ) -> Result<Value, RuntimeError> {
        let mut accumulator =
            self.evaluate_atom(environment, frame, context, &multiplication.first)?;
        for term in multiplication.rest.iter() {
            let rhs = self.evaluate_atom(environment, frame, context, &term.operand)?;
            let result = match term.operator {
                MultiplicativeOperator::Multiply => accumulator.multiply(&rhs),
                MultiplicativeOperator::Divide => accumulator.divide(&rhs),
                MultiplicativeOperator::Remainder => accumulator.remainder(&rhs),
            };
            accumulator = result.map_err(|kind| RuntimeError::new(kind, term.span))?;
        }
        Ok(accumulator)
    }

    fn evaluate_atom<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        atom: &Atom,
    ) -> Result<Value, RuntimeError> {
        match &atom.kind {
            AtomKind::Number(value) => Ok(Value::Number(*value)),
            AtomKind::Bool(value) => Ok(Value::Bool(*value)),
            AtomKind::Variable(ident) => environment.access(frame, &ident.name).ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::UndefinedVariable(ident.name.clone()),
                    ident.span,
                )
            }),
            AtomKind::Group(inner) => {
                ensure_sufficient_stack(|| self.evaluate(environment, frame, context, inner))
            }
            AtomKind::Call(call) => self.evaluate_call(environment, frame, context, call),
            AtomKind::Negate(operand) => {
                ensure_sufficient_stack(|| self.evaluate_atom(environment, frame, context, operand))?
                    .numeric_negate()
                    .map_err(|kind| RuntimeError::new(kind, atom.span))
            }
        }
    }
}
