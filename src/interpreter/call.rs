use super::{SystemContext, TreeWalkStatementInterpreter};
use crate::environment::{Environment, FrameKind, FrameRef};
use crate::lexer::Span;
use crate::parser::statement::FunctionCall;
use crate::stack::ensure_sufficient_stack;
use crate::value::error::{RuntimeError, RuntimeErrorKind};
use crate::value::{Function, Value};

// Function-call protocol
impl TreeWalkStatementInterpreter {
    /// Resolves the callee, evaluates the arguments left to right and calls it.
    pub fn evaluate_call<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        call: &FunctionCall,
    ) -> Result<Value, RuntimeError> {
        let name = &call.name;
        let callee = match environment.access(frame, &name.name) {
            Some(callee) if callee.is_callable() => callee,
            _ => {
                return Err(RuntimeError::new(
                    RuntimeErrorKind::UndefinedFunction(name.name.clone()),
                    name.span,
                ))
            }
        };

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in call.arguments.iter() {
            arguments.push(self.evaluate(environment, frame, context, argument)?);
        }

        match callee {
            Value::Function(function) => {
                self.call_function(environment, context, &function, arguments, call.span)
            }
            Value::NativeFunction(native) => {
                let expected = native.get_parameters().len();
                if arguments.len() != expected {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ArityMismatch {
                            name: name.name.clone(),
                            expected,
                            actual: arguments.len(),
                        },
                        call.span,
                    ));
                }
                native
                    .call(&arguments, context)
                    .map_err(|kind| RuntimeError::new(kind, call.span))
            }
            _ => Err(RuntimeError::new(
                RuntimeErrorKind::UndefinedFunction(name.name.clone()),
                name.span,
            )),
        }
    }

    /// Runs a user function body in a fresh frame chained to its closure.
    pub fn call_function<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        context: &mut C,
        function: &Function,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let definition = &function.definition;
        if arguments.len() != function.arity() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::ArityMismatch {
                    name: definition.name.name.clone(),
                    expected: function.arity(),
                    actual: arguments.len(),
                },
                span,
            ));
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(RuntimeError::new(
                RuntimeErrorKind::StackExhausted(self.config.max_call_depth),
                span,
            ));
        }

        let scope = environment.new_scope(function.closure, FrameKind::Call);
        for (parameter, argument) in definition.parameters.iter().zip(arguments) {
            environment.declare(scope, &parameter.name, argument);
        }

        self.call_depth += 1;
        tracing::trace!(function = function.name(), depth = self.call_depth, "call");
        let state = ensure_sufficient_stack(|| {
            self.interpret_block(environment, scope, context, &definition.body)
        });
        self.call_depth -= 1;
        environment.release(scope);

        let value = state?.into_return_value()?.unwrap_or(Value::None);
        tracing::trace!(function = function.name(), %value, "return");
        Ok(value)
    }
}
