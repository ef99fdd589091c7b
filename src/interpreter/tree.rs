use super::{InterpreterConfig, ProgramState, SystemContext};
use crate::environment::{Environment, FrameKind, FrameRef};
use crate::parser::statement::{
    Assignment, CodeBlock, Cond, ForLoop, FunctionDef, Program, RepeatLoop, ReturnStatement,
    Statement, WhileLoop,
};
use crate::stack::ensure_sufficient_stack;
use crate::value::error::RuntimeError;
use crate::value::{Function, Value};
use std::sync::Arc;

/// Outcome of one top-level statement.
enum Completion {
    Next(Value),
    Halt(Value),
}

pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: Environment,
    context: C,
    interpreter: TreeWalkStatementInterpreter,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self::with_config(context, InterpreterConfig::default())
    }

    pub fn with_config(context: C, config: InterpreterConfig) -> Self {
        Self {
            environment: Environment::new(),
            context,
            interpreter: TreeWalkStatementInterpreter::new(config),
        }
    }

    /// Runs every top-level statement in order.
    ///
    /// The result is the value of the last statement when it is an expression
    /// or a call, `None` otherwise. A top-level `return` stops the program with
    /// its value. The first error aborts the run.
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        tracing::debug!(statements = program.statements.len(), "running program");
        let mut result = Value::None;
        for statement in program.iter() {
            let completion = match self.execute_top_level(statement) {
                Ok(completion) => completion,
                Err(error) => {
                    self.environment.collect(&[]);
                    tracing::debug!(code = error.code(), %error, "program failed");
                    return Err(error);
                }
            };
            let halted = match completion {
                Completion::Next(value) => {
                    result = value;
                    false
                }
                Completion::Halt(value) => {
                    result = value;
                    true
                }
            };
            self.environment.collect(std::slice::from_ref(&result));
            if halted {
                break;
            }
        }
        tracing::debug!(%result, "program finished");
        Ok(result)
    }

    fn execute_top_level(&mut self, statement: &Statement) -> Result<Completion, RuntimeError> {
        let global = self.environment.global();
        let environment = &mut self.environment;
        let context = &mut self.context;
        match statement {
            Statement::Expression(expr) => self
                .interpreter
                .evaluate(environment, global, context, expr)
                .map(Completion::Next),
            Statement::Call(call) => self
                .interpreter
                .evaluate_call(environment, global, context, call)
                .map(Completion::Next),
            statement => {
                let state = self
                    .interpreter
                    .interpret_statement(environment, global, context, statement)?;
                Ok(match state.into_return_value()? {
                    Some(value) => Completion::Halt(value),
                    None => Completion::Next(Value::None),
                })
            }
        }
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.environment.access(self.environment.global(), name)
    }

    pub fn get_environment(&self) -> &Environment {
        &self.environment
    }

    pub fn get_context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }
}

/// What a loop does after one pass over its body.
enum LoopStep {
    Next,
    Exit,
    Propagate(ProgramState),
}

impl From<ProgramState> for LoopStep {
    fn from(value: ProgramState) -> Self {
        match value {
            ProgramState::Run | ProgramState::Continue(_) => LoopStep::Next,
            ProgramState::Break(_) => LoopStep::Exit,
            state @ ProgramState::Return(_) => LoopStep::Propagate(state),
        }
    }
}

pub struct TreeWalkStatementInterpreter {
    pub(super) config: InterpreterConfig,
    pub(super) call_depth: usize,
}

impl TreeWalkStatementInterpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            config,
            call_depth: 0,
        }
    }

    pub fn interpret_statement<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        statement: &Statement,
    ) -> Result<ProgramState, RuntimeError> {
        ensure_sufficient_stack(|| {
            self.dispatch_statement(environment, frame, context, statement)
        })
    }

    fn dispatch_statement<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        statement: &Statement,
    ) -> Result<ProgramState, RuntimeError> {
        match statement {
            Statement::Assignment(stmt) => {
                self.interpret_assignment(environment, frame, context, stmt)
            }
            Statement::While(stmt) => self.interpret_while_loop(environment, frame, context, stmt),
            Statement::For(stmt) => self.interpret_for_loop(environment, frame, context, stmt),
            Statement::Repeat(stmt) => {
                self.interpret_repeat_loop(environment, frame, context, stmt)
            }
            Statement::Cond(stmt) => self.interpret_cond(environment, frame, context, stmt),
            Statement::FunctionDef(decl) => {
                self.interpret_function_def(environment, frame, decl);
                Ok(ProgramState::Run)
            }
            Statement::Call(call) => {
                self.evaluate_call(environment, frame, context, call)?;
                Ok(ProgramState::Run)
            }
            Statement::Expression(expr) => {
                self.evaluate(environment, frame, context, expr)?;
                Ok(ProgramState::Run)
            }
            Statement::Return(stmt) => self.interpret_return(environment, frame, context, stmt),
            Statement::Break(span) => Ok(ProgramState::Break(*span)),
            Statement::Continue(span) => Ok(ProgramState::Continue(*span)),
            Statement::Skip(_) => Ok(ProgramState::Run),
        }
    }

    /// Runs the statements of `block` in `frame` until one of them signals.
    pub fn interpret_block<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        block: &CodeBlock,
    ) -> Result<ProgramState, RuntimeError> {
        for statement in block.statements.iter() {
            match self.interpret_statement(environment, frame, context, statement)? {
                ProgramState::Run => {}
                state => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_scoped_block<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        parent: FrameRef,
        context: &mut C,
        block: &CodeBlock,
    ) -> Result<ProgramState, RuntimeError> {
        let scope = environment.new_scope(parent, FrameKind::Block);
        let state = self.interpret_block(environment, scope, context, block);
        environment.release(scope);
        state
    }
}

// Statement interpreter
impl TreeWalkStatementInterpreter {
    fn interpret_assignment<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &Assignment,
    ) -> Result<ProgramState, RuntimeError> {
        let value = self.evaluate(environment, frame, context, &stmt.value)?;
        environment.assign(frame, &stmt.target.name, value);
        Ok(ProgramState::Run)
    }

    fn interpret_while_loop<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &WhileLoop,
    ) -> Result<ProgramState, RuntimeError> {
        while self.evaluate_condition(environment, frame, context, &stmt.condition)? {
            let state = self.interpret_scoped_block(environment, frame, context, &stmt.body)?;
            match LoopStep::from(state) {
                LoopStep::Next => {}
                LoopStep::Exit => break,
                LoopStep::Propagate(state) => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_for_loop<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &ForLoop,
    ) -> Result<ProgramState, RuntimeError> {
        // The loop variable lives in this frame for every iteration.
        let scope = environment.new_scope(frame, FrameKind::Block);
        let state = self.interpret_for_loop_in(environment, scope, context, stmt);
        environment.release(scope);
        state
    }

    fn interpret_for_loop_in<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        scope: FrameRef,
        context: &mut C,
        stmt: &ForLoop,
    ) -> Result<ProgramState, RuntimeError> {
        match self.interpret_block(environment, scope, context, &stmt.initializer)? {
            ProgramState::Run => {}
            state => return Ok(state),
        }
        while self.evaluate_condition(environment, scope, context, &stmt.condition)? {
            let state = self.interpret_scoped_block(environment, scope, context, &stmt.body)?;
            match LoopStep::from(state) {
                LoopStep::Next => {}
                LoopStep::Exit => break,
                LoopStep::Propagate(state) => return Ok(state),
            }
            match self.interpret_block(environment, scope, context, &stmt.increment)? {
                ProgramState::Run => {}
                state => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_repeat_loop<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &RepeatLoop,
    ) -> Result<ProgramState, RuntimeError> {
        loop {
            // The condition sees the bindings of the iteration it ends.
            let scope = environment.new_scope(frame, FrameKind::Block);
            let step = self
                .interpret_block(environment, scope, context, &stmt.body)
                .and_then(|state| match LoopStep::from(state) {
                    LoopStep::Next => self
                        .evaluate_condition(environment, scope, context, &stmt.condition)
                        .map(|finished| if finished { LoopStep::Exit } else { LoopStep::Next }),
                    step => Ok(step),
                });
            environment.release(scope);
            match step? {
                LoopStep::Next => {}
                LoopStep::Exit => break,
                LoopStep::Propagate(state) => return Ok(state),
            }
        }
        Ok(ProgramState::Run)
    }

    fn interpret_cond<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &Cond,
    ) -> Result<ProgramState, RuntimeError> {
        if self.evaluate_condition(environment, frame, context, &stmt.condition)? {
            return self.interpret_scoped_block(environment, frame, context, &stmt.success);
        }
        for branch in stmt.alternatives.iter() {
            if self.evaluate_condition(environment, frame, context, &branch.condition)? {
                return self.interpret_scoped_block(environment, frame, context, &branch.body);
            }
        }
        match &stmt.failure {
            Some(failure) => self.interpret_scoped_block(environment, frame, context, failure),
            None => Ok(ProgramState::Run),
        }
    }

    fn interpret_function_def(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        decl: &Arc<FunctionDef>,
    ) {
        let function = Arc::new(Function {
            definition: Arc::clone(decl),
            closure: frame,
        });
        environment.capture(&function);
        environment.declare(frame, &decl.name.name, Value::Function(function));
    }

    fn interpret_return<C: SystemContext>(
        &mut self,
        environment: &mut Environment,
        frame: FrameRef,
        context: &mut C,
        stmt: &ReturnStatement,
    ) -> Result<ProgramState, RuntimeError> {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(environment, frame, context, expr)?,
            None => Value::None,
        };
        Ok(ProgramState::Return(value))
    }
}
