use super::expression::Expr;
use crate::lexer::Span;
use crate::stack::ensure_sufficient_stack;
use crate::string::Ident;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn get_statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }
}

/// Statements sharing one scope body.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl CodeBlock {
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }
}

// Blocks nest once per compound statement, so their contents are freed on a grown stack.
impl Drop for CodeBlock {
    fn drop(&mut self) {
        let statements = std::mem::take(&mut self.statements);
        ensure_sufficient_stack(move || drop(statements));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    While(WhileLoop),
    For(ForLoop),
    Repeat(RepeatLoop),
    Cond(Cond),
    FunctionDef(Arc<FunctionDef>),
    Call(FunctionCall),
    Expression(Expr),
    Return(ReturnStatement),
    Break(Span),
    Continue(Span),
    Skip(Span),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assignment(statement) => statement.span,
            Statement::While(statement) => statement.span,
            Statement::For(statement) => statement.span,
            Statement::Repeat(statement) => statement.span,
            Statement::Cond(statement) => statement.span,
            Statement::FunctionDef(statement) => statement.span,
            Statement::Call(call) => call.span,
            Statement::Expression(expr) => expr.span,
            Statement::Return(statement) => statement.span,
            Statement::Break(span) | Statement::Continue(span) | Statement::Skip(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Expr,
    pub body: CodeBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub initializer: CodeBlock,
    pub condition: Expr,
    pub increment: CodeBlock,
    pub body: CodeBlock,
    pub span: Span,
}

/// Runs the body, then stops once the condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatLoop {
    pub body: CodeBlock,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub condition: Expr,
    pub success: CodeBlock,
    pub alternatives: Vec<ElseIf>,
    pub failure: Option<CodeBlock>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub body: CodeBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub parameters: Vec<Ident>,
    pub body: CodeBlock,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: Ident,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expr>,
    pub span: Span,
}
