pub mod error;
pub mod expression;
pub mod formatter;
pub mod statement;

pub use error::{ParserError, ParserErrorKind};
use expression::{
    AdditionTerm, AdditiveOperator, Addition, Atom, AtomKind, ComparisonOperator, Expr,
    ExprKind, LogicalOperator, Multiplication, MultiplicationTerm, MultiplicativeOperator,
};
use statement::{
    Assignment, CodeBlock, Cond, ElseIf, ForLoop, FunctionCall, FunctionDef, RepeatLoop,
    ReturnStatement, WhileLoop,
};
pub use statement::{Program, Statement};

use crate::lexer::{Lexer, LineBreaks, Span, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use crate::string::Ident;
use std::collections::VecDeque;
use std::sync::Arc;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Token>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: VecDeque::new(),
        }
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.lexer.get_line_breaks()
    }

    fn fill(&mut self, count: usize) -> Result<(), ParserError> {
        while self.lookahead.len() < count {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    fn peek_nth(&mut self, n: usize) -> Result<Token, ParserError> {
        self.fill(n + 1)?;
        Ok(self.lookahead[n])
    }

    fn peek(&mut self) -> Result<Token, ParserError> {
        self.peek_nth(0)
    }

    fn next_token(&mut self) -> Result<Token, ParserError> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.lexer.next_token()?),
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        let next_token = self.next_token()?;
        if next_token.kind != expected {
            Err(ParserError {
                span: next_token.span,
                kind: ParserErrorKind::UnexpectedToken {
                    actual: next_token.kind,
                    expected,
                },
            })
        } else {
            Ok(next_token)
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Result<Option<Token>, ParserError> {
        let next_token = self.peek()?;
        if next_token.kind != next {
            Ok(None)
        } else {
            self.lookahead.pop_front();
            Ok(Some(next_token))
        }
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        self.lexer.get_lexeme(&token.span).unwrap_or_default()
    }

    fn expect_ident(&mut self) -> Result<Ident, ParserError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident::new(self.lexeme(&token), token.span))
    }
}

// Statements
impl<'src> Parser<'src> {
    /// Parses a whole program. Stops at the first error.
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut block = self.parse_code_block()?;
        self.expect(TokenKind::Eof)?;
        Ok(Program::new(std::mem::take(&mut block.statements)))
    }

    fn parse_code_block(&mut self) -> Result<CodeBlock, ParserError> {
        let start = self.peek()?;
        let mut span = Span::new(start.span.start as usize, 0);
        let mut statements = Vec::new();
        if !start.kind.ends_code_block() {
            loop {
                let statement = self.parse_statement()?;
                span = span.merge(&statement.span());
                statements.push(statement);
                // A trailing semicolon before the closing keyword is allowed.
                if self.eat_if(TokenKind::Semicolon)?.is_none()
                    || self.peek()?.kind.ends_code_block()
                {
                    break;
                }
            }
        }
        Ok(CodeBlock::new(statements, span))
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        ensure_sufficient_stack(|| self.parse_statement_kind())
    }

    fn parse_statement_kind(&mut self) -> Result<Statement, ParserError> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::KeywordSkip => {
                self.next_token()?;
                Ok(Statement::Skip(token.span))
            }
            TokenKind::KeywordBreak => {
                self.next_token()?;
                Ok(Statement::Break(token.span))
            }
            TokenKind::KeywordContinue => {
                self.next_token()?;
                Ok(Statement::Continue(token.span))
            }
            TokenKind::KeywordReturn => self.parse_return_statement(),
            TokenKind::KeywordWhile => self.parse_while_loop(),
            TokenKind::KeywordFor => self.parse_for_loop(),
            TokenKind::KeywordRepeat => self.parse_repeat_loop(),
            TokenKind::KeywordIf => self.parse_cond(),
            TokenKind::KeywordFun => self.parse_function_def(),
            TokenKind::Ident if self.peek_nth(1)?.kind == TokenKind::ColonEqual => {
                self.parse_assignment()
            }
            kind if Self::starts_expression(kind) => {
                let expr = self.parse_expression()?;
                Ok(match expr.into_call() {
                    Ok(call) => Statement::Call(call),
                    Err(expr) => Statement::Expression(expr),
                })
            }
            kind => Err(ParserError {
                kind: ParserErrorKind::InvalidStatement(kind),
                span: token.span,
            }),
        }
    }

    fn starts_expression(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::NumericLiteral
                | TokenKind::Ident
                | TokenKind::KeywordTrue
                | TokenKind::KeywordFalse
                | TokenKind::LeftParenthesis
                | TokenKind::Minus
        )
    }

    fn parse_assignment(&mut self) -> Result<Statement, ParserError> {
        let target = self.expect_ident()?;
        self.expect(TokenKind::ColonEqual)?;
        let value = self.parse_expression()?;
        Ok(Statement::Assignment(Assignment {
            span: target.span.merge(&value.span),
            target,
            value,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordReturn)?;
        let next = self.peek()?;
        let value = if next.kind == TokenKind::Semicolon || next.kind.ends_code_block() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = value
            .as_ref()
            .map_or(keyword.span, |value| keyword.span.merge(&value.span));
        Ok(Statement::Return(ReturnStatement { value, span }))
    }

    fn parse_while_loop(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordWhile)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::KeywordDo)?;
        let body = self.parse_code_block()?;
        let end = self.expect(TokenKind::KeywordOd)?;
        Ok(Statement::While(WhileLoop {
            condition,
            body,
            span: keyword.span.merge(&end.span),
        }))
    }

    fn parse_for_loop(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordFor)?;
        let initializer = self.parse_code_block()?;
        self.expect(TokenKind::Comma)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Comma)?;
        let increment = self.parse_code_block()?;
        self.expect(TokenKind::KeywordDo)?;
        let body = self.parse_code_block()?;
        let end = self.expect(TokenKind::KeywordOd)?;
        Ok(Statement::For(ForLoop {
            initializer,
            condition,
            increment,
            body,
            span: keyword.span.merge(&end.span),
        }))
    }

    fn parse_repeat_loop(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordRepeat)?;
        let body = self.parse_code_block()?;
        self.expect(TokenKind::KeywordUntil)?;
        let condition = self.parse_expression()?;
        Ok(Statement::Repeat(RepeatLoop {
            span: keyword.span.merge(&condition.span),
            body,
            condition,
        }))
    }

    fn parse_cond(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordIf)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::KeywordThen)?;
        let success = self.parse_code_block()?;

        let mut alternatives = Vec::new();
        while let Some(elif) = self.eat_if(TokenKind::KeywordElif)? {
            let condition = self.parse_expression()?;
            self.expect(TokenKind::KeywordThen)?;
            let body = self.parse_code_block()?;
            alternatives.push(ElseIf {
                span: elif.span.merge(&body.span),
                condition,
                body,
            });
        }

        let failure = match self.eat_if(TokenKind::KeywordElse)? {
            Some(_) => Some(self.parse_code_block()?),
            None => None,
        };
        let end = self.expect(TokenKind::KeywordFi)?;
        Ok(Statement::Cond(Cond {
            condition,
            success,
            alternatives,
            failure,
            span: keyword.span.merge(&end.span),
        }))
    }

    fn parse_function_def(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.expect(TokenKind::KeywordFun)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LeftParenthesis)?;
        let mut parameters = Vec::new();
        if self.eat_if(TokenKind::RightParenthesis)?.is_none() {
            loop {
                parameters.push(self.expect_ident()?);
                if self.eat_if(TokenKind::Comma)?.is_none() {
                    self.expect(TokenKind::RightParenthesis)?;
                    break;
                }
            }
        }
        self.expect(TokenKind::KeywordBegin)?;
        let body = self.parse_code_block()?;
        let end = self.expect(TokenKind::KeywordEnd)?;
        Ok(Statement::FunctionDef(Arc::new(FunctionDef {
            name,
            parameters,
            body,
            span: keyword.span.merge(&end.span),
        })))
    }
}

// Expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self) -> Result<Expr, ParserError> {
        ensure_sufficient_stack(|| self.parse_disjunction())
    }

    fn logical(operator: LogicalOperator, lhs: Expr, rhs: Expr) -> Expr {
        Expr {
            span: lhs.span.merge(&rhs.span),
            kind: ExprKind::Logical {
                operator,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    fn parse_disjunction(&mut self) -> Result<Expr, ParserError> {
        let mut lhs = self.parse_conjunction()?;
        loop {
            let operator = match self.peek()?.kind {
                TokenKind::PipePipe | TokenKind::BangBang => LogicalOperator::Or,
                TokenKind::Pipe => LogicalOperator::EagerOr,
                _ => break,
            };
            self.next_token()?;
            let rhs = self.parse_conjunction()?;
            lhs = Self::logical(operator, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_conjunction(&mut self) -> Result<Expr, ParserError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let operator = match self.peek()?.kind {
                TokenKind::AmpersandAmpersand => LogicalOperator::And,
                TokenKind::Ampersand => LogicalOperator::EagerAnd,
                _ => break,
            };
            self.next_token()?;
            let rhs = self.parse_comparison()?;
            lhs = Self::logical(operator, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParserError> {
        let lhs = self.parse_addition()?;
        let operator = match self.peek()?.kind {
            TokenKind::EqualEqual => ComparisonOperator::Equal,
            TokenKind::BangEqual => ComparisonOperator::NotEqual,
            TokenKind::LessThan => ComparisonOperator::LessThan,
            TokenKind::LessThanEqual => ComparisonOperator::LessThanEqual,
            TokenKind::GreaterThan => ComparisonOperator::GreaterThan,
            TokenKind::GreaterThanEqual => ComparisonOperator::GreaterThanEqual,
            _ => return Ok(lhs.into()),
        };
        self.next_token()?;
        let rhs = self.parse_addition()?;
        Ok(Expr {
            span: lhs.span.merge(&rhs.span),
            kind: ExprKind::Comparison { operator, lhs, rhs },
        })
    }

    fn parse_addition(&mut self) -> Result<Addition, ParserError> {
        let first = self.parse_multiplication()?;
        let mut span = first.span;
        let mut rest = Vec::new();
        loop {
            let token = self.peek()?;
            let operator = match token.kind {
                TokenKind::Plus => AdditiveOperator::Add,
                TokenKind::Minus => AdditiveOperator::Subtract,
                _ => break,
            };
            self.next_token()?;
            let operand = self.parse_multiplication()?;
            let term_span = token.span.merge(&operand.span);
            span = span.merge(&term_span);
            rest.push(AdditionTerm {
                operator,
                operand,
                span: term_span,
            });
        }
        Ok(Addition { first, rest, span })
    }

    fn parse_multiplication(&mut self) -> Result<Multiplication, ParserError> {
        let first = self.parse_atom()?;
        let mut span = first.span;
        let mut rest = Vec::new();
        loop {
            let token = self.peek()?;
            let operator = match token.kind {
                TokenKind::Star => MultiplicativeOperator::Multiply,
                TokenKind::Slash => MultiplicativeOperator::Divide,
                TokenKind::Percent => MultiplicativeOperator::Remainder,
                _ => break,
            };
            self.next_token()?;
            let operand = self.parse_atom()?;
            let term_span = token.span.merge(&operand.span);
            span = span.merge(&term_span);
            rest.push(MultiplicationTerm {
                operator,
                operand,
                span: term_span,
            });
        }
        Ok(Multiplication { first, rest, span })
    }

    fn parse_atom(&mut self) -> Result<Atom, ParserError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::NumericLiteral => {
                let lexeme = self.lexeme(&token);
                let value = lexeme.parse::<i64>().map_err(|_| ParserError {
                    kind: ParserErrorKind::InvalidNumber(lexeme.into()),
                    span: token.span,
                })?;
                Ok(Atom::number(value, token.span))
            }
            TokenKind::KeywordTrue => Ok(Atom {
                kind: AtomKind::Bool(true),
                span: token.span,
            }),
            TokenKind::KeywordFalse => Ok(Atom {
                kind: AtomKind::Bool(false),
                span: token.span,
            }),
            TokenKind::Ident => {
                let ident = Ident::new(self.lexeme(&token), token.span);
                if self.peek()?.kind == TokenKind::LeftParenthesis {
                    let call = self.parse_call(ident)?;
                    Ok(Atom {
                        span: call.span,
                        kind: AtomKind::Call(call),
                    })
                } else {
                    Ok(Atom::variable(ident))
                }
            }
            TokenKind::LeftParenthesis => {
                let inner = self.parse_expression()?;
                let end = self.expect(TokenKind::RightParenthesis)?;
                Ok(Atom {
                    kind: AtomKind::Group(Box::new(inner)),
                    span: token.span.merge(&end.span),
                })
            }
            // A minus sign directly before a literal is folded into it, so that the
            // smallest integer can be written.
            TokenKind::Minus if self.peek()?.kind == TokenKind::NumericLiteral => {
                let literal = self.next_token()?;
                let lexeme = format!("-{}", self.lexeme(&literal));
                let span = token.span.merge(&literal.span);
                let value = lexeme.parse::<i64>().map_err(|_| ParserError {
                    kind: ParserErrorKind::InvalidNumber(lexeme.as_str().into()),
                    span,
                })?;
                Ok(Atom::number(value, span))
            }
            TokenKind::Minus => {
                let operand = ensure_sufficient_stack(|| self.parse_atom())?;
                Ok(Atom {
                    span: token.span.merge(&operand.span),
                    kind: AtomKind::Negate(Box::new(operand)),
                })
            }
            kind => Err(ParserError {
                kind: ParserErrorKind::NonExpression(kind),
                span: token.span,
            }),
        }
    }

    fn parse_call(&mut self, name: Ident) -> Result<FunctionCall, ParserError> {
        self.expect(TokenKind::LeftParenthesis)?;
        let mut arguments = Vec::new();
        let end = match self.eat_if(TokenKind::RightParenthesis)? {
            Some(end) => end,
            None => loop {
                arguments.push(self.parse_expression()?);
                if self.eat_if(TokenKind::Comma)?.is_none() {
                    break self.expect(TokenKind::RightParenthesis)?;
                }
            },
        };
        Ok(FunctionCall {
            span: name.span.merge(&end.span),
            name,
            arguments,
        })
    }
}
