use super::{
    expression::{Addition, Atom, AtomKind, Expr, ExprKind, Multiplication},
    statement::{CodeBlock, FunctionCall, Program, Statement},
    ParserError, ParserErrorKind,
};
use crate::lexer::{LexicalErrorKind, LineBreaks};
use crate::stack::ensure_sufficient_stack;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

pub trait ProgramFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugFormatter;

impl ProgramFormatter for DebugFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Prints the tree as nested S-expressions, one top-level statement per line.
pub struct SExpressionFormatter {
    line_breaks: LineBreaks,
}

impl SExpressionFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }

    pub fn format_statement(statement: &Statement) -> String {
        match statement {
            Statement::Assignment(assignment) => format!(
                "(:= {} {})",
                assignment.target,
                Self::format_expression(&assignment.value)
            ),
            Statement::While(while_loop) => format!(
                "(while {} {})",
                Self::format_expression(&while_loop.condition),
                Self::format_block(&while_loop.body)
            ),
            Statement::For(for_loop) => format!(
                "(for {} {} {} {})",
                Self::format_block(&for_loop.initializer),
                Self::format_expression(&for_loop.condition),
                Self::format_block(&for_loop.increment),
                Self::format_block(&for_loop.body)
            ),
            Statement::Repeat(repeat_loop) => format!(
                "(repeat {} {})",
                Self::format_block(&repeat_loop.body),
                Self::format_expression(&repeat_loop.condition)
            ),
            Statement::Cond(cond) => {
                let mut output = format!(
                    "(if {} {}",
                    Self::format_expression(&cond.condition),
                    Self::format_block(&cond.success)
                );
                for branch in cond.alternatives.iter() {
                    output.push_str(&format!(
                        " (elif {} {})",
                        Self::format_expression(&branch.condition),
                        Self::format_block(&branch.body)
                    ));
                }
                if let Some(failure) = &cond.failure {
                    output.push_str(&format!(" (else {})", Self::format_block(failure)));
                }
                output.push(')');
                output
            }
            Statement::FunctionDef(definition) => {
                let parameters: Vec<_> = definition
                    .parameters
                    .iter()
                    .map(|parameter| parameter.name.as_str())
                    .collect();
                format!(
                    "(fun {} ({}) {})",
                    definition.name,
                    parameters.join(" "),
                    Self::format_block(&definition.body)
                )
            }
            Statement::Call(call) => Self::format_call(call),
            Statement::Expression(expr) => Self::format_expression(expr),
            Statement::Return(statement) => match &statement.value {
                Some(value) => format!("(return {})", Self::format_expression(value)),
                None => "(return)".into(),
            },
            Statement::Break(_) => "break".into(),
            Statement::Continue(_) => "continue".into(),
            Statement::Skip(_) => "skip".into(),
        }
    }

    fn format_block(block: &CodeBlock) -> String {
        let mut output = String::from("(block");
        for statement in block.statements.iter() {
            output.push(' ');
            output.push_str(&ensure_sufficient_stack(|| Self::format_statement(statement)));
        }
        output.push(')');
        output
    }

    pub fn format_expression(expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Addition(addition) => Self::format_addition(addition),
            ExprKind::Comparison { operator, lhs, rhs } => format!(
                "({operator} {} {})",
                Self::format_addition(lhs),
                Self::format_addition(rhs)
            ),
            ExprKind::Logical { operator, lhs, rhs } => format!(
                "({operator} {} {})",
                ensure_sufficient_stack(|| Self::format_expression(lhs)),
                ensure_sufficient_stack(|| Self::format_expression(rhs))
            ),
        }
    }

    fn format_addition(addition: &Addition) -> String {
        addition
            .rest
            .iter()
            .fold(Self::format_multiplication(&addition.first), |lhs, term| {
                format!(
                    "({} {lhs} {})",
                    term.operator,
                    Self::format_multiplication(&term.operand)
                )
            })
    }

    fn format_multiplication(multiplication: &Multiplication) -> String {
        multiplication
            .rest
            .iter()
            .fold(Self::format_atom(&multiplication.first), |lhs, term| {
                format!("({} {lhs} {})", term.operator, Self::format_atom(&term.operand))
            })
    }

    fn format_atom(atom: &Atom) -> String {
        match &atom.kind {
            AtomKind::Number(value) => format!("{value}"),
            AtomKind::Bool(value) => format!("{value}"),
            AtomKind::Variable(ident) => format!("{ident}"),
            AtomKind::Group(inner) => format!(
                "(group {})",
                ensure_sufficient_stack(|| Self::format_expression(inner))
            ),
            AtomKind::Call(call) => ensure_sufficient_stack(|| Self::format_call(call)),
            AtomKind::Negate(operand) => format!(
                "(- {})",
                ensure_sufficient_stack(|| Self::format_atom(operand))
            ),
        }
    }

    fn format_call(call: &FunctionCall) -> String {
        let mut output = format!("(call {}", call.name);
        for argument in call.arguments.iter() {
            output.push(' ');
            output.push_str(&Self::format_expression(argument));
        }
        output.push(')');
        output
    }
}

impl ProgramFormatter for SExpressionFormatter {
    fn format(&self, program: &Program) -> String {
        let lines: Vec<String> = program.iter().map(Self::format_statement).collect();
        lines.join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match &error.kind {
            ParserErrorKind::LexicalError(lexical) => match lexical.kind {
                LexicalErrorKind::Unrecognized(c) => {
                    format!("[line {line}] Error: Unexpected character: {c}")
                }
            },
            kind => format!("[line {line}] Error: {kind}"),
        }
    }
}

pub struct PrettyFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ProgramFormatter for PrettyFormatter<'src> {
    fn format(&self, program: &Program) -> String {
        SExpressionFormatter::new(self.text).format(program)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span;
        let (message, label) = match &error.kind {
            ParserErrorKind::UnexpectedToken { actual, expected } => (
                "Expected a different token",
                format!("Expected {expected} but got {actual}"),
            ),
            ParserErrorKind::NonExpression(kind) => (
                "Expected an expression",
                format!("Not an expression token {kind}"),
            ),
            ParserErrorKind::InvalidStatement(kind) => (
                "Expected a statement",
                format!("A statement can not start with {kind}"),
            ),
            ParserErrorKind::InvalidNumber(lexeme) => (
                "Integer literal out of range",
                format!("{lexeme} does not fit in a signed 64-bit integer"),
            ),
            ParserErrorKind::LexicalError(lexical) => match lexical.kind {
                LexicalErrorKind::Unrecognized(c) => {
                    ("Unrecognized character", format!("Unexpected character {c:?}"))
                }
            },
        };

        let mut output = Vec::new();
        let written = Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(message)
            .with_label(
                Label::new((path, span.range()))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output);
        match written {
            Ok(()) => String::from_utf8_lossy(&output).into_owned(),
            Err(_) => format!("{error}"),
        }
    }
}
