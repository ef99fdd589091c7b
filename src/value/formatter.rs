use super::error::{ControlSignal, RuntimeError, RuntimeErrorKind, TypeMismatch};
use super::Value;
use crate::lexer::LineBreaks;
use ariadne::{Color, ColorGenerator, Fmt, Label, Report, ReportKind, Source};
use std::path::Path;

pub trait ValueFormatter {
    fn format(&self, value: &Value) -> String;
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value:?}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

pub struct BasicFormatter {
    line_breaks: LineBreaks,
}

impl BasicFormatter {
    pub fn new(text: &str) -> Self {
        let line_breaks = LineBreaks::new(text);
        Self { line_breaks }
    }

    fn format_verbose(value: &Value) -> String {
        match value {
            Value::Number(v) => format!("Number({v})"),
            Value::Bool(v) => format!("Bool({v})"),
            Value::None => "None".into(),
            Value::Function(fun) => format!("Function({})", fun.name()),
            Value::NativeFunction(fun) => format!("NativeFunction({})", fun.get_name()),
        }
    }
}

impl ValueFormatter for BasicFormatter {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let position = error.position(&self.line_breaks);
        let message = match &error.kind {
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonNumeric(v)) => {
                format!("Non-Number {{Unary}}: {}", Self::format_verbose(v))
            }
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonNumerics(lhs, rhs)) => format!(
                "Non-Numbers {{Binary}}: [{}, {}]",
                Self::format_verbose(lhs),
                Self::format_verbose(rhs)
            ),
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonBoolean(v)) => {
                format!("Non-Boolean: {}", Self::format_verbose(v))
            }
            RuntimeErrorKind::TypeMismatch(TypeMismatch::Incomparable(lhs, rhs)) => format!(
                "Incomparable: [{}, {}]",
                Self::format_verbose(lhs),
                Self::format_verbose(rhs)
            ),
            kind => format!("{kind}"),
        };
        format!("[line {position}] Error: {message}")
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

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format(&self, value: &Value) -> String {
        format!("{value}")
    }

    fn format_error(&self, error: &RuntimeError) -> String {
        let path = self.path.to_string_lossy();
        let path: &str = &path;
        let span = error.span;
        let (message, label) = match &error.kind {
            RuntimeErrorKind::UndefinedVariable(name) => (
                "Attempted to access a variable that has not been defined",
                format!("{} is not bound in any enclosing scope.", name.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::UndefinedFunction(name) => (
                "Attempted to call something that is not a function",
                format!("{} is not bound to a function.", name.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonNumeric(v)) => (
                "Expected a single numeric operand",
                format!(
                    "Type is {} instead of number",
                    v.kind_name().fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonNumerics(lhs, rhs)) => (
                "Expected both operands to be numeric",
                format!(
                    "One or both of {} and {} is not numeric",
                    BasicFormatter::format_verbose(lhs).fg(Color::BrightRed),
                    BasicFormatter::format_verbose(rhs).fg(Color::BrightRed),
                ),
            ),
            RuntimeErrorKind::TypeMismatch(TypeMismatch::NonBoolean(v)) => (
                "Expected a boolean",
                format!(
                    "Type is {} instead of boolean",
                    v.kind_name().fg(Color::BrightRed)
                ),
            ),
            RuntimeErrorKind::TypeMismatch(TypeMismatch::Incomparable(lhs, rhs)) => {
                let mut colors = ColorGenerator::new();
                (
                    "Expected both operands to have the same type",
                    format!(
                        "{} and {} can not be compared.",
                        BasicFormatter::format_verbose(lhs).fg(colors.next()),
                        BasicFormatter::format_verbose(rhs).fg(colors.next()),
                    ),
                )
            }
            RuntimeErrorKind::ArityMismatch {
                name,
                expected,
                actual,
            } => (
                "Attempted to call a function with the wrong number of arguments",
                format!(
                    "`{name}` has {} parameters but got {} arguments instead.",
                    expected.fg(Color::BrightCyan),
                    actual.fg(Color::BrightRed),
                ),
            ),
            RuntimeErrorKind::DivisionByZero => {
                ("Attempted to divide by zero", "The divisor is zero.".into())
            }
            RuntimeErrorKind::ControlFlowError(signal) => (
                "Control signal escaped its loop",
                match signal {
                    ControlSignal::Break => "There is no loop to break out of.".into(),
                    ControlSignal::Continue => "There is no loop to continue.".into(),
                },
            ),
            RuntimeErrorKind::StackExhausted(depth) => (
                "Exceeded the maximum call depth",
                format!("This call is nested deeper than {}.", depth.fg(Color::BrightRed)),
            ),
            RuntimeErrorKind::InvalidInput(line) => (
                "Could not read a number",
                format!("Read `{}` which is not an integer.", line.fg(Color::BrightRed)),
            ),
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
