use super::{
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::{Lexer, LexicalError, LexicalErrorKind};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexicalError) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

fn describe(text: &str, token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => format!("{}", token.kind),
        _ => {
            let lexeme = text.get(token.span.range()).unwrap_or_default();
            format!("{} {lexeme}", token.kind)
        }
    }
}

pub struct BasicFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        describe(self.text, token)
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("[line {line}] Error: Unexpected character: {c}")
            }
        }
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}

/// Prefixes every token with its line and column.
pub struct LineFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<LineFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> LineFormatter<'src> {
        LineFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for LineFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let position = self.line_breaks.get_position_from_span(token.span);
        format!("({position}) {}", describe(self.text, token))
    }

    fn format_lexical_error(&self, error: &LexicalError) -> String {
        let position = self.line_breaks.get_position_from_span(error.span);
        match error.kind {
            LexicalErrorKind::Unrecognized(c) => {
                format!("({position}) ERROR UNEXPECTED_CHAR {c}")
            }
        }
    }
}
