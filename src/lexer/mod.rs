mod cursor;
mod error;
pub mod formatter;
mod state;
mod token;

use cursor::SourceChar;
pub use error::{LexicalError, LexicalErrorKind};
use state::{LexerState, LexerStateTransition};
use std::{ops::Range, rc::Rc, str::CharIndices};
pub use token::{Span, Token, TokenKind};

/// A 1-based line and column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = offset + 1;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..text.len() + 1);
            }
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    fn find_line(&self, offset: usize) -> Option<usize> {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        self.find_line(offset)
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_position(&self, offset: usize) -> SourcePosition {
        match self.find_line(offset) {
            Some(index) => SourcePosition {
                line: (index + 1) as u32,
                column: (offset - self.line_breaks[index].start + 1) as u32,
            },
            None => SourcePosition {
                line: self.get_max_line(),
                column: 1,
            },
        }
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start as usize)
    }

    pub fn get_position_from_span(&self, span: Span) -> SourcePosition {
        self.get_position(span.start as usize)
    }
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: CharIndices<'src>,
    state: LexerState,
    lookahead: Option<SourceChar>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            state: LexerState::default(),
            lookahead: None,
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_source(&self) -> &'src str {
        self.source
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }

    pub fn get_lexeme(&self, span: &Span) -> Option<&'src str> {
        self.source.get(span.range())
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        self.lookahead.take().or_else(|| {
            self.chars
                .next()
                .map(|(offset, value)| SourceChar { value, offset })
        })
    }

    /// Produces the next token, or the error for an unrecognised character.
    ///
    /// Lexing can resume after an error. Once the source is exhausted every call yields `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let next_char = self.next_char();
            let transition = self.state.execute(self.source, next_char);

            match transition {
                LexerStateTransition::Stay => {}
                LexerStateTransition::ChangeState(new_state) => {
                    self.state = new_state;
                }
                LexerStateTransition::ChangeStateAndEmit {
                    new_state,
                    token_or_error,
                } => {
                    self.state = new_state;
                    return token_or_error;
                }
                LexerStateTransition::ChangeStateAndEmitAndPutBack {
                    new_state,
                    token_or_error,
                    put_back,
                } => {
                    self.state = new_state;
                    self.lookahead = Some(put_back);
                    return token_or_error;
                }
            }
        }
    }
}
