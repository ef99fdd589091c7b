use super::cursor::SourceChar;
use super::token::{Span, Token, TokenKind, KEYWORD_HASHMAP};
use super::{LexicalError, LexicalErrorKind};

pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: SourceChar,
    },
}

impl LexerStateTransition {
    fn emit(token_or_error: Result<Token, LexicalError>) -> Self {
        Self::ChangeStateAndEmit {
            new_state: LexerState::Normal,
            token_or_error,
        }
    }

    /// Emits and hands the character that terminated the token back to the lexer.
    fn emit_before(token_or_error: Result<Token, LexicalError>, next_char: Option<SourceChar>) -> Self {
        match next_char {
            Some(put_back) => Self::ChangeStateAndEmitAndPutBack {
                new_state: LexerState::Normal,
                token_or_error,
                put_back,
            },
            None => Self::emit(token_or_error),
        }
    }
}

#[derive(Debug, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Ident {
        start: usize,
    },
    Number {
        start: usize,
    },
    Operator {
        first: SourceChar,
    },
    Comment,
}

impl LexerState {
    pub fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match self {
            LexerState::Normal => Self::execute_normal(source, next_char),
            LexerState::Ident { start } => Self::execute_ident(source, *start, next_char),
            LexerState::Number { start } => Self::execute_number(source, *start, next_char),
            LexerState::Operator { first } => Self::execute_operator(*first, next_char),
            LexerState::Comment => match next_char {
                Some(SourceChar { value: '\n', .. }) | None => {
                    LexerStateTransition::ChangeState(LexerState::Normal)
                }
                Some(_) => LexerStateTransition::Stay,
            },
        }
    }

    fn execute_normal(source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::emit(Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(source.len(), 0),
            }));
        };

        let just = |kind: TokenKind| {
            LexerStateTransition::emit(Ok(Token {
                kind,
                span: Span::new(c.offset, 1),
            }))
        };

        match c.value {
            // Single character tokens
            '(' => just(TokenKind::LeftParenthesis),
            ')' => just(TokenKind::RightParenthesis),
            ',' => just(TokenKind::Comma),
            ';' => just(TokenKind::Semicolon),
            '-' => just(TokenKind::Minus),
            '+' => just(TokenKind::Plus),
            '*' => just(TokenKind::Star),
            '%' => just(TokenKind::Percent),
            // Possibly two character tokens
            '/' | ':' | '=' | '!' | '<' | '>' | '&' | '|' => {
                LexerStateTransition::ChangeState(LexerState::Operator { first: c })
            }
            // Identifier/keyword token
            'a'..='z' | 'A'..='Z' | '_' => {
                LexerStateTransition::ChangeState(LexerState::Ident { start: c.offset })
            }
            '0'..='9' => LexerStateTransition::ChangeState(LexerState::Number { start: c.offset }),
            value if value.is_whitespace() => LexerStateTransition::Stay,
            value => LexerStateTransition::emit(Err(LexicalError {
                kind: LexicalErrorKind::Unrecognized(value),
                span: Span::between(c.offset, c.next_offset()),
            })),
        }
    }

    fn execute_ident(source: &str, start: usize, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_ascii_alphanumeric() || c.value == '_' => {
                LexerStateTransition::Stay
            }
            _ => {
                let end = next_char.map_or(source.len(), |c| c.offset);
                let span = Span::between(start, end);
                let kind = KEYWORD_HASHMAP
                    .get(&source[span.range()])
                    .copied()
                    .unwrap_or(TokenKind::Ident);
                LexerStateTransition::emit_before(Ok(Token { kind, span }), next_char)
            }
        }
    }

    fn execute_number(source: &str, start: usize, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_ascii_digit() => LexerStateTransition::Stay,
            _ => {
                let end = next_char.map_or(source.len(), |c| c.offset);
                LexerStateTransition::emit_before(
                    Ok(Token {
                        kind: TokenKind::NumericLiteral,
                        span: Span::between(start, end),
                    }),
                    next_char,
                )
            }
        }
    }

    fn execute_operator(first: SourceChar, next_char: Option<SourceChar>) -> LexerStateTransition {
        let pair = |kind: TokenKind| {
            LexerStateTransition::emit(Ok(Token {
                kind,
                span: Span::new(first.offset, 2),
            }))
        };

        match (first.value, next_char.map(|c| c.value)) {
            ('/', Some('/')) => LexerStateTransition::ChangeState(LexerState::Comment),
            (':', Some('=')) => pair(TokenKind::ColonEqual),
            ('=', Some('=')) => pair(TokenKind::EqualEqual),
            ('!', Some('=')) => pair(TokenKind::BangEqual),
            ('!', Some('!')) => pair(TokenKind::BangBang),
            ('<', Some('=')) => pair(TokenKind::LessThanEqual),
            ('>', Some('=')) => pair(TokenKind::GreaterThanEqual),
            ('&', Some('&')) => pair(TokenKind::AmpersandAmpersand),
            ('|', Some('|')) => pair(TokenKind::PipePipe),
            (value, _) => {
                let span = Span::new(first.offset, 1);
                let token_or_error = match value {
                    '/' => Ok(Token {
                        kind: TokenKind::Slash,
                        span,
                    }),
                    '<' => Ok(Token {
                        kind: TokenKind::LessThan,
                        span,
                    }),
                    '>' => Ok(Token {
                        kind: TokenKind::GreaterThan,
                        span,
                    }),
                    '&' => Ok(Token {
                        kind: TokenKind::Ampersand,
                        span,
                    }),
                    '|' => Ok(Token {
                        kind: TokenKind::Pipe,
                        span,
                    }),
                    _ => Err(LexicalError {
                        kind: LexicalErrorKind::Unrecognized(value),
                        span,
                    }),
                };
                LexerStateTransition::emit_before(token_or_error, next_char)
            }
        }
    }
}
