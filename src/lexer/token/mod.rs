mod span;

pub use span::Span;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("begin", TokenKind::KeywordBegin);
    map.insert("break", TokenKind::KeywordBreak);
    map.insert("continue", TokenKind::KeywordContinue);
    map.insert("do", TokenKind::KeywordDo);
    map.insert("elif", TokenKind::KeywordElif);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("end", TokenKind::KeywordEnd);
    map.insert("false", TokenKind::KeywordFalse);
    map.insert("fi", TokenKind::KeywordFi);
    map.insert("for", TokenKind::KeywordFor);
    map.insert("fun", TokenKind::KeywordFun);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("od", TokenKind::KeywordOd);
    map.insert("repeat", TokenKind::KeywordRepeat);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("skip", TokenKind::KeywordSkip);
    map.insert("then", TokenKind::KeywordThen);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("until", TokenKind::KeywordUntil);
    map.insert("while", TokenKind::KeywordWhile);
    map
});

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Separators
    Comma,
    Semicolon,
    // Arithmetic
    Minus,
    Plus,
    Star,
    Slash,
    Percent,
    // Operators
    ColonEqual,
    BangEqual,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Ampersand,
    AmpersandAmpersand,
    Pipe,
    PipePipe,
    BangBang,

    // Literals
    NumericLiteral,
    Ident,

    // Keywords
    KeywordBegin,
    KeywordBreak,
    KeywordContinue,
    KeywordDo,
    KeywordElif,
    KeywordElse,
    KeywordEnd,
    KeywordFalse,
    KeywordFi,
    KeywordFor,
    KeywordFun,
    KeywordIf,
    KeywordOd,
    KeywordRepeat,
    KeywordReturn,
    KeywordSkip,
    KeywordThen,
    KeywordTrue,
    KeywordUntil,
    KeywordWhile,

    // End of file.
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "LEFT_PAREN"),
            TokenKind::RightParenthesis => write!(f, "RIGHT_PAREN"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Star => write!(f, "STAR"),
            TokenKind::Slash => write!(f, "SLASH"),
            TokenKind::Percent => write!(f, "PERCENT"),
            TokenKind::ColonEqual => write!(f, "COLON_EQUAL"),
            TokenKind::BangEqual => write!(f, "BANG_EQUAL"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL"),
            TokenKind::LessThan => write!(f, "LESS"),
            TokenKind::LessThanEqual => write!(f, "LESS_EQUAL"),
            TokenKind::GreaterThan => write!(f, "GREATER"),
            TokenKind::GreaterThanEqual => write!(f, "GREATER_EQUAL"),
            TokenKind::Ampersand => write!(f, "AND"),
            TokenKind::AmpersandAmpersand => write!(f, "AND_AND"),
            TokenKind::Pipe => write!(f, "OR"),
            TokenKind::PipePipe => write!(f, "OR_OR"),
            TokenKind::BangBang => write!(f, "BANG_BANG"),
            TokenKind::NumericLiteral => write!(f, "NUMBER"),
            TokenKind::Ident => write!(f, "IDENTIFIER"),
            TokenKind::KeywordBegin => write!(f, "BEGIN"),
            TokenKind::KeywordBreak => write!(f, "BREAK"),
            TokenKind::KeywordContinue => write!(f, "CONTINUE"),
            TokenKind::KeywordDo => write!(f, "DO"),
            TokenKind::KeywordElif => write!(f, "ELIF"),
            TokenKind::KeywordElse => write!(f, "ELSE"),
            TokenKind::KeywordEnd => write!(f, "END"),
            TokenKind::KeywordFalse => write!(f, "FALSE"),
            TokenKind::KeywordFi => write!(f, "FI"),
            TokenKind::KeywordFor => write!(f, "FOR"),
            TokenKind::KeywordFun => write!(f, "FUN"),
            TokenKind::KeywordIf => write!(f, "IF"),
            TokenKind::KeywordOd => write!(f, "OD"),
            TokenKind::KeywordRepeat => write!(f, "REPEAT"),
            TokenKind::KeywordReturn => write!(f, "RETURN"),
            TokenKind::KeywordSkip => write!(f, "SKIP"),
            TokenKind::KeywordThen => write!(f, "THEN"),
            TokenKind::KeywordTrue => write!(f, "TRUE"),
            TokenKind::KeywordUntil => write!(f, "UNTIL"),
            TokenKind::KeywordWhile => write!(f, "WHILE"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

impl TokenKind {
    /// Tokens that close a code block without being part of it.
    pub fn ends_code_block(&self) -> bool {
        matches!(
            self,
            TokenKind::Eof
                | TokenKind::KeywordOd
                | TokenKind::KeywordFi
                | TokenKind::KeywordElif
                | TokenKind::KeywordElse
                | TokenKind::KeywordEnd
                | TokenKind::KeywordUntil
                | TokenKind::Comma
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
