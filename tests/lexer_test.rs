use color_eyre::eyre::Result;
use lwalk::lexer::{
    formatter::{BasicFormatter, LineFormatter, ToFormatter, TokenFormatter},
    LexicalErrorKind, Lexer, LineBreaks, SourcePosition, Token, TokenKind,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn check(input: &str, expected: &str) {
    let mut scanner = Lexer::new(input);
    let formatter: BasicFormatter = scanner.create_formatter();
    let mut buffer = String::new();
    loop {
        match scanner.next_token() {
            Ok(token) => {
                buffer.push_str(&formatter.format(&token));
                if matches!(token.kind, TokenKind::Eof) {
                    buffer.push('\n');
                    break;
                }
            }
            Err(error) => {
                buffer.push_str(&formatter.format_lexical_error(&error));
            }
        }
        buffer.push('\n');
    }

    assert_eq!(buffer, expected);
}

fn kinds(input: &str) -> Vec<TokenKind> {
    let mut scanner = Lexer::new(input);
    let mut kinds = Vec::new();
    loop {
        match scanner.next_token() {
            Ok(Token {
                kind: TokenKind::Eof,
                ..
            }) => return kinds,
            Ok(token) => kinds.push(token.kind),
            Err(error) => panic!("unexpected lexical error {error}"),
        }
    }
}

#[test]
fn smoke_test() {
    check("", "EOF\n");
}

#[test]
fn lexes_assignment_and_skips_comments() {
    check(
        "x := 10 // the answer\nwhile",
        "IDENTIFIER x\nCOLON_EQUAL :=\nNUMBER 10\nWHILE while\nEOF\n",
    );
}

#[test]
fn lexes_two_character_operators() {
    assert_eq!(
        kinds("a <= b != c !! d && e || f >= g == h < i > j"),
        vec![
            TokenKind::Ident,
            TokenKind::LessThanEqual,
            TokenKind::Ident,
            TokenKind::BangEqual,
            TokenKind::Ident,
            TokenKind::BangBang,
            TokenKind::Ident,
            TokenKind::AmpersandAmpersand,
            TokenKind::Ident,
            TokenKind::PipePipe,
            TokenKind::Ident,
            TokenKind::GreaterThanEqual,
            TokenKind::Ident,
            TokenKind::EqualEqual,
            TokenKind::Ident,
            TokenKind::LessThan,
            TokenKind::Ident,
            TokenKind::GreaterThan,
            TokenKind::Ident,
        ]
    );
}

#[test]
fn single_ampersand_and_pipe_are_eager_operators() {
    assert_eq!(
        kinds("a & b | c &&d||e&f"),
        vec![
            TokenKind::Ident,
            TokenKind::Ampersand,
            TokenKind::Ident,
            TokenKind::Pipe,
            TokenKind::Ident,
            TokenKind::AmpersandAmpersand,
            TokenKind::Ident,
            TokenKind::PipePipe,
            TokenKind::Ident,
            TokenKind::Ampersand,
            TokenKind::Ident,
        ]
    );
    check("x|y", "IDENTIFIER x\nOR |\nIDENTIFIER y\nEOF\n");
}

#[test]
fn operators_need_no_whitespace() {
    assert_eq!(
        kinds("x:=-(1+2)*3/4%5;"),
        vec![
            TokenKind::Ident,
            TokenKind::ColonEqual,
            TokenKind::Minus,
            TokenKind::LeftParenthesis,
            TokenKind::NumericLiteral,
            TokenKind::Plus,
            TokenKind::NumericLiteral,
            TokenKind::RightParenthesis,
            TokenKind::Star,
            TokenKind::NumericLiteral,
            TokenKind::Slash,
            TokenKind::NumericLiteral,
            TokenKind::Percent,
            TokenKind::NumericLiteral,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(
        kinds("if then elif else fi repeat until fun begin end skip od done"),
        vec![
            TokenKind::KeywordIf,
            TokenKind::KeywordThen,
            TokenKind::KeywordElif,
            TokenKind::KeywordElse,
            TokenKind::KeywordFi,
            TokenKind::KeywordRepeat,
            TokenKind::KeywordUntil,
            TokenKind::KeywordFun,
            TokenKind::KeywordBegin,
            TokenKind::KeywordEnd,
            TokenKind::KeywordSkip,
            TokenKind::KeywordOd,
            TokenKind::Ident,
        ]
    );
}

#[test]
fn number_followed_by_letters_splits() {
    check("12ab", "NUMBER 12\nIDENTIFIER ab\nEOF\n");
}

#[test]
fn recovers_after_unrecognized_characters() {
    check(
        "a @ = b",
        "IDENTIFIER a\n[line 1] Error: Unexpected character: @\n[line 1] Error: Unexpected character: =\nIDENTIFIER b\nEOF\n",
    );
}

#[test]
fn lone_colon_is_an_error() -> Result<()> {
    let mut scanner = Lexer::new("x : 1");
    assert_eq!(scanner.next_token()?.kind, TokenKind::Ident);
    let error = scanner.next_token().unwrap_err();
    assert_eq!(error.kind, LexicalErrorKind::Unrecognized(':'));
    assert_eq!(error.span.range(), 2..3);
    assert_eq!(scanner.next_token()?.kind, TokenKind::NumericLiteral);
    Ok(())
}

#[test]
fn comment_at_end_of_input() -> Result<()> {
    let mut scanner = Lexer::new("skip // trailing");
    assert_eq!(scanner.next_token()?.kind, TokenKind::KeywordSkip);
    assert_eq!(scanner.next_token()?.kind, TokenKind::Eof);
    assert_eq!(scanner.next_token()?.kind, TokenKind::Eof);
    Ok(())
}

#[test]
fn line_breaks_report_line_and_column() {
    let line_breaks = LineBreaks::new("x := 1;\n  y := x / 0\n");
    assert_eq!(line_breaks.get_line(0), 1);
    assert_eq!(
        line_breaks.get_position(17),
        SourcePosition { line: 2, column: 10 }
    );
    assert_eq!(line_breaks.get_position(8).to_string(), "2:1");
}

#[test]
fn line_formatter_prefixes_positions() -> Result<()> {
    let mut scanner = Lexer::new("x :=\n  7 ?");
    let formatter: LineFormatter = scanner.create_formatter();
    assert_eq!(formatter.format(&scanner.next_token()?), "(1:1) IDENTIFIER x");
    assert_eq!(formatter.format(&scanner.next_token()?), "(1:3) COLON_EQUAL :=");
    assert_eq!(formatter.format(&scanner.next_token()?), "(2:3) NUMBER 7");
    let error = scanner.next_token().unwrap_err();
    assert_eq!(
        formatter.format_lexical_error(&error),
        "(2:5) ERROR UNEXPECTED_CHAR ?"
    );
    Ok(())
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just(",".to_string()),
        Just(";".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("%".to_string()),
        Just(":=".to_string()),
        Just("!=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
        Just("&".to_string()),
        Just("&&".to_string()),
        Just("|".to_string()),
        Just("||".to_string()),
        Just("!!".to_string()),
    ]
}

fn numeric_literal_strategy() -> impl Strategy<Value = String> {
    "[0-9]+".prop_map(|s| s)
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]*".prop_map(|s: String| s)
}

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("while".to_string()),
        Just("do".to_string()),
        Just("od".to_string()),
        Just("for".to_string()),
        Just("repeat".to_string()),
        Just("until".to_string()),
        Just("if".to_string()),
        Just("then".to_string()),
        Just("elif".to_string()),
        Just("else".to_string()),
        Just("fi".to_string()),
        Just("fun".to_string()),
        Just("begin".to_string()),
        Just("end".to_string()),
        Just("return".to_string()),
        Just("break".to_string()),
        Just("continue".to_string()),
        Just("skip".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
    ]
}

fn comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{}\n", s))
}

fn token_sequence_with_comments_strategy() -> impl Strategy<Value = String> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
            comment_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
    .prop_map(|tokens| tokens.join(" "))
}

fn token_sequence_without_comments_strategy() -> impl Strategy<Value = Vec<String>> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            symbol_strategy(),
            numeric_literal_strategy(),
            identifier_strategy(),
            keyword_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(input in token_sequence_without_comments_strategy()) {
        // Add 1 to include EOF token
        let expected_num_tokens = input.len() + 1;
        let input = input.join(" ");
        let mut scanner = Lexer::new(&input);
        let mut num_tokens = 0;
        loop {
            num_tokens += 1;
            match scanner.next_token() {
                Ok(Token {kind: TokenKind::Eof, ..}) => {
                    break;
                },
                token => {
                    prop_assert!(token.is_ok());
                }
            }
        }
        prop_assert_eq!(num_tokens, expected_num_tokens);
    }

    #[test]
    fn lexer_handles_valid_tokens_with_comments(input in token_sequence_with_comments_strategy()) {
        let mut scanner = Lexer::new(&input);
        loop {
            match scanner.next_token() {
                Ok(Token {kind: TokenKind::Eof, ..}) => {
                    break;
                },
                token => {
                    prop_assert!(token.is_ok());
                }
            }
        }
    }

    #[test]
    fn token_spans_point_at_their_lexemes(input in token_sequence_without_comments_strategy()) {
        let source = input.join(" ");
        let mut scanner = Lexer::new(&source);
        for expected in input.iter() {
            let token = scanner.next_token();
            prop_assert!(token.is_ok());
            if let Ok(token) = token {
                prop_assert_eq!(&source[token.span.range()], expected.as_str());
            }
        }
    }
}
