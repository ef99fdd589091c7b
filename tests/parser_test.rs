use color_eyre::eyre::Result;
use lwalk::lexer::{LexicalErrorKind, TokenKind};
use lwalk::parser::{
    formatter::{PrettyFormatter, ProgramFormatter, SExpressionFormatter},
    Parser, ParserErrorKind, Statement,
};
use pretty_assertions::assert_eq;
use std::path::Path;

fn check(input: &str, expected: &str) {
    let mut parser = Parser::new(input);
    let formatter = SExpressionFormatter::new(input);
    let result = match parser.parse() {
        Ok(program) => formatter.format(&program),
        Err(error) => formatter.format_error(&error),
    };
    assert_eq!(result, expected, "Failed on input: {input}");
}

fn parse_error(input: &str) -> ParserErrorKind {
    match Parser::new(input).parse() {
        Ok(program) => panic!("Expected {input} to fail but parsed {program:?}"),
        Err(error) => error.kind,
    }
}

#[test]
fn smoke_test() {
    check("", "");
    check("skip", "skip");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    check("x := 1 + 2 * 3", "(:= x (+ 1 (* 2 3)))");
    check("x := (1 + 2) * 3", "(:= x (* (group (+ 1 2)) 3))");
}

#[test]
fn binary_operators_are_left_associative() {
    check("1 - 2 - 3", "(- (- 1 2) 3)");
    check("8 / 4 % 3 * 2", "(* (% (/ 8 4) 3) 2)");
}

#[test]
fn logical_operators_sit_below_comparison() {
    check("a < b && c || d", "(|| (&& (< a b) c) d)");
    check("a !! b && c", "(|| a (&& b c))");
    check("a | b & c", "(| a (& b c))");
    check("a & b && c | d || e", "(|| (| (&& (& a b) c) d) e)");
    check("x + 1 >= y * 2", "(>= (+ x 1) (* y 2))");
}

#[test]
fn unary_minus_applies_to_atoms() {
    check("-(1 + 2) * 3", "(* (- (group (+ 1 2))) 3)");
    check("2 * -x", "(* 2 (- x))");
    check("--1", "(- -1)");
    check("--x", "(- (- x))");
}

#[test]
fn negative_literals_fold_into_numbers() {
    check("x := -9223372036854775808", "(:= x -9223372036854775808)");
    check("x := 1 - 2", "(:= x (- 1 2))");
    check("x := 1 - -2", "(:= x (- 1 -2))");
    assert_eq!(
        parse_error("-9223372036854775809"),
        ParserErrorKind::InvalidNumber("-9223372036854775809".into())
    );
}

#[test]
fn parses_loops() {
    check(
        "while i < 3 do i := i + 1 od",
        "(while (< i 3) (block (:= i (+ i 1))))",
    );
    check(
        "for i := 0, i < 3, i := i + 1 do write(i) od",
        "(for (block (:= i 0)) (< i 3) (block (:= i (+ i 1))) (block (call write i)))",
    );
    check(
        "repeat x := x - 1 until x == 0",
        "(repeat (block (:= x (- x 1))) (== x 0))",
    );
    check("while true do od", "(while true (block))");
}

#[test]
fn parses_conditionals() {
    check(
        "if a then skip elif b then break else continue fi",
        "(if a (block skip) (elif b (block break)) (else (block continue)))",
    );
    check("if a then x := 1; y := 2; fi", "(if a (block (:= x 1) (:= y 2)))");
}

#[test]
fn parses_function_definitions() {
    check(
        "fun f(a, b) begin return a end",
        "(fun f (a b) (block (return a)))",
    );
    check("fun g() begin return end", "(fun g () (block (return)))");
}

#[test]
fn statements_are_separated_by_semicolons() {
    check(
        "x := 1; write(x);\nwrite(f(x, 2));",
        "(:= x 1)\n(call write x)\n(call write (call f x 2))",
    );
}

#[test]
fn bare_call_is_a_call_statement() -> Result<()> {
    let program = Parser::new("write(1); f(1) + 1").parse()?;
    assert!(matches!(program.get_statement(0), Some(Statement::Call(_))));
    assert!(matches!(
        program.get_statement(1),
        Some(Statement::Expression(_))
    ));
    Ok(())
}

#[test]
fn reports_line_of_error() {
    check("x := 1;\ny := ;", "[line 2] Error: Expected an expression but got token SEMICOLON.");
    check("x := 1 @", "[line 1] Error: Unexpected character: @");
}

#[test]
fn rejects_malformed_programs() {
    assert_eq!(parse_error("x := "), ParserErrorKind::NonExpression(TokenKind::Eof));
    assert_eq!(
        parse_error("while true do skip"),
        ParserErrorKind::UnexpectedToken {
            actual: TokenKind::Eof,
            expected: TokenKind::KeywordOd,
        }
    );
    assert_eq!(
        parse_error("od"),
        ParserErrorKind::UnexpectedToken {
            actual: TokenKind::KeywordOd,
            expected: TokenKind::Eof,
        }
    );
    assert_eq!(
        parse_error(")"),
        ParserErrorKind::InvalidStatement(TokenKind::RightParenthesis)
    );
    assert_eq!(
        parse_error("x := 1 x := 2"),
        ParserErrorKind::UnexpectedToken {
            actual: TokenKind::Ident,
            expected: TokenKind::Eof,
        }
    );
    assert_eq!(
        parse_error("a < b < c"),
        ParserErrorKind::UnexpectedToken {
            actual: TokenKind::LessThan,
            expected: TokenKind::Eof,
        }
    );
    assert_eq!(
        parse_error("fun f(a b) begin end"),
        ParserErrorKind::UnexpectedToken {
            actual: TokenKind::Ident,
            expected: TokenKind::RightParenthesis,
        }
    );
}

#[test]
fn rejects_oversized_literals() {
    assert_eq!(
        parse_error("99999999999999999999"),
        ParserErrorKind::InvalidNumber("99999999999999999999".into())
    );
}

#[test]
fn lexical_errors_stop_parsing() {
    match parse_error("x = 1") {
        ParserErrorKind::LexicalError(error) => {
            assert_eq!(error.kind, LexicalErrorKind::Unrecognized('='));
        }
        kind => panic!("Expected a lexical error but got {kind:?}"),
    }
}

#[test]
fn deeply_nested_groups_parse() -> Result<()> {
    let depth = 2000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    Parser::new(&source).parse()?;
    Ok(())
}

#[test]
fn deeply_nested_negations_parse_and_format() -> Result<()> {
    let depth = 100_000;
    let source = format!("{}x", "-".repeat(depth));
    let program = Parser::new(&source).parse()?;
    let output = SExpressionFormatter::new(&source).format(&program);
    assert!(output.starts_with("(- (- "));
    assert_eq!(output.matches("(-").count(), depth);
    Ok(())
}

#[test]
fn deeply_nested_statements_parse_and_format() -> Result<()> {
    let depth = 20_000;
    let source = format!(
        "{}x := 1{}",
        "if true then ".repeat(depth),
        " fi".repeat(depth)
    );
    let program = Parser::new(&source).parse()?;
    let output = SExpressionFormatter::new(&source).format(&program);
    assert_eq!(output.matches("(if true").count(), depth);
    Ok(())
}

#[test]
fn long_logical_chains_parse_and_format() -> Result<()> {
    let depth = 50_000;
    let source = format!("true{}", " && true".repeat(depth));
    let program = Parser::new(&source).parse()?;
    let output = SExpressionFormatter::new(&source).format(&program);
    assert_eq!(output.matches("(&&").count(), depth);
    Ok(())
}

#[test]
fn pretty_errors_name_the_code_and_file() -> Result<()> {
    let source = "while true do skip";
    let error = Parser::new(source).parse().unwrap_err();
    assert_eq!(error.code(), "PA001");
    let report = PrettyFormatter::new(source, Path::new("loop.l")).format_error(&error);
    assert!(report.contains("PA001"), "{report}");
    assert!(report.contains("loop.l"), "{report}");
    assert!(report.contains("Expected a different token"), "{report}");

    let program = Parser::new("x := 1").parse()?;
    assert_eq!(
        PrettyFormatter::new("x := 1", Path::new("ok.l")).format(&program),
        "(:= x 1)"
    );
    Ok(())
}
