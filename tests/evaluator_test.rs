use color_eyre::Result;
use lwalk::{
    environment::Environment,
    interpreter::{
        context::BufferedContext, InterpreterConfig, TreeWalkInterpreter,
        TreeWalkStatementInterpreter,
    },
    lexer::Span,
    parser::{
        expression::{
            AdditionTerm, AdditiveOperator, Addition, Atom, AtomKind, ComparisonOperator, Expr,
            ExprKind, LogicalOperator, Multiplication, MultiplicationTerm,
            MultiplicativeOperator,
        },
        statement::{Assignment, CodeBlock, Program, Statement, WhileLoop},
        Parser,
    },
    string::Ident,
    value::{error::RuntimeErrorKind, Value},
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn number(value: i64) -> Atom {
    Atom::number(value, Span::default())
}

fn variable(name: &str) -> Atom {
    Atom::variable(Ident::new(name, Span::default()))
}

fn product(first: Atom, operator: MultiplicativeOperator, operand: Atom) -> Multiplication {
    Multiplication {
        first,
        rest: vec![MultiplicationTerm {
            operator,
            operand,
            span: Span::default(),
        }],
        span: Span::default(),
    }
}

fn sum(first: Multiplication, operator: AdditiveOperator, operand: Multiplication) -> Addition {
    Addition {
        first,
        rest: vec![AdditionTerm {
            operator,
            operand,
            span: Span::default(),
        }],
        span: Span::default(),
    }
}

fn evaluate(expr: &Expr) -> Result<Value, RuntimeErrorKind> {
    let mut environment = Environment::new();
    let global = environment.global();
    let mut context = BufferedContext::new();
    TreeWalkStatementInterpreter::new(InterpreterConfig::default())
        .evaluate(&mut environment, global, &mut context, expr)
        .map_err(|error| error.kind)
}

#[test]
fn evaluates_hand_built_expressions() -> Result<()> {
    // 2 + 3 * 4
    let expr: Expr = sum(
        number(2).into(),
        AdditiveOperator::Add,
        product(number(3), MultiplicativeOperator::Multiply, number(4)),
    )
    .into();
    assert_eq!(evaluate(&expr)?, Value::Number(14));

    // -(7) % 3
    let negated = Atom {
        kind: AtomKind::Negate(Box::new(number(7))),
        span: Span::default(),
    };
    let expr: Expr = Addition::from(product(negated, MultiplicativeOperator::Remainder, number(3))).into();
    assert_eq!(evaluate(&expr)?, Value::Number(-1));

    let expr = Expr {
        kind: ExprKind::Comparison {
            operator: ComparisonOperator::GreaterThanEqual,
            lhs: Multiplication::from(number(2)).into(),
            rhs: Multiplication::from(number(2)).into(),
        },
        span: Span::default(),
    };
    assert_eq!(evaluate(&expr)?, Value::Bool(true));
    Ok(())
}

fn logical(operator: LogicalOperator, lhs: Atom, rhs: Atom) -> Expr {
    Expr {
        kind: ExprKind::Logical {
            operator,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        },
        span: Span::default(),
    }
}

#[test]
fn eager_operators_always_evaluate_the_right_operand() -> Result<()> {
    let boolean = |value| Atom {
        kind: AtomKind::Bool(value),
        span: Span::default(),
    };
    let expr = logical(LogicalOperator::And, boolean(false), variable("nowhere"));
    assert_eq!(evaluate(&expr)?, Value::Bool(false));
    let expr = logical(LogicalOperator::Or, boolean(true), variable("nowhere"));
    assert_eq!(evaluate(&expr)?, Value::Bool(true));

    let expr = logical(LogicalOperator::EagerAnd, boolean(false), variable("nowhere"));
    assert!(matches!(
        evaluate(&expr),
        Err(RuntimeErrorKind::UndefinedVariable(_))
    ));
    let expr = logical(LogicalOperator::EagerOr, boolean(true), variable("nowhere"));
    assert!(matches!(
        evaluate(&expr),
        Err(RuntimeErrorKind::UndefinedVariable(_))
    ));

    let expr = logical(LogicalOperator::EagerOr, boolean(false), boolean(true));
    assert_eq!(evaluate(&expr)?, Value::Bool(true));
    let expr = logical(LogicalOperator::EagerAnd, boolean(true), boolean(false));
    assert_eq!(evaluate(&expr)?, Value::Bool(false));
    Ok(())
}

#[test]
fn evaluation_errors_carry_their_kind() {
    let expr: Expr = variable("nowhere").into();
    assert!(matches!(
        evaluate(&expr),
        Err(RuntimeErrorKind::UndefinedVariable(_))
    ));

    let expr: Expr = Addition::from(product(number(1), MultiplicativeOperator::Divide, number(0))).into();
    assert!(matches!(evaluate(&expr), Err(RuntimeErrorKind::DivisionByZero)));
}

#[test]
fn runs_a_hand_built_program() -> Result<()> {
    // x := 2 + 3 * 4; while x > 10 do x := x - 1 od; x
    let assign_x = |value: Expr| {
        Statement::Assignment(Assignment {
            target: Ident::new("x", Span::default()),
            value,
            span: Span::default(),
        })
    };
    let program = Program::new(vec![
        assign_x(
            sum(
                number(2).into(),
                AdditiveOperator::Add,
                product(number(3), MultiplicativeOperator::Multiply, number(4)),
            )
            .into(),
        ),
        Statement::While(WhileLoop {
            condition: Expr {
                kind: ExprKind::Comparison {
                    operator: ComparisonOperator::GreaterThan,
                    lhs: Multiplication::from(variable("x")).into(),
                    rhs: Multiplication::from(number(10)).into(),
                },
                span: Span::default(),
            },
            body: CodeBlock::new(
                vec![assign_x(
                    sum(
                        variable("x").into(),
                        AdditiveOperator::Subtract,
                        number(1).into(),
                    )
                    .into(),
                )],
                Span::default(),
            ),
            span: Span::default(),
        }),
        Statement::Expression(variable("x").into()),
    ]);

    let mut interpreter = TreeWalkInterpreter::new(BufferedContext::new());
    assert_eq!(interpreter.run(&program)?, Value::Number(10));
    assert_eq!(interpreter.get_global("x"), Some(Value::Number(10)));
    Ok(())
}

fn run_source(source: &str) -> Option<Value> {
    let program = Parser::new(source).parse().ok()?;
    TreeWalkInterpreter::new(BufferedContext::new())
        .run(&program)
        .ok()
}

// Property-based tests

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Subtract,
    Multiply,
}

impl Op {
    fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
        }
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Add), Just(Op::Subtract), Just(Op::Multiply)]
}

/// Evaluates a flat chain with `*` binding tighter than `+` and `-`.
fn reference(first: i64, chain: &[(Op, i64)]) -> i64 {
    let mut terms = vec![(Op::Add, first)];
    for &(op, operand) in chain {
        match op {
            Op::Multiply => {
                if let Some(last) = terms.last_mut() {
                    last.1 = last.1.wrapping_mul(operand);
                }
            }
            op => terms.push((op, operand)),
        }
    }
    terms.into_iter().fold(0i64, |total, (op, term)| match op {
        Op::Subtract => total.wrapping_sub(term),
        _ => total.wrapping_add(term),
    })
}

proptest! {
    #[test]
    fn arithmetic_respects_precedence(
        first in 0i64..10_000,
        chain in prop::collection::vec((op_strategy(), 0i64..10_000), 0..12),
    ) {
        let mut source = first.to_string();
        for (op, operand) in chain.iter() {
            source.push_str(&format!(" {} {operand}", op.symbol()));
        }
        prop_assert_eq!(
            run_source(&source),
            Some(Value::Number(reference(first, &chain)))
        );
    }

    #[test]
    fn division_truncates_toward_zero(
        lhs in -100_000i64..100_000,
        rhs in (-1_000i64..1_000).prop_filter("non-zero divisor", |v| *v != 0),
    ) {
        prop_assert_eq!(run_source(&format!("({lhs}) / ({rhs})")), Some(Value::Number(lhs / rhs)));
        prop_assert_eq!(run_source(&format!("({lhs}) % ({rhs})")), Some(Value::Number(lhs % rhs)));
    }

    #[test]
    fn comparison_matches_integer_order(lhs in any::<i32>(), rhs in any::<i32>()) {
        let (lhs, rhs) = (lhs as i64, rhs as i64);
        prop_assert_eq!(run_source(&format!("({lhs}) < ({rhs})")), Some(Value::Bool(lhs < rhs)));
        prop_assert_eq!(run_source(&format!("({lhs}) == ({rhs})")), Some(Value::Bool(lhs == rhs)));
    }
}
