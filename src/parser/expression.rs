//! Expression nodes.
//!
//! Precedence is encoded in the shape of the tree: an [`Expr`] is built from
//! [`Addition`]s, an addition from [`Multiplication`]s and a multiplication
//! from [`Atom`]s. Each level keeps its operands as a left-associative chain.
use super::statement::FunctionCall;
use crate::lexer::Span;
use crate::stack::ensure_sufficient_stack;
use crate::string::Ident;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOperator {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOperator {
    Multiply,
    Divide,
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// `&&`, skips the right operand once the left one is false.
    And,
    /// `||` or `!!`, skips the right operand once the left one is true.
    Or,
    /// `&`, always evaluates both operands.
    EagerAnd,
    /// `|`, always evaluates both operands.
    EagerOr,
}

impl std::fmt::Display for AdditiveOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Subtract => write!(f, "-"),
        }
    }
}

impl std::fmt::Display for MultiplicativeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multiply => write!(f, "*"),
            Self::Divide => write!(f, "/"),
            Self::Remainder => write!(f, "%"),
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanEqual => write!(f, "<="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanEqual => write!(f, ">="),
        }
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::EagerAnd => write!(f, "&"),
            Self::EagerOr => write!(f, "|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Addition(Addition),
    Comparison {
        operator: ComparisonOperator,
        lhs: Addition,
        rhs: Addition,
    },
    Logical {
        operator: LogicalOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Addition {
    pub first: Multiplication,
    pub rest: Vec<AdditionTerm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdditionTerm {
    pub operator: AdditiveOperator,
    pub operand: Multiplication,
    /// Covers the operator and its right operand.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Multiplication {
    pub first: Atom,
    pub rest: Vec<MultiplicationTerm>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiplicationTerm {
    pub operator: MultiplicativeOperator,
    pub operand: Atom,
    /// Covers the operator and its right operand.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub kind: AtomKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    Number(i64),
    Bool(bool),
    Variable(Ident),
    Group(Box<Expr>),
    Call(FunctionCall),
    Negate(Box<Atom>),
}

impl Atom {
    pub fn number(value: i64, span: Span) -> Self {
        Self {
            kind: AtomKind::Number(value),
            span,
        }
    }

    pub fn variable(ident: Ident) -> Self {
        Self {
            span: ident.span,
            kind: AtomKind::Variable(ident),
        }
    }
}

impl From<Atom> for Multiplication {
    fn from(value: Atom) -> Self {
        Self {
            span: value.span,
            first: value,
            rest: Vec::new(),
        }
    }
}

impl From<Multiplication> for Addition {
    fn from(value: Multiplication) -> Self {
        Self {
            span: value.span,
            first: value,
            rest: Vec::new(),
        }
    }
}

impl From<Addition> for Expr {
    fn from(value: Addition) -> Self {
        Self {
            span: value.span,
            kind: ExprKind::Addition(value),
        }
    }
}

impl From<Atom> for Expr {
    fn from(value: Atom) -> Self {
        Addition::from(Multiplication::from(value)).into()
    }
}

impl Expr {
    fn sole_atom_mut(&mut self) -> Option<&mut Atom> {
        match &mut self.kind {
            ExprKind::Addition(addition)
                if addition.rest.is_empty() && addition.first.rest.is_empty() =>
            {
                Some(&mut addition.first.first)
            }
            _ => None,
        }
    }

    /// Unwraps an expression that is nothing but a single call.
    pub fn into_call(mut self) -> Result<FunctionCall, Expr> {
        let is_call = self
            .sole_atom_mut()
            .is_some_and(|atom| matches!(atom.kind, AtomKind::Call(_)));
        if !is_call {
            return Err(self);
        }
        let taken = self
            .sole_atom_mut()
            .map(|atom| std::mem::replace(&mut atom.kind, AtomKind::Bool(false)));
        match taken {
            Some(AtomKind::Call(call)) => Ok(call),
            _ => Err(self),
        }
    }
}

// Trees nest as deeply as the source does, so subtrees are freed on a grown stack.
impl Drop for Expr {
    fn drop(&mut self) {
        if let ExprKind::Logical { .. } = self.kind {
            let placeholder = Multiplication::from(Atom::number(0, self.span)).into();
            let kind = std::mem::replace(&mut self.kind, ExprKind::Addition(placeholder));
            ensure_sufficient_stack(move || drop(kind));
        }
    }
}

impl Drop for Atom {
    fn drop(&mut self) {
        if let AtomKind::Group(_) | AtomKind::Call(_) | AtomKind::Negate(_) = self.kind {
            let kind = std::mem::replace(&mut self.kind, AtomKind::Bool(false));
            ensure_sufficient_stack(move || drop(kind));
        }
    }
}
