use crate::lexer::Span;
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: IdentName,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<IdentName>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub type IdentName = CompactString;
