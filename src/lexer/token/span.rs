use std::ops::Range;

/// A byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// The byte position of the start of the token.
    pub start: u32,
    /// The length of the token in bytes.
    pub length: u32,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self {
            start: start as u32,
            length: length as u32,
        }
    }

    /// Builds the span covering `start..end`.
    pub fn between(start: usize, end: usize) -> Self {
        Self::new(start, end.saturating_sub(start))
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }

    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span {
            start,
            length: end - start,
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(value: Range<usize>) -> Self {
        Self::between(value.start, value.end)
    }
}
