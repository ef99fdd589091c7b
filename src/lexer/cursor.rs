#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceChar {
    pub value: char,
    pub offset: usize,
}

impl SourceChar {
    pub fn next_offset(&self) -> usize {
        self.offset + self.value.len_utf8()
    }
}
