/// Default limit on nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Calls nested deeper than this fail with `StackExhausted`.
    pub max_call_depth: usize,
}

impl InterpreterConfig {
    pub fn new() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::new()
    }
}
