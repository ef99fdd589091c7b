use super::SystemContext;
use std::collections::VecDeque;

pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        println!("{text}");
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

/// Collects output in memory and serves input from a queue.
#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
    input: VecDeque<String>,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            buffer: String::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get_output(&self) -> &str {
        &self.buffer
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }
}
