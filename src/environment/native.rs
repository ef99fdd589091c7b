use crate::interpreter::SystemContext;
use crate::value::{error::RuntimeErrorKind, NativeFunction, Value};
use compact_str::ToCompactString;

/// `read()` parses one line of host input as a number.
#[derive(Debug)]
pub struct NativeRead;

impl NativeFunction for NativeRead {
    fn get_name(&self) -> &'static str {
        "read"
    }

    fn get_parameters(&self) -> &'static [&'static str] {
        &[]
    }

    fn call(
        &self,
        _arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        let Some(line) = context.read_line() else {
            return Err(RuntimeErrorKind::InvalidInput("<end of input>".into()));
        };
        let trimmed = line.trim();
        trimmed
            .parse::<i64>()
            .map(Value::Number)
            .map_err(|_| RuntimeErrorKind::InvalidInput(trimmed.to_compact_string()))
    }
}

/// `write(x)` emits the display form of its argument as one line.
#[derive(Debug)]
pub struct NativeWrite;

impl NativeFunction for NativeWrite {
    fn get_name(&self) -> &'static str {
        "write"
    }

    fn get_parameters(&self) -> &'static [&'static str] {
        &["value"]
    }

    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeErrorKind> {
        for argument in arguments {
            context.writeln(&argument.to_string());
        }
        Ok(Value::None)
    }
}
