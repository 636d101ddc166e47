use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use ok_lang::interpreter::{Environment, Evaluator, Parser};
use ok_lang::lexer::Lexer;
use ok_lang::value::Value;

/// A writer backed by a shared buffer, for capturing `puts` output.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn parse_errors(input: &str) -> Vec<String> {
    let mut parser = Parser::new(Lexer::new(input));
    parser.parse_program();
    parser.errors().to_vec()
}

pub fn expect_parse_error(input: &str, expected: &str) {
    let errors = parse_errors(input);
    assert!(
        errors.iter().any(|error| error == expected),
        "expected error for {:?}:\n{}\nactual errors:\n{}",
        input,
        expected,
        errors.join("\n")
    );
}

/// Parses and evaluates `input`, failing the test on parse errors.
pub fn eval_input(input: &str) -> Value {
    eval_with_output(input).0
}

pub fn eval_with_output(input: &str) -> (Value, String) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parse errors for {:?}:\n{}",
        input,
        parser.errors().join("\n")
    );

    let sink = SharedSink::default();
    let environment = Environment::new();
    let value = Evaluator::new(sink.clone()).eval_program(&program, &environment);
    (value, sink.contents())
}

pub fn expect_int(input: &str, expected: i64) {
    assert_eq!(eval_input(input), Value::Integer(expected), "input: {}", input);
}

pub fn expect_bool(input: &str, expected: bool) {
    assert_eq!(eval_input(input), Value::Boolean(expected), "input: {}", input);
}

pub fn expect_string(input: &str, expected: &str) {
    let value = eval_input(input);
    assert_eq!(
        value,
        Value::string(expected),
        "input: {}, got {:?}",
        input,
        value
    );
}

pub fn expect_null(input: &str) {
    assert_eq!(eval_input(input), Value::Null, "input: {}", input);
}

pub fn expect_error(input: &str, expected: &str) {
    let value = eval_input(input);
    match &value {
        Value::Error(message) => assert_eq!(message, expected, "input: {}", input),
        other => panic!(
            "expected error {:?} for {}, got {:?}",
            expected, input, other
        ),
    }
}
