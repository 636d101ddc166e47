mod builtins;
mod environment;
mod evaluator;
mod parser;
mod shortening;

pub use environment::Environment;
pub use evaluator::Evaluator;
pub use parser::Parser;

use std::io::Write;

use crate::ast::Program;
use crate::lexer::Lexer;
use crate::value::Value;

/// Lexes and parses `source`. Returns the program, or the ordered list of
/// parse errors when any were recorded.
pub fn parse(source: &str) -> Result<Program, Vec<String>> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.errors().to_vec())
    }
}

/// Parses and evaluates `source` against a fresh root environment, sending
/// `puts` output to `out`. The terminal value may itself be an Error value.
pub fn parse_and_eval(
    source: &str,
    out: impl Write + Send + 'static,
) -> Result<Value, Vec<String>> {
    let program = parse(source)?;
    let environment = Environment::new();
    Ok(Evaluator::new(out).eval_program(&program, &environment))
}
