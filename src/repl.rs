use std::io::{self, BufRead, Write};

use crate::interpreter::{Environment, Evaluator, Parser};
use crate::lexer::Lexer;
use crate::value::Value;

const PROMPT: &str = ">> ";

/// Reads statements line by line, evaluating each against one environment
/// that persists for the whole session.
pub fn start() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let environment = Environment::new();
    let evaluator = Evaluator::new(io::stdout());

    loop {
        print!("{}", PROMPT);
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        let lexer = Lexer::new(&line);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();

        if !parser.errors().is_empty() {
            print_parser_errors(&mut stdout, parser.errors());
            continue;
        }

        let evaluated = evaluator.eval_program(&program, &environment);
        if !matches!(evaluated, Value::Null) {
            let _ = writeln!(stdout, "{}", evaluated.inspect());
        }
    }
}

fn print_parser_errors(out: &mut impl Write, errors: &[String]) {
    let _ = writeln!(out, " Parser errors:");
    for error in errors {
        let _ = writeln!(out, "\t{}", error);
    }
}
