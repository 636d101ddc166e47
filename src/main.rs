use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;

use ok_lang::cli::Args;
use ok_lang::interpreter;
use ok_lang::quentyn;
use ok_lang::repl;
use ok_lang::value::Value;

fn main() {
    let args = Args::parse();

    if let Some(source) = &args.eval {
        run(source, &args);
    } else if let Some(path) = &args.script {
        match read_script(path) {
            Ok(source) => run(&source, &args),
            Err(error) => {
                eprintln!("{}", format!("{:#}", error).red());
                process::exit(1);
            }
        }
    } else {
        greet();
        repl::start();
    }
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run(source: &str, args: &Args) {
    match interpreter::parse_and_eval(source, io::stdout()) {
        Err(errors) => {
            eprintln!("{}", " Parser errors:".red());
            for error in &errors {
                eprintln!("\t{}", error.red());
            }
            process::exit(1);
        }
        Ok(Value::Error(message)) => {
            eprintln!("{}", format!("ERROR: {}", message).red());
            process::exit(1);
        }
        Ok(Value::Null) => {}
        Ok(value) => println!("{}", value.inspect()),
    }

    if !args.no_quentyn {
        let message = quentyn::quentyn_message();
        if !message.is_empty() {
            println!("{}", message);
        }
    }
}

fn greet() {
    let user = env::var("USER").unwrap_or_else(|_| "friend".to_string());
    println!("Hello {}! This is the OK? programming language!", user);
    println!("Feel free to type in commands");
}
