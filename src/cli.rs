use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ok")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The OK? programming language", long_about = None)]
pub struct Args {
    /// Script to run; drops into the REPL when omitted
    #[arg(value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Evaluate the given source text instead of a file
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "script")]
    pub eval: Option<String>,

    /// Suppress Quentyn's musings after the program finishes
    #[arg(long = "no-quentyn")]
    pub no_quentyn: bool,
}
