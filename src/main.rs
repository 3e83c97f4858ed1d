use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use gemqa::Config;
use gemqa::shell::{self, LineSource, ReaderSource, TerminalSource};

/// gemqa - ask Gemini questions from the terminal
#[derive(Parser)]
#[command(name = "gemqa")]
#[command(about = "Interactive question answering with Gemini")]
#[command(version)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    gemqa::init_tracing("warn");

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Loads configuration, then runs the shell until the user leaves.
fn run() -> Result<()> {
    let config = Config::load();

    // Piped input bypasses the line editor
    let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
        Box::new(TerminalSource::new())
    } else {
        Box::new(ReaderSource::new(io::stdin().lock()))
    };

    shell::run_with_config(&config, source.as_mut(), io::stdout())?;
    Ok(())
}
