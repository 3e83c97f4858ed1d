//! Interactive question loop for the terminal.
//!
//! The shell has two states: awaiting input and terminated. It reads one line
//! at a time from a [`LineSource`], answers it, and loops until the user types
//! `exit`/`quit`, presses Ctrl+C, or closes the input.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};
use tracing::debug;

use crate::answerer::QuestionAnswerer;
use crate::config::Config;
use crate::gemini::GeminiClientBuilder;

const RULE_WIDTH: usize = 60;
const TRACE_RULE_WIDTH: usize = 30;
const PROMPT_LABEL: &str = "User Question";
const QUERYING_STATUS: &str = "Querying Gemini API...";

/// One read from a line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its trailing newline
    Line(String),
    /// The user pressed Ctrl+C
    Interrupted,
    /// Input is closed (Ctrl+D or end of a piped stream)
    Eof,
}

/// Source of user input lines.
pub trait LineSource {
    /// Blocks until the next line, interrupt, or end of input.
    fn read_line(&mut self) -> io::Result<Input>;
}

/// Line source backed by the `reedline` line editor.
pub struct TerminalSource {
    editor: Reedline,
    prompt: DefaultPrompt,
}

impl TerminalSource {
    /// Creates a terminal line source showing the question prompt.
    pub fn new() -> Self {
        Self {
            editor: Reedline::create(),
            prompt: DefaultPrompt::new(
                DefaultPromptSegment::Basic(PROMPT_LABEL.to_string()),
                DefaultPromptSegment::Empty,
            ),
        }
    }
}

impl Default for TerminalSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for TerminalSource {
    #[allow(unreachable_patterns)]
    fn read_line(&mut self) -> io::Result<Input> {
        match self.editor.read_line(&self.prompt)? {
            Signal::Success(buffer) => Ok(Input::Line(buffer)),
            Signal::CtrlC => Ok(Input::Interrupted),
            Signal::CtrlD => Ok(Input::Eof),
            _ => Ok(Input::Eof),
        }
    }
}

/// Line source reading from any buffered reader, for piped input and tests.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> io::Result<Input> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Eof);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Input::Line(line))
    }
}

/// What a single input line asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    /// `exit` or `quit`, any case
    Exit,
    /// Blank line
    Skip,
    /// Anything else is a question
    Ask(&'a str),
}

impl<'a> ShellCommand<'a> {
    /// Classifies an input line.
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Self::Skip
        } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            Self::Exit
        } else {
            Self::Ask(line)
        }
    }
}

/// Why the shell stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed `exit` or `quit`
    Command,
    /// The user pressed Ctrl+C
    Interrupted,
    /// Input was closed
    EndOfInput,
}

/// Shell state after handling one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    AwaitingInput,
    Terminated(ExitReason),
}

/// Interactive question-answering loop writing to `W`.
pub struct Shell<'a, W: Write> {
    answerer: &'a QuestionAnswerer,
    model: &'a str,
    out: W,
}

impl<'a, W: Write> Shell<'a, W> {
    /// Creates a shell that answers with `answerer` and prints to `out`.
    ///
    /// `model` is only used in the banner.
    pub fn new(answerer: &'a QuestionAnswerer, model: &'a str, out: W) -> Self {
        Self {
            answerer,
            model,
            out,
        }
    }

    /// Prints the banner, then loops until the shell terminates.
    pub fn run(&mut self, source: &mut dyn LineSource) -> io::Result<ExitReason> {
        self.print_banner()?;

        loop {
            let input = source.read_line()?;
            if let ShellState::Terminated(reason) = self.step(input)? {
                writeln!(self.out, "Exiting application. Goodbye!")?;
                self.out.flush()?;
                return Ok(reason);
            }
        }
    }

    /// Handles one input and returns the resulting state.
    pub fn step(&mut self, input: Input) -> io::Result<ShellState> {
        let line = match input {
            Input::Line(line) => line,
            Input::Interrupted => return Ok(ShellState::Terminated(ExitReason::Interrupted)),
            Input::Eof => return Ok(ShellState::Terminated(ExitReason::EndOfInput)),
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Exit => Ok(ShellState::Terminated(ExitReason::Command)),
            ShellCommand::Skip => Ok(ShellState::AwaitingInput),
            ShellCommand::Ask(question) => {
                self.ask(question)?;
                Ok(ShellState::AwaitingInput)
            }
        }
    }

    /// Consumes the shell and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_banner(&mut self) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "NLP Q&A System CLI (Model: {})", self.model)?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "Type 'exit' or 'quit' to stop.")?;
        self.out.flush()
    }

    fn ask(&mut self, question: &str) -> io::Result<()> {
        let normalized = self.answerer.prepare(question);
        debug!(tokens = normalized.tokens().len(), "question received");

        let trace_rule = "-".repeat(TRACE_RULE_WIDTH);
        writeln!(self.out, "{trace_rule}")?;
        writeln!(self.out, "Preprocessing Info:")?;
        writeln!(self.out, "  > Lowercase & Cleaned: {}", normalized.cleaned())?;
        writeln!(self.out, "  > Tokens: {:?}", normalized.tokens())?;
        writeln!(self.out, "{trace_rule}")?;

        write!(self.out, "{QUERYING_STATUS}\r")?;
        self.out.flush()?;

        let answer = self
            .answerer
            .answer(&normalized)
            .unwrap_or_else(|e| format!("Error connecting to LLM: {e}"));

        write!(self.out, "{}\r", " ".repeat(QUERYING_STATUS.len()))?;
        writeln!(self.out, "LLM Answer:\n{answer}")?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        self.out.flush()
    }
}

/// Checks the credential, builds the model client and runs a shell on `out`.
///
/// Nothing is written and `source` is never read when no API key is
/// configured.
///
/// # Errors
///
/// Returns `ConfigError::MissingApiKey` without a key, or an error if the
/// client cannot be built or input cannot be read.
pub fn run_with_config<W: Write>(
    config: &Config,
    source: &mut dyn LineSource,
    out: W,
) -> anyhow::Result<ExitReason> {
    config.require_api_key()?;

    let client = GeminiClientBuilder::from_config(config)
        .build()
        .context("Failed to create Gemini client")?;
    let answerer = QuestionAnswerer::new(Arc::new(client));

    let mut shell = Shell::new(&answerer, config.model(), out);
    let reason = shell.run(source).context("Failed to read input")?;
    debug!(?reason, "shell terminated");
    Ok(reason)
}
