//! Line-based prompt I/O.
//!
//! The query session talks to the user only through [`Console`], so it can
//! be driven from a terminal or from a prepared script of answers.

use crate::error::{CensusError, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Prompt/response channel used by the query session.
pub trait Console {
    /// Shows `message` and reads one line of input, without its newline.
    fn prompt(&mut self, message: &str) -> Result<String>;

    /// Shows a line of output.
    fn show(&mut self, line: &str);
}

/// Console backed by stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    fn prompt(&mut self, message: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{message}")
            .and_then(|_| stdout.flush())
            .map_err(|e| CensusError::input(format!("Failed to write prompt: {e}")))?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CensusError::input(format!("Failed to read input: {e}")))?;
        if read == 0 {
            return Err(CensusError::input("Input closed"));
        }

        Ok(trim_newline(line))
    }

    fn show(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Console that answers prompts from a fixed script.
///
/// Everything shown and every prompt/answer pair is kept in a transcript.
/// With echo enabled the transcript is also written to stdout as it grows.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
    echo: bool,
}

impl ScriptedConsole {
    /// Creates a console answering with `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            echo: false,
        }
    }

    /// Creates a console from script text, one answer per line.
    ///
    /// Blank lines are answers too (they select the prompt's default).
    pub fn from_script(script: &str) -> Self {
        Self::new(script.lines().map(|l| l.trim_end_matches('\r')))
    }

    /// Enables echoing the transcript to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Returns everything shown so far.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Returns the number of unused answers.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn record(&mut self, line: String) {
        if self.echo {
            println!("{line}");
        }
        self.transcript.push(line);
    }
}

impl Console for ScriptedConsole {
    fn prompt(&mut self, message: &str) -> Result<String> {
        let answer = self.answers.pop_front().ok_or_else(|| {
            CensusError::input(format!("Script exhausted at prompt '{}'", message.trim()))
        })?;
        self.record(format!("{message}{answer}"));
        Ok(answer)
    }

    fn show(&mut self, line: &str) {
        self.record(line.to_string());
    }
}

fn trim_newline(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}
