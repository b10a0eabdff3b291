//! Interactive prompting
//!
//! Configuration values that are missing or invalid are asked for on
//! the terminal. [`Prompter`] abstracts the question/answer exchange so
//! the validation loops in [`crate::OrganizerConfig::configure`] can be
//! driven from tests.

use crate::error::{Error, Result};
use std::io::{self, BufRead, Stderr, StdinLock, Write};

/// Source of answers for configuration questions.
pub trait Prompter {
    /// Ask a question and return the trimmed answer.
    ///
    /// An empty answer yields `default` when one is given.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;

    /// Ask for a secret. Only the line ending is stripped.
    fn secret(&mut self, question: &str) -> Result<String>;

    /// Report invalid input to the user.
    fn error(&mut self, message: &str) -> Result<()>;
}

/// Line-oriented prompter over any reader/writer pair.
///
/// Questions and errors are written to `output`; answers are read one
/// line at a time from `input`. Reaching end of input is an error, so
/// a closed stdin never turns the validation loops into a busy spin.
pub struct StdioPrompter<R, W> {
    input: R,
    output: W,
}

impl StdioPrompter<StdinLock<'static>, Stderr> {
    /// Prompter reading stdin and writing to stderr, keeping stdout
    /// free for the run output.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    #[must_use]
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter and return the output sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self, question: &str) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Config(format!(
                "input closed while waiting for: {question}"
            )));
        }
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Prompter for StdioPrompter<R, W> {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(value) => write!(self.output, "{question} [{value}]\n> ")?,
            None => write!(self.output, "{question}\n> ")?,
        }
        self.output.flush()?;

        let answer = self.read_answer(question)?;
        let answer = answer.trim();
        Ok(match default {
            Some(value) if answer.is_empty() => value.to_string(),
            _ => answer.to_string(),
        })
    }

    fn secret(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}\n> ")?;
        self.output.flush()?;

        let answer = self.read_answer(question)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}
