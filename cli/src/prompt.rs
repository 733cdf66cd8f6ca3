use std::io::{BufRead, Write};

use dagen_core::api::{Prompter, PublishError};

/// Line-oriented prompter over any reader/writer pair (stdin/stdout in the binary).
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

fn io_err(e: std::io::Error) -> PublishError {
    PublishError::Prompt(e.to_string())
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn say(&mut self, message: &str) -> Result<(), PublishError> {
        writeln!(self.output, "{message}").map_err(io_err)
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>, PublishError> {
        write!(self.output, "{question}").map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(io_err)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
