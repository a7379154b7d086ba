//! Interactive input boundary.

use std::io::{self, BufRead as _, Write as _};

/// Blocking "read one line of text given a prompt" capability.
///
/// Supplied by the environment, not implemented by the engine: the
/// installer only loops on it from
/// [`ask_for`](crate::installer::Installer::ask_for) and applies no
/// validation policy of its own beyond retry-on-reject.
pub trait Prompt {
    /// Display `prompt` and block until one line of input arrives.
    ///
    /// The returned string carries no trailing line break.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the underlying input stream.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompt implementation over standard input and output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        while input.ends_with('\n') || input.ends_with('\r') {
            input.pop();
        }
        Ok(input)
    }
}
