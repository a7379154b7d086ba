//! Append-only operation log with live echo.

use std::fmt;
use std::io::{self, Write};

/// Append-only, replayable text log of every attempted action.
///
/// `begin` fragments are written without a trailing line break and
/// completed later by a terminator (`succeed`, `fail`, or an explicit
/// `line`). The accumulated text is never truncated or edited during a
/// run.
///
/// When echo is enabled every fragment is also written to the live sink
/// (standard output by default) the moment it is appended; the
/// accumulated text is available through [`text`](Self::text) regardless
/// of the echo setting.
///
/// Text macros are substituted before a fragment is stored or echoed:
/// `[NL]` and `[LN]` become line breaks, `[currDir]` and `[cwd]` the
/// process's current working directory.
pub struct OperationLog {
    text: String,
    echo: bool,
    sink: Box<dyn Write + Send>,
}

impl fmt::Debug for OperationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationLog")
            .field("echo", &self.echo)
            .field("len", &self.text.len())
            .finish_non_exhaustive()
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationLog {
    /// Create a log echoing to standard output.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Box::new(io::stdout()))
    }

    /// Create a log echoing to a caller-supplied sink.
    #[must_use]
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        Self {
            text: String::new(),
            echo: true,
            sink,
        }
    }

    /// Disable live echo. Appending to the log continues regardless.
    pub const fn disable_echo(&mut self) {
        self.echo = false;
    }

    /// Enable live echo.
    pub const fn enable_echo(&mut self) {
        self.echo = true;
    }

    /// Whether fragments are echoed to the live sink as they are appended.
    #[must_use]
    pub const fn is_echo_enabled(&self) -> bool {
        self.echo
    }

    /// The full accumulated log text, unredacted, in append order.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append `text` without a trailing line break, leaving the line open
    /// for a terminator.
    pub fn begin(&mut self, text: &str) {
        let text = substitute(text);
        self.append(&text);
    }

    /// Append `text` followed by a line break.
    pub fn line(&mut self, text: &str) {
        let mut text = substitute(text);
        text.push('\n');
        self.append(&text);
    }

    /// Terminate the open line with `succeeded`.
    pub fn succeed(&mut self) {
        self.line("succeeded");
    }

    /// Terminate the open line with the failure cause.
    ///
    /// This only records the failure; whether the run aborts afterwards is
    /// the installer's critical-stop decision.
    pub fn fail(&mut self, cause: &dyn fmt::Display) {
        self.line(&format!("failed, cause {cause} !"));
    }

    fn append(&mut self, text: &str) {
        self.text.push_str(text);
        if self.echo {
            let _ = self.sink.write_all(text.as_bytes());
            let _ = self.sink.flush();
        }
    }
}

/// Apply the log text macros.
fn substitute(text: &str) -> String {
    let mut out = text.replace("[LN]", "\n").replace("[NL]", "\n");
    if out.contains("[currDir]") || out.contains("[cwd]") {
        let cwd = std::env::current_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        out = out.replace("[currDir]", &cwd).replace("[cwd]", &cwd);
    }
    out
}
