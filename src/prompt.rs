//! Operator interaction seam: free-text prompts and the yes/no confirmation
//! gate. The terminal implementation lives here; tests drive the pipeline
//! through the generated mock instead.

use std::io::{self, BufRead, Write};

use mockall::automock;

/// Trait for asking the operator questions. Implemented by the real
/// terminal prompter and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Prompter: Send + Sync {
    /// Ask for a line of free-text input. An empty answer is meaningful to
    /// callers (it aborts the run), so it is returned as-is.
    fn input(&self, message: &str) -> io::Result<String>;

    /// Ask a yes/no question. An empty answer resolves to `default`.
    fn confirm(&self, message: &str, default: bool) -> io::Result<bool>;
}

/// Prompter that talks to the controlling terminal via stdin/stdout.
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line(&self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for StdinPrompter {
    fn input(&self, message: &str) -> io::Result<String> {
        print!("{message}: ");
        io::stdout().flush()?;
        self.read_line()
    }

    fn confirm(&self, message: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{message} {hint} ");
        io::stdout().flush()?;
        let answer = self.read_line()?;
        Ok(parse_confirmation(&answer, default))
    }
}

/// Maps a raw confirmation answer to a decision. Empty input takes the
/// default; only an explicit yes affirms.
pub fn parse_confirmation(answer: &str, default: bool) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return default;
    }
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
