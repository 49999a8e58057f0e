//! Presenter-facing output for the walkthrough.
//!
//! Everything the audience sees goes through [`Console`]; diagnostics go
//! to `tracing` on stderr.

use std::io::{BufRead, Write};

use serde_json::Value;

const RULE: &str = "============================================================";

pub struct Console<W: Write> {
    out: W,
    /// `None` when running non-interactively.
    input: Option<Box<dyn BufRead + Send>>,
}

impl<W: Write> Console<W> {
    /// A console that never pauses.
    pub fn non_interactive(out: W) -> Self {
        Self { out, input: None }
    }

    /// A console that waits for Enter on `input` at every [`pause`](Self::pause).
    pub fn interactive(out: W, input: Box<dyn BufRead + Send>) -> Self {
        Self {
            out,
            input: Some(input),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{RULE}")?;
        writeln!(self.out, "  {title}")?;
        writeln!(self.out, "{RULE}")
    }

    pub fn section(&mut self, number: u8, title: &str) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "[{number}] {title}")?;
        writeln!(self.out, "{}", "-".repeat(title.len() + 4))
    }

    pub fn step(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "  -> {message}")
    }

    pub fn success(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "  [ok] {message}")
    }

    pub fn warn(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "  [warn] {message}")
    }

    pub fn error(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "  [error] {message}")
    }

    pub fn info(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "     {message}")
    }

    /// Pretty-print a JSON document, indented under the current step.
    pub fn json(&mut self, value: &Value) -> std::io::Result<()> {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        for line in pretty.lines() {
            writeln!(self.out, "     {line}")?;
        }
        Ok(())
    }

    /// Wait for Enter. End of input counts as Enter.
    pub fn pause(&mut self) -> std::io::Result<()> {
        let Some(input) = self.input.as_mut() else {
            return Ok(());
        };
        write!(self.out, "\nPress Enter to continue...")?;
        self.out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(())
    }
}
