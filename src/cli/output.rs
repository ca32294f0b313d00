//! User-facing terminal output.
//!
//! Everything goes to stdout so CI logs capture progress and the final error
//! in one stream. Structured diagnostics go through `log` separately.

use cyrup_termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, IsTerminal, Write};

/// Prints progress, warnings and results for one run.
#[derive(Debug, Clone)]
pub struct OutputManager {
    quiet: bool,
    color: ColorChoice,
}

impl OutputManager {
    /// Creates an output manager; `quiet` suppresses everything but errors.
    ///
    /// Colors are used only when stdout is a terminal, so CI logs stay plain.
    pub fn new(quiet: bool) -> Self {
        let color = if io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { quiet, color }
    }

    /// Step in progress.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.print(Some(Color::Cyan), false, "→ ", message)
    }

    /// Step finished.
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.print(Some(Color::Green), false, "✓ ", message)
    }

    /// Something the user should notice that does not fail the run.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        self.print(Some(Color::Yellow), false, "⚠ ", message)
    }

    /// Detail under the previous line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.print(None, false, "    ", message)
    }

    /// Fatal error. Printed even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color);
        write_lines(&mut stdout, Some(Color::Red), true, "Error: ", message)?;
        stdout.flush()
    }

    fn print(
        &self,
        color: Option<Color>,
        bold: bool,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.color);
        write_lines(&mut stdout, color, bold, prefix, message)?;
        stdout.flush()
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Writes each line of `message` behind a colored `prefix`. Only the prefix is
/// colored; the message text is written plain.
fn write_lines<W: WriteColor>(
    out: &mut W,
    color: Option<Color>,
    bold: bool,
    prefix: &str,
    message: &str,
) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(color).set_bold(bold);

    // An empty message still gets its prefix
    let lines: Vec<&str> = if message.is_empty() {
        vec![""]
    } else {
        message.lines().collect()
    };

    for line in lines {
        out.set_color(&spec)?;
        write!(out, "{}", prefix)?;
        out.reset()?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
