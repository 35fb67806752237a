//! Leveled output sink and console status lines.
//!
//! Components that report outcomes to the user (the range resolver, the
//! search commands) take a `&dyn Output` instead of printing directly, so
//! tests can capture what was reported.

use std::cell::RefCell;
use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
}

impl Level {
    /// Status label shown in front of console messages.
    pub fn label(self) -> &'static str {
        match self {
            Level::Info => "Searching",
            Level::Success => "Resolved",
            Level::Warn => "Warning",
        }
    }

    fn style(self) -> Style {
        let style = Style::new().for_stderr().bold();
        match self {
            Level::Info => style.cyan(),
            Level::Success => style.green(),
            Level::Warn => style.yellow(),
        }
    }
}

/// A sink accepting leveled, user-facing messages.
pub trait Output {
    fn write(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.write(Level::Info, message);
    }

    fn success(&self, message: &str) {
        self.write(Level::Success, message);
    }

    fn warn(&self, message: &str) {
        self.write(Level::Warn, message);
    }
}

/// Writes messages to stderr as status lines (see [`status_line`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn write(&self, level: Level, message: &str) {
        let _ = writeln!(std::io::stderr(), "{}", status_line(level, message));
    }
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    messages: RefCell<Vec<(Level, String)>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    /// Recorded messages of one level.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Output for RecordingOutput {
    fn write(&self, level: Level, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

/// Format one status line: `    Resolved Version range '>=1.0' required by 'app/1.0' ...`
///
/// The level's label is right-aligned in 12 columns and coloured by level
/// when stderr supports it.
pub fn status_line(level: Level, message: &str) -> String {
    format!("{:>12} {message}", level.style().apply_to(level.label()))
}

/// Create an animated spinner for indeterminate progress (remote lookups).
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
